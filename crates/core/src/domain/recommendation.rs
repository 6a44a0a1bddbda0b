use serde::{Deserialize, Serialize};

pub const INSIGHTS: [&str; 4] = [
    "Market intelligence shows trending deals in your industry",
    "AI innovation provides cutting-edge deal strategies",
    "Personalized recommendations are available on the client side",
    "Use these templates to create effective deals for your business",
];

/// One suggested deal, as shown on a recommendation card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub title: String,
    pub description: String,
    pub discount: String,
    pub suggested_price: i64,
    pub original_price: i64,
    pub category: String,
    pub reasoning: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MarketIntelligence,
    AiInnovation,
}

/// Values substituted for fields the remote service leaves out. `reasoning` and
/// `confidence` are never read from the input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryDefaults {
    pub title: &'static str,
    pub description: &'static str,
    pub discount: &'static str,
    pub suggested_price: i64,
    pub original_price: i64,
    pub reasoning: &'static str,
    pub confidence: f64,
}

const MARKET_INTELLIGENCE_DEFAULTS: CategoryDefaults = CategoryDefaults {
    title: "Market Deal",
    description: "Trending offer for your business",
    discount: "25% OFF",
    suggested_price: 75,
    original_price: 100,
    reasoning: "Trending in your industry with high engagement rates",
    confidence: 0.90,
};

const AI_INNOVATION_DEFAULTS: CategoryDefaults = CategoryDefaults {
    title: "AI Innovation",
    description: "AI-powered deal suggestion",
    discount: "30% OFF",
    suggested_price: 70,
    original_price: 100,
    reasoning: "Cutting-edge strategies to maximize conversions",
    confidence: 0.80,
};

impl Category {
    pub const ALL: [Category; 2] = [Category::MarketIntelligence, Category::AiInnovation];

    pub fn label(self) -> &'static str {
        match self {
            Category::MarketIntelligence => "Market Intelligence",
            Category::AiInnovation => "AI Innovation",
        }
    }

    pub fn defaults(self) -> &'static CategoryDefaults {
        match self {
            Category::MarketIntelligence => &MARKET_INTELLIGENCE_DEFAULTS,
            Category::AiInnovation => &AI_INNOVATION_DEFAULTS,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The three-category grouping handed back to callers. `T` is either the
/// normalized [`RecommendationRecord`] or the raw client-facing deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationBundle<T> {
    #[serde(rename = "personalized_deals", default)]
    pub personalized: Vec<T>,
    #[serde(rename = "market_intel_deals", default)]
    pub market_intel: Vec<T>,
    #[serde(rename = "ai_innovation_deals", default)]
    pub ai_innovation: Vec<T>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_briefing: Option<String>,
}

impl<T> RecommendationBundle<T> {
    pub fn empty() -> Self {
        Self {
            personalized: Vec::new(),
            market_intel: Vec::new(),
            ai_innovation: Vec::new(),
            insights: Vec::new(),
            technical_briefing: None,
        }
    }

    pub fn len(&self) -> usize {
        self.personalized.len() + self.market_intel.len() + self.ai_innovation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecommendationBundle<RecommendationRecord> {
    /// Market intelligence followed by AI innovation records, in that order.
    /// Personalized deals are client-side only and never part of the templates.
    pub fn templates(&self) -> impl Iterator<Item = &RecommendationRecord> {
        self.market_intel.iter().chain(self.ai_innovation.iter())
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &RecommendationRecord> {
        self.templates().filter(move |r| r.category == category.label())
    }
}

pub fn fixed_insights() -> Vec<String> {
    INSIGHTS.iter().map(|s| s.to_string()).collect()
}
