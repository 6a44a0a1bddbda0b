//! Wire shapes of the remote recommendation service and the decode step that
//! turns them into [`RecommendationRecord`]s.
//!
//! The service is loosely typed: any field may be missing, null, or carry an
//! unexpected JSON type. Individual fields that fail to decode are treated as
//! absent and replaced from the category's default table instead of failing
//! the whole response.

use crate::domain::recommendation::{
    fixed_insights, Category, RecommendationBundle, RecommendationRecord,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A price as sent by the service: either a JSON number or a string such as `"120 SEK"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceValue {
    Number(serde_json::Number),
    Text(String),
}

impl PriceValue {
    /// Integer amount, or `None` when nothing numeric can be recovered.
    pub fn amount(&self) -> Option<i64> {
        match self {
            PriceValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            }),
            PriceValue::Text(s) => leading_integer(s),
        }
    }
}

/// Leading signed integer of `s`, ignoring leading whitespace and any trailing
/// suffix (`"120 SEK"` -> 120).
pub fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let sign_len = match s.as_bytes().first() {
        Some(b'-') | Some(b'+') => 1,
        _ => 0,
    };
    let digits_len = s[sign_len..].bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    s[..sign_len + digits_len].parse::<i64>().ok()
}

pub fn parse_price(value: Option<&PriceValue>, default: i64) -> i64 {
    value.and_then(PriceValue::amount).unwrap_or(default)
}

/// Deserializes `T`, mapping any type mismatch to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Deserializes a deal sequence element by element. An element that is not a
/// deal object projects as an empty deal, so its siblings survive.
fn lenient_deals<'de, D>(deserializer: D) -> Result<Option<Vec<Deal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .into_iter()
            .map(|item| serde_json::from_value::<Deal>(item).unwrap_or_default())
            .collect(),
    ))
}

/// A client-facing deal exactly as the service returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub deal_title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub original_price: Option<PriceValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub current_price: Option<PriceValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub badge_text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub primary_button_text: Option<String>,
}

impl Deal {
    /// Projects the raw deal into a record of `category`. Empty strings count
    /// as missing. Any `category` the service sent is ignored.
    pub fn into_record(self, category: Category) -> RecommendationRecord {
        let defaults = category.defaults();
        let title = non_empty(self.deal_title)
            .or_else(|| non_empty(self.title))
            .unwrap_or_else(|| defaults.title.to_string());
        let description =
            non_empty(self.description).unwrap_or_else(|| defaults.description.to_string());
        let discount =
            non_empty(self.badge_text).unwrap_or_else(|| defaults.discount.to_string());

        RecommendationRecord {
            title,
            description,
            discount,
            suggested_price: parse_price(self.current_price.as_ref(), defaults.suggested_price),
            original_price: parse_price(self.original_price.as_ref(), defaults.original_price),
            category: category.label().to_string(),
            reasoning: defaults.reasoning.to_string(),
            confidence: defaults.confidence,
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Body of `GET /recommend/{business}/{client}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendResponse {
    #[serde(default, deserialize_with = "lenient_deals")]
    pub personalized_deals: Option<Vec<Deal>>,
    #[serde(default, deserialize_with = "lenient_deals")]
    pub market_intel_deals: Option<Vec<Deal>>,
    #[serde(default, deserialize_with = "lenient_deals")]
    pub ai_innovation_deals: Option<Vec<Deal>>,
    #[serde(default, deserialize_with = "lenient")]
    pub technical_briefing: Option<String>,
}

impl RecommendResponse {
    /// Normalized bundle for the business side: personalized deals are left
    /// empty and the fixed insights are attached.
    pub fn into_business_bundle(self) -> RecommendationBundle<RecommendationRecord> {
        let project = |deals: Option<Vec<Deal>>, category: Category| -> Vec<RecommendationRecord> {
            deals
                .unwrap_or_default()
                .into_iter()
                .map(|d| d.into_record(category))
                .collect()
        };

        RecommendationBundle {
            personalized: Vec::new(),
            market_intel: project(self.market_intel_deals, Category::MarketIntelligence),
            ai_innovation: project(self.ai_innovation_deals, Category::AiInnovation),
            insights: fixed_insights(),
            technical_briefing: None,
        }
    }

    /// The three sequences verbatim, without insights.
    pub fn into_client_bundle(self) -> RecommendationBundle<Deal> {
        RecommendationBundle {
            personalized: self.personalized_deals.unwrap_or_default(),
            market_intel: self.market_intel_deals.unwrap_or_default(),
            ai_innovation: self.ai_innovation_deals.unwrap_or_default(),
            insights: Vec::new(),
            technical_briefing: self.technical_briefing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recommendation::INSIGHTS;
    use serde_json::json;

    fn decode(v: Value) -> RecommendResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn leading_integer_strips_currency_suffix() {
        assert_eq!(leading_integer("120 SEK"), Some(120));
        assert_eq!(leading_integer("  85ETB"), Some(85));
        assert_eq!(leading_integer("-5"), Some(-5));
        assert_eq!(leading_integer("SEK 120"), None);
        assert_eq!(leading_integer(""), None);
        assert_eq!(leading_integer("-"), None);
        assert_eq!(leading_integer("+7 SEK"), Some(7));
    }

    #[test]
    fn leading_integer_covers_the_full_i64_range() {
        assert_eq!(leading_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(leading_integer("9223372036854775807 SEK"), Some(i64::MAX));
        assert_eq!(leading_integer("9223372036854775808"), None);
    }

    #[test]
    fn string_price_with_suffix_is_parsed() {
        let bundle = decode(json!({
            "market_intel_deals": [{"deal_title": "Cut", "current_price": "120 SEK", "original_price": "200 SEK"}]
        }))
        .into_business_bundle();
        assert_eq!(bundle.market_intel[0].suggested_price, 120);
        assert_eq!(bundle.market_intel[0].original_price, 200);
    }

    #[test]
    fn numeric_prices_are_used_and_fractions_truncated() {
        let bundle = decode(json!({
            "ai_innovation_deals": [{"current_price": 64.9, "original_price": 90}]
        }))
        .into_business_bundle();
        assert_eq!(bundle.ai_innovation[0].suggested_price, 64);
        assert_eq!(bundle.ai_innovation[0].original_price, 90);
    }

    #[test]
    fn missing_or_garbage_prices_fall_back_per_category() {
        let bundle = decode(json!({
            "market_intel_deals": [{}],
            "ai_innovation_deals": [{"current_price": "free", "original_price": true}]
        }))
        .into_business_bundle();
        assert_eq!(bundle.market_intel[0].suggested_price, 75);
        assert_eq!(bundle.market_intel[0].original_price, 100);
        assert_eq!(bundle.ai_innovation[0].suggested_price, 70);
        assert_eq!(bundle.ai_innovation[0].original_price, 100);
    }

    #[test]
    fn text_fields_fall_back_in_order() {
        let bundle = decode(json!({
            "market_intel_deals": [
                {"deal_title": "Primary", "title": "Secondary"},
                {"title": "Secondary"},
                {"deal_title": "", "description": 42}
            ]
        }))
        .into_business_bundle();
        let mi = &bundle.market_intel;
        assert_eq!(mi[0].title, "Primary");
        assert_eq!(mi[1].title, "Secondary");
        assert_eq!(mi[2].title, "Market Deal");
        assert_eq!(mi[2].description, "Trending offer for your business");
        assert_eq!(mi[2].discount, "25% OFF");
    }

    #[test]
    fn category_is_forced_by_source_sequence() {
        let bundle = decode(json!({
            "market_intel_deals": [{"category": "AI Innovation"}, {"category": "Wellness"}],
            "ai_innovation_deals": [{"category": "Market Intelligence"}]
        }))
        .into_business_bundle();
        assert!(bundle.market_intel.iter().all(|r| r.category == "Market Intelligence"));
        assert!(bundle.ai_innovation.iter().all(|r| r.category == "AI Innovation"));
        assert_eq!(bundle.ai_innovation[0].reasoning, "Cutting-edge strategies to maximize conversions");
        assert_eq!(bundle.ai_innovation[0].confidence, 0.80);
    }

    #[test]
    fn business_bundle_never_has_personalized_deals() {
        let bundle = decode(json!({
            "personalized_deals": [{"deal_title": "Just for you"}],
            "market_intel_deals": null
        }))
        .into_business_bundle();
        assert!(bundle.personalized.is_empty());
        assert!(bundle.market_intel.is_empty());
        assert_eq!(bundle.insights, INSIGHTS);
    }

    #[test]
    fn malformed_elements_do_not_drop_their_siblings() {
        let bundle = decode(json!({
            "market_intel_deals": [{"deal_title": "Good"}, null],
            "ai_innovation_deals": [{"deal_title": "Good AI"}, "oops", 7]
        }))
        .into_business_bundle();
        assert_eq!(bundle.market_intel.len(), 2);
        assert_eq!(bundle.market_intel[0].title, "Good");
        assert_eq!(bundle.market_intel[1].title, "Market Deal");
        assert_eq!(bundle.market_intel[1].suggested_price, 75);

        let ai: Vec<_> = bundle.ai_innovation.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(ai, ["Good AI", "AI Innovation", "AI Innovation"]);
    }

    #[test]
    fn malformed_personalized_elements_pass_through_as_empty_deals() {
        let bundle = decode(json!({
            "personalized_deals": [{"deal_title": "Beard trim"}, 42]
        }))
        .into_client_bundle();
        assert_eq!(bundle.personalized.len(), 2);
        assert_eq!(bundle.personalized[1], Deal::default());
    }

    #[test]
    fn non_array_sequence_is_treated_as_empty() {
        let bundle = decode(json!({"ai_innovation_deals": "oops"})).into_business_bundle();
        assert!(bundle.ai_innovation.is_empty());
    }

    #[test]
    fn client_bundle_passes_deals_through() {
        let bundle = decode(json!({
            "personalized_deals": [{"deal_title": "Beard trim", "current_price": "80 SEK", "currency": "SEK"}],
            "ai_innovation_deals": [{"original_price": 100}],
            "technical_briefing": "brief"
        }))
        .into_client_bundle();
        assert_eq!(bundle.personalized[0].deal_title.as_deref(), Some("Beard trim"));
        assert_eq!(
            bundle.personalized[0].current_price,
            Some(PriceValue::Text("80 SEK".to_string()))
        );
        assert!(bundle.market_intel.is_empty());
        assert!(bundle.insights.is_empty());
        assert_eq!(bundle.technical_briefing.as_deref(), Some("brief"));

        let out = serde_json::to_value(&bundle.ai_innovation[0]).unwrap();
        assert_eq!(out, json!({"original_price": 100}));
    }
}
