use crate::domain::contract::{parse_price, Deal};
use crate::domain::portal::{CreateDealRequest, DealStatus};
use crate::domain::recommendation::RecommendationRecord;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "ETB";
pub const DEFAULT_LOCATION: &str = "Addis Ababa, ET";

/// A deal being drafted from a client-facing recommendation, before it is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDraft {
    pub title: String,
    pub description: String,
    pub original_price: f64,
    pub current_price: f64,
    pub currency: String,
    pub location: String,
    pub valid_until: Option<NaiveDate>,
}

impl Default for DealDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            original_price: 0.0,
            current_price: 0.0,
            currency: DEFAULT_CURRENCY.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            valid_until: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealPreview {
    pub title: String,
    pub description: String,
    pub original_price: String,
    pub current_price: String,
    pub badge: String,
    pub location: String,
    pub validity: String,
}

impl DealDraft {
    pub fn from_deal(deal: &Deal) -> Self {
        let defaults = Self::default();
        Self {
            title: deal.deal_title.clone().unwrap_or_default(),
            description: deal.description.clone().unwrap_or_default(),
            original_price: parse_price(deal.original_price.as_ref(), 0) as f64,
            current_price: parse_price(deal.current_price.as_ref(), 0) as f64,
            currency: deal.currency.clone().unwrap_or(defaults.currency),
            location: deal.location.clone().unwrap_or(defaults.location),
            valid_until: None,
        }
    }

    pub fn discount_amount(&self) -> f64 {
        self.original_price - self.current_price
    }

    pub fn badge_text(&self) -> String {
        format!("SAVE {:.0} {}", self.discount_amount().round(), self.currency)
    }

    pub fn preview(&self) -> DealPreview {
        let or_placeholder = |s: &str, placeholder: &str| {
            if s.is_empty() {
                placeholder.to_string()
            } else {
                s.to_string()
            }
        };
        let validity = match self.valid_until {
            Some(date) => format!("Valid until {}", date.format("%Y-%m-%d")),
            None => "Valid until 2 weeks from now".to_string(),
        };

        DealPreview {
            title: or_placeholder(&self.title, "Deal Title"),
            description: or_placeholder(&self.description, "Deal description will appear here..."),
            original_price: format!("{} {}", self.original_price, self.currency),
            current_price: format!("{} {}", self.current_price, self.currency),
            badge: self.badge_text(),
            location: self.location.clone(),
            validity,
        }
    }
}

/// Portal form for adding a deal. Prices stay textual until submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealForm {
    pub title: String,
    pub description: String,
    pub discount: String,
    pub original_price: String,
    pub current_price: String,
    pub location: String,
    pub date_range: String,
    pub button_text: String,
}

pub const FORM_CURRENCY: &str = "SEK";

/// Live card preview of a [`DealForm`]. Optional lines are omitted while their field is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPreview {
    pub title: String,
    pub description: String,
    pub original_price: Option<String>,
    pub current_price: String,
    pub discount: Option<String>,
    pub location: Option<String>,
    pub date_range: Option<String>,
    pub button_text: String,
}

impl DealForm {
    pub fn preview(&self) -> FormPreview {
        let filled = |s: &str| Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string);

        FormPreview {
            title: filled(&self.title).unwrap_or_else(|| "Deal Title".to_string()),
            description: filled(&self.description)
                .unwrap_or_else(|| "Deal description will appear here...".to_string()),
            original_price: filled(&self.original_price).map(|p| format!("{p} {FORM_CURRENCY}")),
            current_price: match filled(&self.current_price) {
                Some(p) => format!("{p} {FORM_CURRENCY}"),
                None => format!("Price {FORM_CURRENCY}"),
            },
            discount: filled(&self.discount),
            location: filled(&self.location).map(|l| format!("📍 {l}")),
            date_range: filled(&self.date_range).map(|d| format!("📅 {d}")),
            button_text: filled(&self.button_text).unwrap_or_else(|| "Book Now".to_string()),
        }
    }

    /// Copies a recommendation template into the form, keeping location and dates.
    pub fn apply_recommendation(&mut self, rec: &RecommendationRecord) {
        self.title = rec.title.clone();
        self.description = rec.description.clone();
        self.original_price = rec.original_price.to_string();
        self.current_price = rec.suggested_price.to_string();
        self.discount = rec.discount.clone();
    }

    pub fn to_create_request(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: DealStatus,
    ) -> anyhow::Result<CreateDealRequest> {
        let title = self.title.trim();
        ensure!(!title.is_empty(), "deal title is required");
        let description = self.description.trim();
        ensure!(!description.is_empty(), "deal description is required");
        ensure!(
            end_date >= start_date,
            "end date {end_date} is before start date {start_date}"
        );

        let original_price = self
            .original_price
            .trim()
            .parse::<i64>()
            .with_context(|| format!("original price is not a whole number: {}", self.original_price))?;
        let current_price = self
            .current_price
            .trim()
            .parse::<i64>()
            .with_context(|| format!("current price is not a whole number: {}", self.current_price))?;

        Ok(CreateDealRequest {
            title: title.to_string(),
            description: description.to_string(),
            discount: self.discount.trim().to_string(),
            original_price,
            current_price,
            location: self.location.trim().to_string(),
            start_date: start_date.format("%Y-%m-%d").to_string(),
            end_date: end_date.format("%Y-%m-%d").to_string(),
            status,
        })
    }
}
