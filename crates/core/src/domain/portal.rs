use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStatus {
    Active,
    #[serde(rename = "onhold")]
    OnHold,
    Finished,
}

impl DealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DealStatus::Active => "active",
            DealStatus::OnHold => "onhold",
            DealStatus::Finished => "finished",
        }
    }
}

impl std::str::FromStr for DealStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(DealStatus::Active),
            "onhold" | "on-hold" | "on_hold" => Ok(DealStatus::OnHold),
            "finished" => Ok(DealStatus::Finished),
            other => anyhow::bail!("unknown deal status: {other}"),
        }
    }
}

/// A deal owned by a business, as managed through the portal endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalDeal {
    pub id: String,
    pub title: String,
    pub discount: String,
    pub description: String,
    pub location: String,
    pub date_range: String,
    pub original_price: String,
    pub current_price: String,
    pub is_active: bool,
    pub status: DealStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub title: String,
    pub description: String,
    pub discount: String,
    pub original_price: i64,
    pub current_price: i64,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub status: DealStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

/// One journal line recorded for a client visit. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub business_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Deals in `status` whose title or description contains `search`, ignoring case.
pub fn filter_deals<'a>(
    deals: &'a [PortalDeal],
    status: DealStatus,
    search: &str,
) -> Vec<&'a PortalDeal> {
    let needle = search.to_lowercase();
    deals
        .iter()
        .filter(|d| d.status == status)
        .filter(|d| {
            needle.is_empty()
                || d.title.to_lowercase().contains(&needle)
                || d.description.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn count_by_status(deals: &[PortalDeal], status: DealStatus) -> usize {
    deals.iter().filter(|d| d.status == status).count()
}

/// Flips `is_active` on the deal with `id`. Returns the new value, or `None` if no deal matched.
pub fn toggle_active(deals: &mut [PortalDeal], id: &str) -> Option<bool> {
    let deal = deals.iter_mut().find(|d| d.id == id)?;
    deal.is_active = !deal.is_active;
    Some(deal.is_active)
}
