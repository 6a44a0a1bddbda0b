use crate::domain::contract::Deal;
use crate::domain::portal::{CreateDealRequest, HealthStatus, JournalEntry, PortalDeal};
use crate::domain::recommendation::{RecommendationBundle, RecommendationRecord};

pub mod error;
pub mod http;

pub use error::GatewayError;
pub use http::HttpGateway;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Stateless access to the remote recommendation service. Every call is a
/// single request with no retry and no caching.
#[async_trait::async_trait]
pub trait RecommendationGateway: Send + Sync {
    /// Normalized templates for a business. The client is resolved through the
    /// directory and personalized deals are always left empty.
    async fn fetch_recommendations(
        &self,
        business_id: &str,
    ) -> GatewayResult<RecommendationBundle<RecommendationRecord>>;

    /// Raw deals for a known business/client pair.
    async fn fetch_personalized(
        &self,
        business_id: &str,
        client_id: &str,
    ) -> GatewayResult<RecommendationBundle<Deal>>;

    /// Raw deals for a client, with the business looked up from the directory.
    async fn fetch_client_recommendations(
        &self,
        client_id: &str,
    ) -> GatewayResult<RecommendationBundle<Deal>> {
        let business_id = crate::directory::business_for_client(client_id);
        self.fetch_personalized(business_id, client_id).await
    }

    async fn journal_entries(&self, client_id: &str) -> GatewayResult<Vec<JournalEntry>>;

    async fn health(&self) -> GatewayResult<HealthStatus>;
}

/// Deal management endpoints of the business portal.
#[async_trait::async_trait]
pub trait PortalGateway: Send + Sync {
    async fn list_deals(&self, business_id: &str) -> GatewayResult<Vec<PortalDeal>>;

    async fn create_deal(&self, request: &CreateDealRequest) -> GatewayResult<PortalDeal>;

    async fn update_deal_status(&self, deal_id: &str, is_active: bool) -> GatewayResult<PortalDeal>;

    async fn delete_deal(&self, deal_id: &str) -> GatewayResult<()>;
}
