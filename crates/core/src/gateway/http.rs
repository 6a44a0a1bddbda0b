use crate::config::Settings;
use crate::directory;
use crate::domain::contract::{Deal, RecommendResponse};
use crate::domain::portal::{
    CreateDealRequest, HealthStatus, JournalEntry, PortalDeal, UpdateStatusRequest,
};
use crate::domain::recommendation::{RecommendationBundle, RecommendationRecord};
use crate::gateway::{GatewayError, GatewayResult, PortalGateway, RecommendationGateway};
use anyhow::Context;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.http_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .context("failed to build recommendation service http client")?;
        Self::with_client(http, &settings.api_base_url)
    }

    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .with_context(|| format!("invalid recommendation service url: {base_url}"))?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "recommendation service url cannot carry a path: {base_url}"
        );
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends the request and returns the body of a 2xx response.
    async fn send(&self, request: RequestBuilder, url: &Url) -> GatewayResult<String> {
        tracing::debug!(%url, "calling recommendation service");
        let res = request
            .send()
            .await
            .map_err(|e| GatewayError::transport(url.as_str(), &e))?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%url, %status, "recommendation service returned an error status");
            return Err(GatewayError::http(url.as_str(), status));
        }

        res.text()
            .await
            .map_err(|e| GatewayError::transport(url.as_str(), &e))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> GatewayResult<T> {
        let text = self.send(request, url).await?;
        serde_json::from_str::<T>(&text).map_err(|e| GatewayError::Decode {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    async fn get_recommend(&self, business_id: &str, client_id: &str) -> GatewayResult<RecommendResponse> {
        let url = self.endpoint(&["recommend", business_id, client_id]);
        let parsed: RecommendResponse = self.send_json(self.http.get(url.clone()), &url).await?;

        tracing::info!(
            business_id,
            client_id,
            personalized = parsed.personalized_deals.as_ref().map_or(0, Vec::len),
            market_intel = parsed.market_intel_deals.as_ref().map_or(0, Vec::len),
            ai_innovation = parsed.ai_innovation_deals.as_ref().map_or(0, Vec::len),
            "received recommendations"
        );
        Ok(parsed)
    }
}

#[async_trait::async_trait]
impl RecommendationGateway for HttpGateway {
    async fn fetch_recommendations(
        &self,
        business_id: &str,
    ) -> GatewayResult<RecommendationBundle<RecommendationRecord>> {
        let client_id = directory::default_client_for(business_id);
        let response = self.get_recommend(business_id, client_id).await?;
        Ok(response.into_business_bundle())
    }

    async fn fetch_personalized(
        &self,
        business_id: &str,
        client_id: &str,
    ) -> GatewayResult<RecommendationBundle<Deal>> {
        let response = self.get_recommend(business_id, client_id).await?;
        Ok(response.into_client_bundle())
    }

    async fn journal_entries(&self, client_id: &str) -> GatewayResult<Vec<JournalEntry>> {
        let mut url = self.endpoint(&["api", "journal-entries"]);
        url.query_pairs_mut().append_pair("client_id", client_id);
        let entries: Option<Vec<JournalEntry>> =
            self.send_json(self.http.get(url.clone()), &url).await?;
        let entries = entries.unwrap_or_default();
        tracing::debug!(client_id, count = entries.len(), "received journal entries");
        Ok(entries)
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        let url = self.endpoint(&[""]);
        self.send_json(self.http.get(url.clone()), &url).await
    }
}

#[async_trait::async_trait]
impl PortalGateway for HttpGateway {
    async fn list_deals(&self, business_id: &str) -> GatewayResult<Vec<PortalDeal>> {
        let url = self.endpoint(&["deals", "business", business_id]);
        self.send_json(self.http.get(url.clone()), &url).await
    }

    async fn create_deal(&self, request: &CreateDealRequest) -> GatewayResult<PortalDeal> {
        let url = self.endpoint(&["deals"]);
        self.send_json(self.http.post(url.clone()).json(request), &url)
            .await
    }

    async fn update_deal_status(&self, deal_id: &str, is_active: bool) -> GatewayResult<PortalDeal> {
        let url = self.endpoint(&["deals", deal_id, "status"]);
        let body = UpdateStatusRequest { is_active };
        self.send_json(self.http.patch(url.clone()).json(&body), &url)
            .await
    }

    async fn delete_deal(&self, deal_id: &str) -> GatewayResult<()> {
        let url = self.endpoint(&["deals", deal_id]);
        self.send(self.http.delete(url.clone()), &url).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portal::DealStatus;
    use crate::domain::recommendation::INSIGHTS;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> HttpGateway {
        HttpGateway::new(&server.uri()).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_onto_base_path() {
        let gw = HttpGateway::new("https://example.com/v2/").unwrap();
        assert_eq!(
            gw.endpoint(&["recommend", "BARBER_SHOP_01", "client_001"]).as_str(),
            "https://example.com/v2/recommend/BARBER_SHOP_01/client_001"
        );
        assert_eq!(gw.endpoint(&[""]).as_str(), "https://example.com/v2/");
        assert_eq!(
            gw.endpoint(&["deals", "a b"]).as_str(),
            "https://example.com/v2/deals/a%20b"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(HttpGateway::new("not a url").is_err());
    }

    #[tokio::test]
    async fn fetch_recommendations_uses_mapped_client_and_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend/SPA_CENTER_02/client_004"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "personalized_deals": [{"deal_title": "ignored"}],
                "market_intel_deals": [
                    {"deal_title": "Massage Monday", "current_price": "120 SEK", "original_price": "160 SEK", "badge_text": "25% OFF"}
                ],
                "ai_innovation_deals": [
                    {"title": "Smart Spa", "category": "Wellness"},
                    {"deal_title": "Second"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = gateway(&server)
            .fetch_recommendations("SPA_CENTER_02")
            .await
            .unwrap();

        assert!(bundle.personalized.is_empty());
        assert_eq!(bundle.market_intel.len(), 1);
        assert_eq!(bundle.market_intel[0].title, "Massage Monday");
        assert_eq!(bundle.market_intel[0].suggested_price, 120);
        assert_eq!(bundle.market_intel[0].original_price, 160);
        let ai_titles: Vec<_> = bundle.ai_innovation.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(ai_titles, ["Smart Spa", "Second"]);
        assert!(bundle.ai_innovation.iter().all(|r| r.category == "AI Innovation"));
        assert_eq!(bundle.ai_innovation[0].suggested_price, 70);
        assert_eq!(bundle.insights, INSIGHTS);
    }

    #[tokio::test]
    async fn unknown_business_queries_with_fallback_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend/BAKERY_03/client_001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = gateway(&server).fetch_recommendations("BAKERY_03").await.unwrap();
        assert!(bundle.market_intel.is_empty());
        assert!(bundle.ai_innovation.is_empty());
        assert_eq!(bundle.insights.len(), 4);
    }

    #[tokio::test]
    async fn server_error_is_a_remote_call_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"market_intel_deals": []})))
            .expect(1)
            .mount(&server)
            .await;

        let err = gateway(&server)
            .fetch_recommendations("BARBER_SHOP_01")
            .await
            .unwrap_err();
        match err {
            GatewayError::RemoteCall { status, reason, .. } => {
                assert_eq!(status, Some(500));
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("expected RemoteCall, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .fetch_recommendations("BARBER_SHOP_01")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn connection_failure_is_a_remote_call_error_without_status() {
        let gw = HttpGateway::new("http://127.0.0.1:1").unwrap();
        let err = gw.fetch_recommendations("BARBER_SHOP_01").await.unwrap_err();
        assert!(matches!(err, GatewayError::RemoteCall { status: None, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn fetch_personalized_passes_sequences_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend/BARBER_SHOP_01/client_002"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "personalized_deals": [{"deal_title": "Fade + beard", "current_price": "250 SEK", "currency": "SEK"}],
                "market_intel_deals": [{"deal_title": "Student cut", "current_price": 180}],
                "technical_briefing": "Weekday afternoons are slow."
            })))
            .mount(&server)
            .await;

        let bundle = gateway(&server)
            .fetch_personalized("BARBER_SHOP_01", "client_002")
            .await
            .unwrap();
        assert_eq!(bundle.personalized.len(), 1);
        assert_eq!(bundle.personalized[0].deal_title.as_deref(), Some("Fade + beard"));
        assert_eq!(bundle.market_intel[0].current_price.as_ref().and_then(|p| p.amount()), Some(180));
        assert!(bundle.ai_innovation.is_empty());
        assert!(bundle.insights.is_empty());
        assert_eq!(bundle.technical_briefing.as_deref(), Some("Weekday afternoons are slow."));
    }

    #[tokio::test]
    async fn client_recommendations_resolve_business_from_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommend/SPA_CENTER_02/client_005"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"personalized_deals": []})))
            .expect(1)
            .mount(&server)
            .await;

        let bundle = gateway(&server)
            .fetch_client_recommendations("client_005")
            .await
            .unwrap();
        assert!(bundle.is_empty());
    }

    #[tokio::test]
    async fn journal_entries_query_by_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/journal-entries"))
            .and(query_param("client_id", "client_004"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "2025-01-12", "text": "Hot stone massage", "client_id": "client_004", "business_id": "SPA_CENTER_02"}
            ])))
            .mount(&server)
            .await;

        let entries = gateway(&server).journal_entries("client_004").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].business_id.as_deref(), Some("SPA_CENTER_02"));
    }

    #[tokio::test]
    async fn null_journal_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/journal-entries"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let entries = gateway(&server).journal_entries("client_009").await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn health_reads_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        let health = gateway(&server).health().await.unwrap();
        assert_eq!(health.status, "ok");
    }

    fn portal_deal_json(id: &str, is_active: bool) -> serde_json::Value {
        json!({
            "id": id,
            "title": "Fasika deal",
            "discount": "50% OFF",
            "description": "Holiday offer",
            "location": "Addis Ababa",
            "dateRange": "Valid from Jan 31 to Feb 6",
            "originalPrice": "200",
            "currentPrice": "100",
            "isActive": is_active,
            "status": "active"
        })
    }

    #[tokio::test]
    async fn portal_endpoints_use_expected_methods_and_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/deals/business/SPA_CENTER_02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([portal_deal_json("2", true)])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/deals"))
            .and(body_json(json!({
                "title": "Fasika deal",
                "description": "Holiday offer",
                "discount": "50% OFF",
                "originalPrice": 200,
                "currentPrice": 100,
                "location": "Addis Ababa",
                "startDate": "2025-01-31",
                "endDate": "2025-02-06",
                "status": "active"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(portal_deal_json("7", true)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/deals/7/status"))
            .and(body_json(json!({"isActive": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(portal_deal_json("7", false)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/deals/7"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server);
        let deals = gw.list_deals("SPA_CENTER_02").await.unwrap();
        assert_eq!(deals[0].id, "2");

        let created = gw
            .create_deal(&CreateDealRequest {
                title: "Fasika deal".to_string(),
                description: "Holiday offer".to_string(),
                discount: "50% OFF".to_string(),
                original_price: 200,
                current_price: 100,
                location: "Addis Ababa".to_string(),
                start_date: "2025-01-31".to_string(),
                end_date: "2025-02-06".to_string(),
                status: DealStatus::Active,
            })
            .await
            .unwrap();
        assert_eq!(created.id, "7");

        let updated = gw.update_deal_status("7", false).await.unwrap();
        assert!(!updated.is_active);

        gw.delete_deal("7").await.unwrap();
    }

    #[tokio::test]
    async fn failed_delete_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = gateway(&server).delete_deal("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
