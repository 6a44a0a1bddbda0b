pub mod directory;
pub mod domain;
pub mod draft;
pub mod gateway;
pub mod session;

pub mod config {
    use anyhow::Context;
    use std::time::Duration;

    pub const DEFAULT_API_BASE_URL: &str = "https://dealsuggestionbot-production.up.railway.app";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub http_timeout_secs: Option<u64>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let api_base_url = std::env::var("DEALBOT_API_URL")
                .ok()
                .or_else(|| std::env::var("NEXT_PUBLIC_API_URL").ok())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

            let http_timeout_secs = match std::env::var("DEALBOT_HTTP_TIMEOUT_SECS") {
                Ok(raw) => Some(
                    raw.trim()
                        .parse::<u64>()
                        .with_context(|| format!("DEALBOT_HTTP_TIMEOUT_SECS is not a number: {raw}"))?,
                ),
                Err(_) => None,
            };

            Ok(Self {
                api_base_url,
                http_timeout_secs,
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        /// Settings pointing at an explicit origin, with nothing else configured.
        pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
            Self {
                api_base_url: api_base_url.into(),
                http_timeout_secs: None,
                sentry_dsn: None,
            }
        }

        pub fn http_timeout(&self) -> Option<Duration> {
            self.http_timeout_secs.map(Duration::from_secs)
        }
    }
}
