//! Persona selection, passed explicitly to whatever handles a request.

use crate::directory;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Business,
    Client,
}

impl std::str::FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(Mode::Business),
            "client" => Ok(Mode::Client),
            other => anyhow::bail!("unknown mode: {other}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "selectedMode", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(rename = "selectedBusiness", default, skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    #[serde(rename = "selectedClient", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Session {
    /// Validated selection. Business mode needs a business, client mode needs a
    /// client and derives the business from the directory when none is given.
    pub fn select(
        mode: Mode,
        business_id: Option<String>,
        client_id: Option<String>,
    ) -> anyhow::Result<Self> {
        let business_id = business_id.filter(|s| !s.trim().is_empty());
        let client_id = client_id.filter(|s| !s.trim().is_empty());

        match mode {
            Mode::Business => {
                ensure!(business_id.is_some(), "please select a business");
                Ok(Self {
                    mode: Some(mode),
                    business_id,
                    client_id,
                })
            }
            Mode::Client => {
                let client = client_id.context("please select a client")?;
                let business_id = business_id
                    .unwrap_or_else(|| directory::business_for_client(&client).to_string());
                Ok(Self {
                    mode: Some(mode),
                    business_id: Some(business_id),
                    client_id: Some(client),
                })
            }
        }
    }

    pub fn effective_business(&self) -> &str {
        self.business_id
            .as_deref()
            .unwrap_or(directory::FALLBACK_BUSINESS_ID)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Load/save boundary for [`Session`].
pub trait SessionStore: Send + Sync {
    fn load(&self) -> anyhow::Result<Session>;

    fn save(&self, session: &Session) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Session>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> anyhow::Result<Session> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        *guard = session.clone();
        Ok(())
    }
}

/// JSON file holding the `selectedMode`/`selectedBusiness`/`selectedClient` keys.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub const DEFAULT_FILE: &'static str = ".dealbot-session.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> anyhow::Result<Session> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Session::default()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read session file {}", self.path.display())
                })
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("session file is not valid JSON: {}", self.path.display()))
    }

    fn save(&self, session: &Session) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(session).context("session serialize failed")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write session file {}", self.path.display()))
    }
}
