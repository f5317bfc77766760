use std::any::Any;

use roster_states::{State, state_assign_impl};
use serde::Deserialize;
use ustr::Ustr;

/// Environment overrides, read once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
struct EnvOverrides {
    #[serde(default)]
    roster_service_url: Option<String>,
    #[serde(default)]
    roster_anon_key: Option<String>,
    #[serde(default)]
    roster_service_role_key: Option<String>,
}

/// Connection settings for the hosted identity/data service.
///
/// Directory reads and session calls authenticate with `anon_key` plus the
/// user's bearer token; admin mutations (status updates, row and identity
/// deletion) use `service_role_key`.
#[derive(Debug, Clone)]
pub struct BusinessConfig {
    pub service_url: String,
    pub anon_key: Option<String>,
    pub service_role_key: Option<String>,
}

impl BusinessConfig {
    /// Local development default for the hosted service.
    pub const DEFAULT_SERVICE_URL: &'static str = "http://127.0.0.1:54321";

    pub fn new(service_url: impl Into<String>) -> Self {
        let service_url = service_url.into();
        Self {
            service_url: service_url.trim_end_matches('/').to_owned(),
            anon_key: None,
            service_role_key: None,
        }
    }

    /// Build from `ROSTER_SERVICE_URL` / `ROSTER_ANON_KEY` /
    /// `ROSTER_SERVICE_ROLE_KEY`, falling back to the local default.
    pub fn from_env() -> Self {
        let overrides = serde_env::from_env::<EnvOverrides>().unwrap_or_default();
        let mut config = Self::new(
            overrides
                .roster_service_url
                .unwrap_or_else(|| Self::DEFAULT_SERVICE_URL.to_owned()),
        );
        config.anon_key = overrides.roster_anon_key;
        config.service_role_key = overrides.roster_service_role_key;
        config
    }

    /// Base for session endpoints (`{service_url}/auth/v1`).
    pub fn auth_url(&self) -> Ustr {
        Ustr::from(&format!("{}/auth/v1", self.service_url))
    }

    /// Base for row endpoints (`{service_url}/rest/v1`).
    pub fn rest_url(&self) -> Ustr {
        Ustr::from(&format!("{}/rest/v1", self.service_url))
    }

    pub fn anon_key(&self) -> Option<&str> {
        self.anon_key.as_deref()
    }

    pub fn service_role_key(&self) -> Option<&str> {
        self.service_role_key.as_deref()
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SERVICE_URL)
    }
}

impl State for BusinessConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}
