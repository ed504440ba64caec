use std::time::Duration as PendingDuration;

use chrono::Duration;
use tracing::warn;

use crate::capability::CapabilityType;
use crate::client::ApiClient;
use crate::code::{CodeVerifier, RemoteCodeVerifier, StaticSecretVerifier};
use crate::error::AccessError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_CAPABILITY_TTL_MINUTES: i64 = 30;
pub const DEFAULT_PENDING_DELAY_MS: u64 = 1500;

/// Access gate configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub api_url: String,
    pub capability_ttl_minutes: i64,
    /// Shared secret for the static-code deployment. When unset, codes are
    /// verified by the API.
    pub static_access_code: Option<String>,
    /// Capability the static code unlocks
    pub static_code_grants: CapabilityType,
    pub pending_delay_ms: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            capability_ttl_minutes: DEFAULT_CAPABILITY_TTL_MINUTES,
            static_access_code: None,
            static_code_grants: CapabilityType::RoleSelection,
            pending_delay_ms: DEFAULT_PENDING_DELAY_MS,
        }
    }
}

impl GateConfig {
    /// Load configuration from environment variables
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> anyhow::Result<Self> {
        use anyhow::Context;
        use std::env;

        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        Ok(Self {
            api_url: env::var("API_URL").unwrap_or(defaults.api_url),
            capability_ttl_minutes: match env::var("ACCESS_CAPABILITY_TTL_MINUTES") {
                Ok(value) => parse_ttl_minutes(&value)
                    .context("ACCESS_CAPABILITY_TTL_MINUTES is invalid")?,
                Err(_) => defaults.capability_ttl_minutes,
            },
            static_access_code: env::var("STATIC_ACCESS_CODE")
                .ok()
                .filter(|code| !code.trim().is_empty()),
            static_code_grants: match env::var("STATIC_ACCESS_CODE_GRANTS") {
                Ok(value) => value
                    .parse()
                    .context("STATIC_ACCESS_CODE_GRANTS must be a capability type")?,
                Err(_) => defaults.static_code_grants,
            },
            pending_delay_ms: match env::var("ACCESS_PENDING_DELAY_MS") {
                Ok(value) => value
                    .parse()
                    .context("ACCESS_PENDING_DELAY_MS must be a number of milliseconds")?,
                Err(_) => defaults.pending_delay_ms,
            },
        })
    }

    /// Capability lifetime. Fails for non-positive or unrepresentable values.
    pub fn capability_ttl(&self) -> Result<Duration, AccessError> {
        Duration::try_minutes(self.capability_ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .ok_or_else(|| {
                AccessError::InvalidTtl(format!("{} minutes", self.capability_ttl_minutes))
            })
    }

    /// Capability lifetime, falling back to the default when misconfigured
    pub fn capability_ttl_or_default(&self) -> Duration {
        self.capability_ttl().unwrap_or_else(|e| {
            warn!(error = %e, "Using default capability lifetime");
            Duration::minutes(DEFAULT_CAPABILITY_TTL_MINUTES)
        })
    }

    pub fn pending_delay(&self) -> PendingDuration {
        PendingDuration::from_millis(self.pending_delay_ms)
    }

    pub fn api_client(&self) -> ApiClient {
        ApiClient::new(self.api_url.clone())
    }

    /// Verification strategy for this deployment
    pub fn verifier(&self) -> Box<dyn CodeVerifier> {
        match &self.static_access_code {
            Some(secret) => Box::new(StaticSecretVerifier::new(secret, self.static_code_grants)),
            None => Box::new(RemoteCodeVerifier::new(self.api_client())),
        }
    }
}

/// Whole minutes, positive and small enough for chrono to represent
#[cfg(not(target_arch = "wasm32"))]
fn parse_ttl_minutes(value: &str) -> anyhow::Result<i64> {
    let minutes: i64 = value.trim().parse()?;
    if minutes <= 0 {
        anyhow::bail!("capability lifetime must be positive, got {} minutes", minutes);
    }
    if Duration::try_minutes(minutes).is_none() {
        anyhow::bail!("capability lifetime of {} minutes is out of range", minutes);
    }
    Ok(minutes)
}
