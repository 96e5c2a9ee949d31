//! # Workflow360
//!
//! Facade crate for the Workflow360 account flows: re-exports the core
//! types, the provider adapters and the flow controllers, and reads the
//! identity-provider endpoint configuration from the environment.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use workflow360::prelude::*;
//!
//! let settings = ProviderSettings::from_env();
//! let Some(provider) = settings.connect() else {
//!     // placeholder mode: auth is disabled, show the warning banner
//!     return;
//! };
//! let wizard = RecoveryController::new(Arc::new(provider), navigator);
//! ```

pub use workflow360_core::*;

pub use workflow360_account_flows as flows;
pub use workflow360_adapter_memory::MemoryProvider;
pub use workflow360_adapter_rest::RestProvider;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use workflow360_account_flows::{
        EmailVerificationFlow, LoginFlow, Navigator, OtpInput, RecoveryController,
        RecoverySessionResolver, RecoveryStep, ResetPasswordFlow, ResetStage,
    };
    pub use workflow360_adapter_memory::MemoryProvider;
    pub use workflow360_adapter_rest::RestProvider;
    pub use workflow360_core::error::{AuthError, AuthResult};
    pub use workflow360_core::traits::IdentityProvider;
    pub use workflow360_core::types::{AuthEvent, AuthEventKind, OtpPurpose, Session, User};
    pub use workflow360_core::validate::PasswordPolicy;

    pub use crate::config::ProviderSettings;
}

/// Identity-provider configuration from the environment.
pub mod config {
    use url::Url;

    use workflow360_adapter_rest::RestProvider;

    /// Environment variable naming the identity service endpoint.
    pub const ENDPOINT_VAR: &str = "WORKFLOW360_AUTH_URL";
    /// Environment variable holding the publishable API key.
    pub const API_KEY_VAR: &str = "WORKFLOW360_AUTH_KEY";

    /// The two external values supplying the identity-provider client.
    ///
    /// When either is missing or malformed the app degrades to a
    /// disabled placeholder mode instead of failing to start.
    #[derive(Debug, Clone, Default)]
    pub struct ProviderSettings {
        /// Base URL of the identity service.
        pub endpoint: Option<Url>,
        /// Publishable API key sent with every request.
        pub api_key: Option<String>,
    }

    impl ProviderSettings {
        /// Reads both values from the environment. Malformed URLs are
        /// treated as absent, with a warning.
        pub fn from_env() -> Self {
            let endpoint = std::env::var(ENDPOINT_VAR).ok().and_then(|raw| {
                Url::parse(&raw)
                    .map_err(|e| {
                        tracing::warn!(%raw, error = %e, "ignoring malformed {ENDPOINT_VAR}");
                    })
                    .ok()
            });
            let api_key = std::env::var(API_KEY_VAR).ok().filter(|k| !k.is_empty());
            Self { endpoint, api_key }
        }

        /// Builds settings from explicit values.
        pub fn new(endpoint: Url, api_key: impl Into<String>) -> Self {
            Self {
                endpoint: Some(endpoint),
                api_key: Some(api_key.into()),
            }
        }

        /// True when both values are present.
        pub fn is_configured(&self) -> bool {
            self.endpoint.is_some() && self.api_key.is_some()
        }

        /// Creates the HTTP provider client, or `None` in placeholder
        /// mode.
        pub fn connect(&self) -> Option<RestProvider> {
            match (&self.endpoint, &self.api_key) {
                (Some(endpoint), Some(api_key)) => {
                    Some(RestProvider::new(endpoint.clone(), api_key))
                }
                _ => {
                    tracing::warn!(
                        "identity provider not configured ({ENDPOINT_VAR}, {API_KEY_VAR}); \
                         auth runs in disabled placeholder mode"
                    );
                    None
                }
            }
        }
    }

}
