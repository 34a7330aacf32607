//! Bearer credentials for Vertex AI calls.
//!
//! `gcp_auth` providers cache tokens and refresh them shortly before expiry,
//! so this layer only picks the token source and decides whether a request
//! rejected with 401 is worth retrying.

use std::sync::Arc;

use gcp_auth::TokenProvider;
use tracing::debug;

use crate::error::{GenAiError, GenAiResult};

/// OAuth scope for Vertex AI.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

pub(crate) enum Credentials {
    /// Application default credentials.
    Provider(Arc<dyn TokenProvider>),
    /// Fixed bearer token (tests, local proxies).
    Static(String),
}

impl Credentials {
    pub(crate) async fn bearer(&self) -> GenAiResult<String> {
        match self {
            Credentials::Provider(provider) => provider
                .token(&[CLOUD_PLATFORM_SCOPE])
                .await
                .map(|token| token.as_str().to_string())
                .map_err(|e| GenAiError::auth_error(format!("Failed to obtain auth token: {}", e))),
            Credentials::Static(token) => Ok(token.clone()),
        }
    }

    /// Token to retry with after `rejected` got a 401.
    ///
    /// `None` when the source would hand out the same token again.
    pub(crate) async fn replacement_for(&self, rejected: &str) -> GenAiResult<Option<String>> {
        match self {
            Credentials::Static(_) => Ok(None),
            Credentials::Provider(_) => {
                let token = self.bearer().await?;
                if token == rejected {
                    debug!("Provider returned the rejected token, not retrying");
                    return Ok(None);
                }
                Ok(Some(token))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token_is_never_replaced() {
        let credentials = Credentials::Static("fixed".to_string());

        assert_eq!(credentials.bearer().await.unwrap(), "fixed");
        assert_eq!(credentials.replacement_for("fixed").await.unwrap(), None);
    }
}
