use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::Client as EcrClient;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::client::{RawToken, TokenSource};
use crate::error::EcrError;
use crate::settings::AwsSettings;

/// Token source backed by the ECR GetAuthorizationToken API
pub struct EcrTokenSource {
    client: EcrClient,
}

impl EcrTokenSource {
    /// Create a new ECR token source
    pub async fn new(settings: &AwsSettings) -> Result<Self> {
        // Build AWS config
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        // Use static credentials if provided, otherwise the default
        // credential chain (IAM role, env vars, etc.)
        if let (Some(access_key), Some(secret_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            let creds =
                aws_sdk_ecr::config::Credentials::new(access_key, secret_key, None, None, "static");
            loader = loader.credentials_provider(creds);
        }

        let aws_config = loader.load().await;

        Ok(Self {
            client: EcrClient::new(&aws_config),
        })
    }
}

#[async_trait]
impl TokenSource for EcrTokenSource {
    async fn fetch_token(&self, registry_id: Option<&str>) -> Result<RawToken, EcrError> {
        let mut request = self.client.get_authorization_token();
        match registry_id {
            Some(id) => {
                debug!(registry = %id, "Calling ECR GetAuthorizationToken");
                // Deprecated upstream but still honored; omitting it returns
                // the default registry token instead.
                #[allow(deprecated)]
                {
                    request = request.registry_ids(id);
                }
            }
            None => debug!("Calling ECR GetAuthorizationToken for default registry"),
        }

        let output = request
            .send()
            .await
            .map_err(|e| EcrError::RemoteUnavailable(e.to_string()))?;

        let no_data = || EcrError::NoAuthorizationData(registry_id.map(|id| id.to_string()));

        // Take the first authorization data element carrying a usable token
        let auth_data = output
            .authorization_data()
            .iter()
            .find(|d| d.authorization_token().is_some() && d.proxy_endpoint().is_some())
            .ok_or_else(no_data)?;

        let authorization_token = auth_data
            .authorization_token()
            .ok_or_else(no_data)?
            .to_string();
        let proxy_endpoint = auth_data.proxy_endpoint().ok_or_else(no_data)?.to_string();
        let expires_at = auth_data
            .expires_at()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
            .ok_or_else(no_data)?;

        Ok(RawToken {
            authorization_token,
            proxy_endpoint,
            expires_at,
        })
    }
}
