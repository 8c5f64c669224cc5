use thiserror::Error;

#[derive(Debug, Error)]
pub enum EcrError {
    #[error("docker-credential-ecr-login can only be used with Amazon Elastic Container Registry")]
    NotEcrHost,

    #[error("{0} is not a valid repository URI for Amazon Elastic Container Registry")]
    MalformedEcrHost(String),

    #[error("Invalid authorization token encoding: {0}")]
    InvalidTokenEncoding(String),

    #[error("Invalid authorization token format: expected username:password")]
    InvalidTokenFormat,

    #[error("Failed to get authorization token from ECR: {0}")]
    RemoteUnavailable(String),

    #[error("No authorization data returned by ECR for {}", registry_label(.0))]
    NoAuthorizationData(Option<String>),

    #[error("Invalid proxy endpoint returned by ECR: {0}")]
    InvalidProxyEndpoint(String),
}

fn registry_label(registry_id: &Option<String>) -> String {
    match registry_id {
        Some(id) => format!("registry {}", id),
        None => "default registry".to_string(),
    }
}
