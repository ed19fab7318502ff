use thiserror::Error;

#[derive(Debug, Error)]
/// Failures that abort an external-service invocation.
///
/// Non-success HTTP statuses are not errors: they are classified into a reply
/// by the invoker. Only collaborator-boundary failures surface here.
pub enum ExternalServiceError {
    #[error("failed to build external service http client: {0}")]
    Client(String),
    #[error("invalid request header '{name}': {detail}")]
    InvalidHeader { name: String, detail: String },
    #[error("invalid external service url '{url}': {detail}")]
    InvalidUrl { url: String, detail: String },
    #[error("external service {operation} request to {url} failed: {detail}")]
    Transport {
        operation: String,
        url: String,
        detail: String,
    },
    #[error("failed to fetch reply template '{location}': {detail}")]
    TemplateFetch { location: String, detail: String },
}

impl ExternalServiceError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Client(_) => "external_service_client_unavailable",
            Self::InvalidHeader { .. } => "external_service_invalid_header",
            Self::InvalidUrl { .. } => "external_service_invalid_url",
            Self::Transport { .. } => "external_service_transport_failed",
            Self::TemplateFetch { .. } => "external_service_template_fetch_failed",
        }
    }
}
