//! External-service integration for Herald command handlers.
//!
//! Builds outbound HTTP requests from declarative service descriptors plus an
//! invocation context, dispatches them through a pluggable transport, and
//! turns heterogeneous response bodies into a single reply (or a suppressed
//! result) for the respond channel.

pub mod service_descriptor;
pub mod service_error;
pub mod service_invoker;
pub mod service_request;
pub mod service_response;
pub mod service_template;
pub mod service_transport;

pub use service_descriptor::{HttpMethod, InvocationContext, ServiceDescriptor};
pub use service_error::ExternalServiceError;
pub use service_invoker::{ExternalServiceInvoker, ServiceReply, SuppressReason};
pub use service_request::{build_service_request, ServiceRequest};
pub use service_response::{
    parse_response_body, ParsedBody, ServiceResponse, SuccessStatusPolicy,
};
pub use service_template::{
    raw_content_templates_base_url, render_reply_template, FsTemplateSource,
    HttpTemplateSource, TemplateSource,
};
pub use service_transport::{HttpTransport, ReqwestTransport, ReqwestTransportConfig};
