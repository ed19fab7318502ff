use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::service_descriptor::{HttpMethod, InvocationContext, ServiceDescriptor};
use crate::service_error::ExternalServiceError;
use crate::service_request::{build_service_request, ServiceRequest};
use crate::service_response::{
    parse_response_body, render_plain_reply, wrapped_response_fields, ParsedBody,
    ServiceResponse, SuccessStatusPolicy,
};
use crate::service_template::{render_reply_template, TemplateSource};
use crate::service_transport::HttpTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of one invocation: a reply for the respond channel, or nothing.
pub enum ServiceReply {
    Message(String),
    Suppressed(SuppressReason),
}

impl ServiceReply {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message.as_str()),
            Self::Suppressed(_) => None,
        }
    }

    pub fn into_message(self) -> Option<String> {
        match self {
            Self::Message(message) => Some(message),
            Self::Suppressed(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressReason {
    NoTargetConfigured,
    Silent,
    EmptyReply,
}

impl SuppressReason {
    pub fn reason_code(self) -> &'static str {
        match self {
            Self::NoTargetConfigured => "external_service_no_target",
            Self::Silent => "external_service_silent",
            Self::EmptyReply => "external_service_empty_reply",
        }
    }
}

pub fn service_unavailable_message(status: u16, service_name: &str) -> String {
    format!("Error ({status}). The {service_name} service is currently unavailable")
}

#[derive(Clone)]
/// Turns a service descriptor plus context into a single reply.
///
/// Holds no per-invocation state; one invoker can serve concurrent events.
pub struct ExternalServiceInvoker {
    transport: Arc<dyn HttpTransport>,
    template_source: Option<Arc<dyn TemplateSource>>,
    success_policy: SuccessStatusPolicy,
}

impl ExternalServiceInvoker {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            template_source: None,
            success_policy: SuccessStatusPolicy::default(),
        }
    }

    pub fn with_template_source(mut self, template_source: Arc<dyn TemplateSource>) -> Self {
        self.template_source = Some(template_source);
        self
    }

    pub fn with_success_policy(mut self, success_policy: SuccessStatusPolicy) -> Self {
        self.success_policy = success_policy;
        self
    }

    pub fn success_policy(&self) -> SuccessStatusPolicy {
        self.success_policy
    }

    pub async fn invoke(
        &self,
        descriptor: &ServiceDescriptor,
        context: &InvocationContext,
    ) -> Result<ServiceReply, ExternalServiceError> {
        let Some(request) = build_service_request(descriptor, context) else {
            debug!(
                service = %descriptor.name,
                reason_code = SuppressReason::NoTargetConfigured.reason_code(),
                "external service has no url; skipping"
            );
            return Ok(ServiceReply::Suppressed(SuppressReason::NoTargetConfigured));
        };
        if let Err(error) = reqwest::Url::parse(&request.url) {
            return Err(ExternalServiceError::InvalidUrl {
                url: request.url,
                detail: error.to_string(),
            });
        }

        let response = self.dispatch(&request).await?;
        info!(
            service = %descriptor.name,
            method = request.method.as_str(),
            status = response.status,
            "external service responded"
        );
        self.interpret(descriptor, &response).await
    }

    async fn dispatch(
        &self,
        request: &ServiceRequest,
    ) -> Result<ServiceResponse, ExternalServiceError> {
        match request.method {
            HttpMethod::Get => {
                self.transport
                    .get(&request.url, &request.query_pairs(), &request.headers)
                    .await
            }
            HttpMethod::Post => {
                self.transport
                    .post(&request.url, request.json_body(), &request.headers)
                    .await
            }
        }
    }

    async fn interpret(
        &self,
        descriptor: &ServiceDescriptor,
        response: &ServiceResponse,
    ) -> Result<ServiceReply, ExternalServiceError> {
        if descriptor.silent {
            debug!(
                service = %descriptor.name,
                status = response.status,
                reason_code = SuppressReason::Silent.reason_code(),
                "silent service; reply suppressed"
            );
            return Ok(ServiceReply::Suppressed(SuppressReason::Silent));
        }

        if !self.success_policy.is_success(response.status) {
            warn!(
                service = %descriptor.name,
                status = response.status,
                policy = self.success_policy.as_str(),
                "external service returned non-success status"
            );
            return Ok(ServiceReply::Message(service_unavailable_message(
                response.status,
                &descriptor.name,
            )));
        }

        let parsed = parse_response_body(&response.body);
        let reply = match (&parsed, descriptor.template_location()) {
            (ParsedBody::EmptyArray, _) => String::new(),
            (_, Some(location)) => {
                self.render_with_template(location, &parsed, &response.body)
                    .await?
            }
            (_, None) => render_plain_reply(&response.body),
        };
        if reply.trim().is_empty() {
            debug!(
                service = %descriptor.name,
                status = response.status,
                body_kind = parsed.kind(),
                reason_code = SuppressReason::EmptyReply.reason_code(),
                "external service reply is empty; reply suppressed"
            );
            return Ok(ServiceReply::Suppressed(SuppressReason::EmptyReply));
        }
        Ok(ServiceReply::Message(reply))
    }

    async fn render_with_template(
        &self,
        location: &str,
        parsed: &ParsedBody,
        body: &str,
    ) -> Result<String, ExternalServiceError> {
        let Some(template_source) = self.template_source.as_ref() else {
            return Err(ExternalServiceError::TemplateFetch {
                location: location.to_string(),
                detail: "no template source configured".to_string(),
            });
        };
        let template = template_source.fetch_template(location).await?;
        let fields = parsed
            .fields()
            .unwrap_or_else(|| wrapped_response_fields(body));
        debug!(template = location, body_kind = parsed.kind(), "rendering reply template");
        Ok(render_reply_template(&template, &fields))
    }
}
