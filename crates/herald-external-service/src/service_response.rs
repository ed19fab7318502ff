//! Response classification and body parsing.
//!
//! Bodies are interpreted through an ordered list of total parse strategies.
//! Each strategy either recognises the body or declines; nothing here returns
//! an error, an unrecognised body degrades to [`ParsedBody::Unparseable`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const WRAPPED_RESPONSE_KEY: &str = "response";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Status code and raw body returned by the transport.
pub struct ServiceResponse {
    pub status: u16,
    pub body: String,
}

impl ServiceResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Which statuses take the success path.
pub enum SuccessStatusPolicy {
    /// Any 2xx status.
    #[default]
    AnySuccess,
    /// Exactly 200.
    OkOnly,
}

impl SuccessStatusPolicy {
    pub fn is_success(self, status: u16) -> bool {
        match self {
            Self::AnySuccess => (200..300).contains(&status),
            Self::OkOnly => status == 200,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnySuccess => "any_success",
            Self::OkOnly => "ok_only",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Tagged result of [`parse_response_body`].
pub enum ParsedBody {
    /// The whole body is a JSON object.
    JsonObject(Map<String, Value>),
    /// The body is a JSON array whose first element is (or encodes) an object.
    ArrayFirstObject(Map<String, Value>),
    /// The body is a JSON array whose first element is not an object.
    ArrayFirstText(String),
    /// The body is `[]`: valid JSON with nothing to report.
    EmptyArray,
    Unparseable,
}

impl ParsedBody {
    /// Key/value view used for template rendering. `None` when unparseable.
    pub fn fields(&self) -> Option<Map<String, Value>> {
        match self {
            Self::JsonObject(fields) | Self::ArrayFirstObject(fields) => Some(fields.clone()),
            Self::ArrayFirstText(text) => Some(wrapped_response_fields(text)),
            Self::EmptyArray => Some(Map::new()),
            Self::Unparseable => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::JsonObject(_) => "json_object",
            Self::ArrayFirstObject(_) => "array_first_object",
            Self::ArrayFirstText(_) => "array_first_text",
            Self::EmptyArray => "empty_array",
            Self::Unparseable => "unparseable",
        }
    }
}

type BodyParseStrategy = fn(&str) -> Option<ParsedBody>;

const BODY_PARSE_STRATEGIES: &[BodyParseStrategy] =
    &[parse_json_object_body, parse_json_array_body];

pub fn parse_response_body(body: &str) -> ParsedBody {
    BODY_PARSE_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(body))
        .unwrap_or(ParsedBody::Unparseable)
}

/// Reply text for a success response rendered without a template.
///
/// Object bodies and bodies that are not JSON pass through verbatim. Array
/// bodies collapse to their first element, and an empty array renders empty.
pub fn render_plain_reply(body: &str) -> String {
    match parse_response_body(body) {
        ParsedBody::ArrayFirstObject(fields) => Value::Object(fields).to_string(),
        ParsedBody::ArrayFirstText(text) => text,
        ParsedBody::EmptyArray => String::new(),
        ParsedBody::JsonObject(_) | ParsedBody::Unparseable => body.to_string(),
    }
}

pub(crate) fn wrapped_response_fields(text: &str) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        WRAPPED_RESPONSE_KEY.to_string(),
        Value::String(text.to_string()),
    );
    fields
}

fn parse_json_object_body(body: &str) -> Option<ParsedBody> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => Some(ParsedBody::JsonObject(fields)),
        _ => None,
    }
}

fn parse_json_array_body(body: &str) -> Option<ParsedBody> {
    let Ok(Value::Array(elements)) = serde_json::from_str::<Value>(body) else {
        return None;
    };
    let Some(first) = elements.into_iter().next() else {
        return Some(ParsedBody::EmptyArray);
    };
    Some(match first {
        Value::Object(fields) => ParsedBody::ArrayFirstObject(fields),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(fields)) => ParsedBody::ArrayFirstObject(fields),
            _ => ParsedBody::ArrayFirstText(text),
        },
        other => ParsedBody::ArrayFirstText(other.to_string()),
    })
}
