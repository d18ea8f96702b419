//! Chat request/response types and the upstream generate payload.
//!
//! Inbound requests are decoded by explicit field-presence checks rather
//! than a derived `Deserialize`, so that optional fields can take defaults
//! and loosely typed values (numeric strings, `"true"`) are coerced the
//! same way for every caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Sampling temperature used when the caller omits one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Token limit used when the caller omits `max_tokens`.
pub const DEFAULT_MAX_TOKENS: i64 = 500;

/// Errors produced while decoding an inbound chat request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The body is not valid JSON.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// The body is JSON but not an object.
    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("Field required: {0}")]
    MissingField(&'static str),

    /// A field is present but cannot be coerced to the expected type.
    #[error("Invalid value for '{field}': expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// A chat request as accepted on `POST /api/chat`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Prompt text forwarded to the model.
    pub message: String,
    /// Model identifier.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate (`num_predict` upstream).
    pub max_tokens: i64,
    /// Forwarded to upstream; the caller always receives a single document.
    pub stream: bool,
}

impl ChatRequest {
    /// Create a request with every optional field at its default.
    pub fn new(message: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            model: default_model.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }

    /// Decode a request from raw body bytes.
    pub fn from_slice(body: &[u8], default_model: &str) -> Result<Self, RequestError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| RequestError::InvalidJson(e.to_string()))?;
        Self::from_json(&value, default_model)
    }

    /// Decode a request from an already parsed JSON value.
    ///
    /// `null` for an optional field counts as absent. Unknown fields are
    /// ignored.
    pub fn from_json(value: &Value, default_model: &str) -> Result<Self, RequestError> {
        let obj = value.as_object().ok_or(RequestError::NotAnObject)?;

        let message = match present(obj, "message") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(invalid("message", "a string")),
            None => return Err(RequestError::MissingField("message")),
        };

        let model = match present(obj, "model") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(invalid("model", "a string")),
            None => default_model.to_string(),
        };

        let temperature = present(obj, "temperature")
            .map(|v| coerce_f64(v).ok_or_else(|| invalid("temperature", "a number")))
            .transpose()?
            .unwrap_or(DEFAULT_TEMPERATURE);

        let max_tokens = present(obj, "max_tokens")
            .map(|v| coerce_i64(v).ok_or_else(|| invalid("max_tokens", "an integer")))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let stream = present(obj, "stream")
            .map(|v| coerce_bool(v).ok_or_else(|| invalid("stream", "a boolean")))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            message,
            model,
            temperature,
            max_tokens,
            stream,
        })
    }
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

const fn invalid(field: &'static str, expected: &'static str) -> RequestError {
    RequestError::InvalidField { field, expected }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Sampling options nested in the upstream generate payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    pub temperature: f64,
    pub num_predict: i64,
}

/// Body sent to the upstream `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratePayload {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

impl From<&ChatRequest> for GeneratePayload {
    fn from(req: &ChatRequest) -> Self {
        Self {
            model: req.model.clone(),
            prompt: req.message.clone(),
            stream: req.stream,
            options: GenerateOptions {
                temperature: req.temperature,
                num_predict: req.max_tokens,
            },
        }
    }
}

/// Response returned from `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub model: String,
    pub total_duration: u64,
    pub load_duration: u64,
    pub prompt_eval_count: u64,
    pub eval_count: u64,
}

impl ChatResponse {
    /// Build a response from one upstream generate document.
    ///
    /// Returns `None` when the document has no string `response` field.
    /// Counters that are absent or not unsigned integers become 0.
    pub fn from_generate_reply(reply: &Value, model: &str) -> Option<Self> {
        let response = reply.get("response")?.as_str()?.to_string();
        Some(Self {
            response,
            model: model.to_string(),
            total_duration: counter(reply, "total_duration"),
            load_duration: counter(reply, "load_duration"),
            prompt_eval_count: counter(reply, "prompt_eval_count"),
            eval_count: counter(reply, "eval_count"),
        })
    }

    /// Fold a sequence of streamed generate chunks into one response.
    ///
    /// `response` fragments are concatenated in order; each counter is taken
    /// from the last chunk that carries it. Returns `None` when no chunk has
    /// a string `response` field.
    pub fn from_generate_chunks(chunks: &[Value], model: &str) -> Option<Self> {
        let mut seen_response = false;
        let mut text = String::new();
        for chunk in chunks {
            if let Some(fragment) = chunk.get("response").and_then(Value::as_str) {
                seen_response = true;
                text.push_str(fragment);
            }
        }
        if !seen_response {
            return None;
        }

        let last = |key: &str| {
            chunks
                .iter()
                .rev()
                .find_map(|c| c.get(key).and_then(Value::as_u64))
                .unwrap_or(0)
        };

        Some(Self {
            response: text,
            model: model.to_string(),
            total_duration: last("total_duration"),
            load_duration: last("load_duration"),
            prompt_eval_count: last("prompt_eval_count"),
            eval_count: last("eval_count"),
        })
    }
}

fn counter(reply: &Value, key: &str) -> u64 {
    reply.get(key).and_then(Value::as_u64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MODEL: &str = "llama3.2:3b";

    #[test]
    fn test_defaults_fill_missing_fields() {
        let req = ChatRequest::from_json(&json!({"message": "hello"}), MODEL).unwrap();
        assert_eq!(req, ChatRequest::new("hello", MODEL));
        assert!((req.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, 500);
        assert!(!req.stream);
    }

    #[test]
    fn test_null_optional_fields_take_defaults() {
        let req = ChatRequest::from_json(
            &json!({"message": "hi", "model": null, "temperature": null, "stream": null}),
            MODEL,
        )
        .unwrap();
        assert_eq!(req.model, MODEL);
        assert!(!req.stream);
    }

    #[test]
    fn test_explicit_fields_override_defaults() {
        let req = ChatRequest::from_json(
            &json!({
                "message": "hi",
                "model": "mistral",
                "temperature": 0.2,
                "max_tokens": 64,
                "stream": true,
                "unknown": "ignored"
            }),
            MODEL,
        )
        .unwrap();
        assert_eq!(req.model, "mistral");
        assert!((req.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, 64);
        assert!(req.stream);
    }

    #[test]
    fn test_basic_type_coercion() {
        let req = ChatRequest::from_json(
            &json!({
                "message": "hi",
                "temperature": "1.5",
                "max_tokens": 128.0,
                "stream": "TRUE"
            }),
            MODEL,
        )
        .unwrap();
        assert!((req.temperature - 1.5).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, 128);
        assert!(req.stream);

        let req = ChatRequest::from_json(
            &json!({"message": "hi", "temperature": 1, "max_tokens": "32", "stream": 0}),
            MODEL,
        )
        .unwrap();
        assert!((req.temperature - 1.0).abs() < f64::EPSILON);
        assert_eq!(req.max_tokens, 32);
        assert!(!req.stream);
    }

    #[test]
    fn test_missing_message_is_rejected() {
        let err = ChatRequest::from_json(&json!({"model": "x"}), MODEL).unwrap_err();
        assert_eq!(err, RequestError::MissingField("message"));
        assert_eq!(err.to_string(), "Field required: message");
    }

    #[test]
    fn test_wrongly_typed_fields_are_rejected() {
        let err = ChatRequest::from_json(&json!({"message": 5}), MODEL).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "message", .. }));

        let err =
            ChatRequest::from_json(&json!({"message": "hi", "max_tokens": 1.5}), MODEL).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "max_tokens", .. }));

        let err =
            ChatRequest::from_json(&json!({"message": "hi", "temperature": "warm"}), MODEL).unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "temperature", .. }));

        let err = ChatRequest::from_json(&json!({"message": "hi", "stream": "maybe"}), MODEL)
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidField { field: "stream", .. }));
    }

    #[test]
    fn test_non_object_and_invalid_json() {
        assert_eq!(
            ChatRequest::from_json(&json!(["hi"]), MODEL).unwrap_err(),
            RequestError::NotAnObject
        );
        assert!(matches!(
            ChatRequest::from_slice(b"{not json", MODEL).unwrap_err(),
            RequestError::InvalidJson(_)
        ));
    }

    #[test]
    fn test_generate_payload_mirrors_request() {
        let mut req = ChatRequest::new("why is the sky blue?", "phi3");
        req.temperature = 0.1;
        req.max_tokens = -1;
        req.stream = true;

        let payload = serde_json::to_value(GeneratePayload::from(&req)).unwrap();
        assert_eq!(
            payload,
            json!({
                "model": "phi3",
                "prompt": "why is the sky blue?",
                "stream": true,
                "options": {"temperature": 0.1, "num_predict": -1}
            })
        );
    }

    #[test]
    fn test_counters_default_to_zero() {
        let resp =
            ChatResponse::from_generate_reply(&json!({"response": "hi", "eval_count": 5}), MODEL)
                .unwrap();
        assert_eq!(resp.response, "hi");
        assert_eq!(resp.model, MODEL);
        assert_eq!(resp.eval_count, 5);
        assert_eq!(resp.total_duration, 0);
        assert_eq!(resp.load_duration, 0);
        assert_eq!(resp.prompt_eval_count, 0);
    }

    #[test]
    fn test_missing_response_field() {
        assert!(ChatResponse::from_generate_reply(&json!({"eval_count": 5}), MODEL).is_none());
        assert!(ChatResponse::from_generate_reply(&json!({"response": 7}), MODEL).is_none());
    }

    #[test]
    fn test_chunks_are_concatenated() {
        let chunks = vec![
            json!({"response": "Hel", "done": false}),
            json!({"response": "lo", "done": false}),
            json!({"response": "", "done": true, "total_duration": 900, "eval_count": 2}),
        ];
        let resp = ChatResponse::from_generate_chunks(&chunks, MODEL).unwrap();
        assert_eq!(resp.response, "Hello");
        assert_eq!(resp.total_duration, 900);
        assert_eq!(resp.eval_count, 2);
        assert_eq!(resp.prompt_eval_count, 0);

        assert!(ChatResponse::from_generate_chunks(&[json!({"done": true})], MODEL).is_none());
    }
}
