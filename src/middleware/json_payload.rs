use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use tracing::debug;

/// Lenient JSON object body.
///
/// Ignores `Content-Type`. An empty, malformed, or non-object body is treated
/// as `{}` so the handler reports "no valid fields" instead of a parse error.
/// Oversized bodies are still rejected by the body limit.
#[derive(Debug, Clone, Default)]
pub struct JsonPayload(pub Map<String, Value>);

impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(JsonPayload(map)),
            Ok(other) => {
                debug!(kind = json_kind(&other), "request body is not a JSON object");
                Ok(JsonPayload::default())
            }
            Err(e) => {
                if !bytes.is_empty() {
                    debug!(error = %e, "ignoring unparseable request body");
                }
                Ok(JsonPayload::default())
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
