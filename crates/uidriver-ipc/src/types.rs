use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::error_codes;

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl RpcRequest {
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|p| p.get(key))
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(|v| v.as_str())
    }

    pub fn param_u64(&self, key: &str, default: u64) -> u64 {
        self.param(key)
            .and_then(|v| v.as_u64())
            .unwrap_or(default)
    }

    pub fn param_u32(&self, key: &str, default: u32) -> u32 {
        self.param_u64(key, default as u64) as u32
    }

    #[allow(clippy::result_large_err)]
    pub fn require_str(&self, key: &str) -> Result<&str, RpcResponse> {
        self.param_str(key).ok_or_else(|| {
            RpcResponse::invalid_argument(self.id, key, "is required and must be a string")
        })
    }
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    jsonrpc: String,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcServerError>,
}

#[derive(Debug, Serialize)]
pub struct RpcServerError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl RpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Success shape for commands executed within a session: the owning
    /// session id plus the command's optional result value.
    pub fn command_success(id: u64, session_id: &str, value: Value) -> Self {
        Self::success(id, json!({ "session": session_id, "value": value }))
    }

    pub fn error(id: u64, code: i32, message: &str) -> Self {
        Self::error_with_data(id, code, message, None)
    }

    /// Error with extra structured context merged under the standard
    /// `kind`/`category`/`retryable` fields.
    pub fn error_with_data(id: u64, code: i32, message: &str, context: Option<Value>) -> Self {
        let mut data = json!({
            "kind": error_codes::kind_for_code(code),
            "category": error_codes::category_for_code(code).as_str(),
            "retryable": error_codes::is_retryable(code),
        });
        if let Some(Value::Object(extra)) = context {
            if let Value::Object(map) = &mut data {
                for (k, v) in extra {
                    map.insert(k, v);
                }
            }
        }
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(RpcServerError {
                code,
                message: message.to_string(),
                data: Some(data),
            }),
        }
    }

    pub fn invalid_argument(id: u64, field: &str, problem: &str) -> Self {
        Self::error_with_data(
            id,
            error_codes::INVALID_ARGUMENT,
            &format!("Invalid argument '{}': {}", field, problem),
            Some(json!({ "field": field })),
        )
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error_code(&self) -> Option<i32> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    pub fn error_data(&self) -> Option<&Value> {
        self.error.as_ref().and_then(|e| e.data.as_ref())
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request(params: Option<Value>) -> RpcRequest {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "test",
            "params": params,
        }))
        .unwrap()
    }

    #[test]
    fn test_param_str_extracts_string() {
        let req = make_request(Some(json!({"element": "ab12cd34"})));
        assert_eq!(req.param_str("element"), Some("ab12cd34"));
    }

    #[test]
    fn test_param_str_none_for_missing_or_wrong_type() {
        let req = make_request(Some(json!({"x": 5})));
        assert_eq!(req.param_str("element"), None);
        assert_eq!(req.param_str("x"), None);
    }

    #[test]
    fn test_param_u64_default() {
        let req = make_request(Some(json!({"duration_ms": 800})));
        assert_eq!(req.param_u64("duration_ms", 500), 800);
        assert_eq!(req.param_u64("steps", 20), 20);
    }

    #[test]
    fn test_params_absent() {
        let req = make_request(None);
        assert_eq!(req.param("anything"), None);
    }

    #[test]
    fn test_require_str_error_names_field() {
        let req = make_request(Some(json!({})));
        let resp = req.require_str("strategy").unwrap_err();
        assert_eq!(resp.error_code(), Some(error_codes::INVALID_ARGUMENT));
        assert!(resp.error_message().unwrap().contains("strategy"));
        assert_eq!(resp.error_data().unwrap()["field"], "strategy");
    }

    #[test]
    fn test_success_wire_shape() {
        let resp = RpcResponse::success(42, json!({"pong": true}));
        let text = serde_json::to_string(&resp).unwrap();
        assert!(text.contains("\"jsonrpc\":\"2.0\""));
        assert!(text.contains("\"id\":42"));
        assert!(text.contains("\"result\""));
        assert!(!text.contains("\"error\""));
    }

    #[test]
    fn test_command_success_carries_session() {
        let resp = RpcResponse::command_success(7, "s1", json!({"x": 2, "y": 2}));
        let result = resp.result().unwrap();
        assert_eq!(result["session"], "s1");
        assert_eq!(result["value"]["x"], 2);
    }

    #[test]
    fn test_error_wire_shape() {
        let resp = RpcResponse::error(9, error_codes::ELEMENT_NOT_FOUND, "Element not found: e9");
        let text = serde_json::to_string(&resp).unwrap();
        assert!(text.contains("\"error\""));
        assert!(!text.contains("\"result\""));
        let data = resp.error_data().unwrap();
        assert_eq!(data["kind"], "element_not_found");
        assert_eq!(data["category"], "not_found");
        assert_eq!(data["retryable"], true);
    }

    #[test]
    fn test_error_with_data_merges_context() {
        let resp = RpcResponse::error_with_data(
            3,
            error_codes::ELEMENT_NOT_FOUND,
            "Element not found: e1",
            Some(json!({"element": "e1"})),
        );
        let data = resp.error_data().unwrap();
        assert_eq!(data["element"], "e1");
        assert_eq!(data["kind"], "element_not_found");
    }
}
