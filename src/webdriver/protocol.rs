// W3C WebDriver / Appium wire types. Every response is wrapped as {"value": ...}.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct NewSessionRequest {
    pub capabilities: CapabilitiesRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesRequest {
    pub always_match: Map<String, Value>,
    pub first_match: Vec<Map<String, Value>>,
}

impl NewSessionRequest {
    pub fn new(always_match: Map<String, Value>) -> Self {
        Self {
            capabilities: CapabilitiesRequest {
                always_match,
                first_match: vec![Map::new()],
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PullRequest {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub value: Value,
    /// Legacy JSONWP servers put the session id beside `value`.
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionValue {
    pub session_id: Option<String>,
    #[serde(default)]
    pub capabilities: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorValue {
    pub error: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stacktrace: Option<String>,
}

impl ErrorValue {
    /// Extracts a W3C error object from a response `value`, if it is one.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.get("error") {
            Some(Value::String(_)) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusValue {
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub build: Option<BuildInfo>,
}

#[derive(Debug, Deserialize)]
pub struct BuildInfo {
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_session_request_shape() {
        let mut caps = Map::new();
        caps.insert("platformName".to_string(), json!("iOS"));

        let body = serde_json::to_value(NewSessionRequest::new(caps)).unwrap();
        assert_eq!(
            body,
            json!({"capabilities": {"alwaysMatch": {"platformName": "iOS"}, "firstMatch": [{}]}})
        );
    }

    #[test]
    fn test_error_value_detection() {
        let value = json!({"error": "unknown error", "message": "privilege denied"});
        let error = ErrorValue::from_value(&value).unwrap();
        assert_eq!(error.error, "unknown error");
        assert_eq!(error.message, "privilege denied");

        assert!(ErrorValue::from_value(&json!("UEsDBA==")).is_none());
        assert!(ErrorValue::from_value(&json!({"sessionId": "abc"})).is_none());
    }
}
