//! JSON-RPC protocol types for the QA server

use crate::error::QaError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// JSON-RPC Request format
#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: Option<serde_json::Value>,
    pub method: String,
    pub params: Option<serde_json::Value>,
}

/// JSON-RPC Response format
#[derive(Debug, Serialize)]
pub struct Response {
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

/// JSON-RPC Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: i32,
    pub message: String,
}

impl Response {
    /// Create a success response with a JSON value
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Response {
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create a success response from any serializable result
    pub fn typed<T: Serialize>(id: Option<serde_json::Value>, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize result: {}", e),
            ),
        }
    }

    /// Create an error response
    pub fn error(id: Option<serde_json::Value>, code: i32, message: String) -> Self {
        Response {
            id,
            result: None,
            error: Some(ErrorResponse { code, message }),
        }
    }

    /// Error response for a library error, with the matching code
    pub fn qa_error(id: Option<serde_json::Value>, err: &QaError) -> Self {
        Self::error(id, error_codes::for_error(err), err.to_string())
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Deserialize request params, or build the invalid-params response
pub fn parse_params<T: DeserializeOwned>(
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
    expected: &str,
) -> Result<T, Response> {
    let value = params.unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value).map_err(|e| {
        Response::error(
            id,
            error_codes::INVALID_PARAMS,
            format!("Invalid params: expected {} ({})", expected, e),
        )
    })
}

/// Standard JSON-RPC error codes
pub mod error_codes {
    use crate::error::QaError;

    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Custom error codes
    pub const NO_PROJECT_LOADED: i32 = 2;
    pub const LAYER_NOT_FOUND: i32 = 3;
    pub const SAVE_FAILED: i32 = 4;
    pub const LOAD_FAILED: i32 = 5;
    pub const GROUP_NOT_FOUND: i32 = 6;
    pub const INVALID_CONFIG: i32 = 7;
    pub const NOT_CONFIRMED: i32 = 8;
    pub const CANCELLED: i32 = 9;
    pub const EDIT_FAILED: i32 = 10;

    pub fn for_error(err: &QaError) -> i32 {
        match err {
            QaError::MissingLayer(_) => LAYER_NOT_FOUND,
            QaError::MissingGroup(_) | QaError::UnknownGroup(_) => GROUP_NOT_FOUND,
            QaError::InvalidRuleTable(_) | QaError::InvalidConfig(_) => INVALID_CONFIG,
            QaError::InvalidArgument(_) => INVALID_PARAMS,
            QaError::Cancelled => CANCELLED,
            QaError::MissingField { .. } | QaError::MissingFeature { .. } | QaError::Edit { .. } => {
                EDIT_FAILED
            }
            QaError::Io(_) | QaError::Json(_) => INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_params_reported() {
        #[derive(Debug, Deserialize)]
        struct P {
            #[allow(dead_code)]
            zone: String,
        }
        let err = parse_params::<P>(Some(serde_json::json!(1)), None, "{zone}").unwrap_err();
        assert_eq!(err.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_error_serialization_skips_result() {
        let r = Response::qa_error(None, &QaError::MissingLayer("Chambre".into()));
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("result").is_none());
        assert_eq!(json["error"]["code"], error_codes::LAYER_NOT_FOUND);
    }
}
