use crate::azure::client::AzureError;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content, ErrorCode},
};
use serde::Serialize;

const INVALID_PARAMS: i32 = -32602;
const SERVER_ERROR: i32 = -32000;

/// Maps a service error to the tool error returned to the client.
/// Argument errors keep the JSON-RPC invalid-params code.
pub fn azure_error(e: AzureError) -> McpError {
    let code = match e {
        AzureError::InvalidArgument(_) => INVALID_PARAMS,
        _ => SERVER_ERROR,
    };
    McpError {
        code: ErrorCode(code),
        message: e.to_string().into(),
        data: None,
    }
}

pub fn invalid_params(message: impl Into<String>) -> McpError {
    let message: String = message.into();
    McpError {
        code: ErrorCode(INVALID_PARAMS),
        message: message.into(),
        data: None,
    }
}

pub fn internal_error(message: impl Into<String>) -> McpError {
    let message: String = message.into();
    McpError {
        code: ErrorCode(SERVER_ERROR),
        message: message.into(),
        data: None,
    }
}

pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Pretty-printed JSON tool output.
pub fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| internal_error(format!("Failed to serialize result: {}", e)))?;
    Ok(text_result(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_are_invalid_params() {
        let err = azure_error(AzureError::InvalidArgument("bad status".into()));
        assert_eq!(err.code, ErrorCode(-32602));
        assert_eq!(err.message, "Invalid argument: bad status");
    }

    #[test]
    fn remote_errors_are_server_errors() {
        let err = azure_error(AzureError::RepositoryMismatch {
            pull_request_id: 3,
            expected: "web".into(),
            actual: "api".into(),
        });
        assert_eq!(err.code, ErrorCode(-32000));
        assert_eq!(
            err.message,
            "Pull request 3 belongs to repository api, not web"
        );
    }
}
