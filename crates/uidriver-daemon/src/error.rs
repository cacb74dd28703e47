//! Domain errors for command execution.
//!
//! Every failure a command can produce maps to a JSON-RPC error code and a
//! structured context object, so clients can branch on the error kind
//! instead of parsing messages. Nothing here ever tears down a session;
//! errors always become responses.

use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use uidriver_core::UnsupportedStrategy;
use uidriver_ipc::RpcResponse;
use uidriver_ipc::error_codes;
use uidriver_ipc::error_codes::ErrorCategory;

use crate::device::DeviceError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("No active session")]
    NoActiveSession,
    #[error("Session limit reached: maximum {0} sessions allowed")]
    SessionLimit(usize),
    #[error("Timed out waiting for session lock")]
    LockTimeout { session_id: Option<String> },
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Invalid argument '{field}': {problem}")]
    InvalidArgument { field: String, problem: String },
    #[error(transparent)]
    UnsupportedStrategy(#[from] UnsupportedStrategy),
    #[error("Invalid element state: {0}")]
    InvalidElementState(String),
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

impl CommandError {
    /// A required parameter is absent.
    pub fn missing(field: &str) -> Self {
        CommandError::InvalidArgument {
            field: field.to_string(),
            problem: "is required".to_string(),
        }
    }

    /// A parameter is present but has the wrong shape.
    pub fn malformed(field: &str, expected: &str) -> Self {
        CommandError::InvalidArgument {
            field: field.to_string(),
            problem: format!("must be {}", expected),
        }
    }

    /// Returns the JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            CommandError::SessionNotFound(_) => error_codes::SESSION_NOT_FOUND,
            CommandError::NoActiveSession => error_codes::NO_ACTIVE_SESSION,
            CommandError::SessionLimit(_) => error_codes::SESSION_LIMIT,
            CommandError::LockTimeout { .. } => error_codes::LOCK_TIMEOUT,
            CommandError::ElementNotFound(_) => error_codes::ELEMENT_NOT_FOUND,
            CommandError::InvalidArgument { .. } => error_codes::INVALID_ARGUMENT,
            CommandError::UnsupportedStrategy(_) => error_codes::UNSUPPORTED_STRATEGY,
            CommandError::InvalidElementState(_) => error_codes::INVALID_ELEMENT_STATE,
            CommandError::ExecutionFailed(_) => error_codes::EXECUTION_FAILED,
        }
    }

    /// Returns the error category for programmatic handling.
    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    /// Returns structured context about the error for debugging.
    pub fn context(&self) -> Value {
        match self {
            CommandError::SessionNotFound(id) => json!({ "session": id }),
            CommandError::NoActiveSession => json!({}),
            CommandError::SessionLimit(max) => json!({ "max_sessions": max }),
            CommandError::LockTimeout { session_id } => match session_id {
                Some(id) => json!({ "session": id }),
                None => json!({}),
            },
            CommandError::ElementNotFound(element) => json!({ "element": element }),
            CommandError::InvalidArgument { field, .. } => json!({ "field": field }),
            CommandError::UnsupportedStrategy(err) => json!({ "strategy": err.key }),
            CommandError::InvalidElementState(reason) => json!({ "reason": reason }),
            CommandError::ExecutionFailed(reason) => json!({ "reason": reason }),
        }
    }

    /// Map the failure onto the wire. Every command ends here or in
    /// `RpcResponse::command_success`; raw faults never cross the socket.
    pub fn to_response(&self, request_id: u64) -> RpcResponse {
        RpcResponse::error_with_data(
            request_id,
            self.code(),
            &self.to_string(),
            Some(self.context()),
        )
    }
}

impl From<DeviceError> for CommandError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::InvalidState(reason) => CommandError::InvalidElementState(reason),
            DeviceError::Stale => CommandError::ElementNotFound("stale element".to_string()),
            DeviceError::Failure(reason) => CommandError::ExecutionFailed(reason),
        }
    }
}

/// Daemon startup and lifecycle errors.
#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("Failed to bind socket: {0}")]
    SocketBind(String),
    #[error("Another daemon instance is already running")]
    AlreadyRunning,
    #[error("Failed to acquire lock: {0}")]
    LockFailed(String),
    #[error("Failed to setup signal handler: {0}")]
    SignalSetup(String),
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(String),
}

impl DaemonError {
    pub fn code(&self) -> i32 {
        error_codes::DAEMON_ERROR
    }

    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::External
    }
}
