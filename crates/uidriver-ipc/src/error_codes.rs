//! Semantic error codes for JSON-RPC domain errors.
//!
//! Error codes follow the JSON-RPC 2.0 specification:
//! - -32700 to -32600: Reserved protocol errors
//! - -32000 to -32099: Server errors (we use -32001 to -32020 for domain errors)
//!
//! The code plus the `kind` string in the error payload are the contract;
//! no other numeric status vocabulary exists at this layer.

// Session-related errors
pub const SESSION_NOT_FOUND: i32 = -32001;
pub const NO_ACTIVE_SESSION: i32 = -32002;
pub const SESSION_LIMIT: i32 = -32003;
pub const LOCK_TIMEOUT: i32 = -32004;

// Target resolution errors
pub const ELEMENT_NOT_FOUND: i32 = -32005;
pub const INVALID_ARGUMENT: i32 = -32006;
pub const UNSUPPORTED_STRATEGY: i32 = -32007;

// Device action errors
pub const INVALID_ELEMENT_STATE: i32 = -32008;
pub const EXECUTION_FAILED: i32 = -32009;

// Daemon errors
pub const DAEMON_ERROR: i32 = -32010;

// Catch-all
pub const GENERIC_ERROR: i32 = -32000;

/// Stable kind string carried in the error payload alongside the code.
pub fn kind_for_code(code: i32) -> &'static str {
    match code {
        SESSION_NOT_FOUND => "session_not_found",
        NO_ACTIVE_SESSION => "no_active_session",
        SESSION_LIMIT => "session_limit",
        LOCK_TIMEOUT => "lock_timeout",
        ELEMENT_NOT_FOUND => "element_not_found",
        INVALID_ARGUMENT => "invalid_argument",
        UNSUPPORTED_STRATEGY => "unsupported_selector_strategy",
        INVALID_ELEMENT_STATE => "invalid_element_state",
        EXECUTION_FAILED => "execution_failed",
        DAEMON_ERROR => "daemon_error",
        _ => "error",
    }
}

/// Error category for programmatic handling by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Resource not found (session, element)
    NotFound,
    /// Invalid input parameters
    InvalidInput,
    /// Target resolved but in a state the action cannot run against
    InvalidState,
    /// Resource busy or locked
    Busy,
    /// Device/automation layer failure
    External,
    /// Internal server error
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::InvalidState => "invalid_state",
            ErrorCategory::Busy => "busy",
            ErrorCategory::External => "external",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(ErrorCategory::NotFound),
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "invalid_state" => Ok(ErrorCategory::InvalidState),
            "busy" => Ok(ErrorCategory::Busy),
            "external" => Ok(ErrorCategory::External),
            "internal" => Ok(ErrorCategory::Internal),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a retry of the same command could plausibly succeed.
///
/// Element and element-state errors describe UI state that can change
/// between commands; the daemon never retries them itself, but a client
/// may. Validation errors are pure input-shape problems and never benefit
/// from a retry.
pub fn is_retryable(code: i32) -> bool {
    matches!(
        code,
        LOCK_TIMEOUT | ELEMENT_NOT_FOUND | INVALID_ELEMENT_STATE | GENERIC_ERROR
    )
}

/// Returns the error category for a given error code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        SESSION_NOT_FOUND | NO_ACTIVE_SESSION | ELEMENT_NOT_FOUND => ErrorCategory::NotFound,
        INVALID_ARGUMENT | UNSUPPORTED_STRATEGY => ErrorCategory::InvalidInput,
        INVALID_ELEMENT_STATE => ErrorCategory::InvalidState,
        SESSION_LIMIT | LOCK_TIMEOUT => ErrorCategory::Busy,
        EXECUTION_FAILED | DAEMON_ERROR => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_not_retryable() {
        assert!(!is_retryable(INVALID_ARGUMENT));
        assert!(!is_retryable(UNSUPPORTED_STRATEGY));
        assert!(!is_retryable(SESSION_NOT_FOUND));
    }

    #[test]
    fn test_state_errors_retryable() {
        assert!(is_retryable(ELEMENT_NOT_FOUND));
        assert!(is_retryable(INVALID_ELEMENT_STATE));
        assert!(is_retryable(LOCK_TIMEOUT));
    }

    #[test]
    fn test_category_not_found() {
        assert_eq!(
            category_for_code(SESSION_NOT_FOUND),
            ErrorCategory::NotFound
        );
        assert_eq!(
            category_for_code(NO_ACTIVE_SESSION),
            ErrorCategory::NotFound
        );
        assert_eq!(
            category_for_code(ELEMENT_NOT_FOUND),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn test_category_invalid_input() {
        assert_eq!(
            category_for_code(INVALID_ARGUMENT),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            category_for_code(UNSUPPORTED_STRATEGY),
            ErrorCategory::InvalidInput
        );
    }

    #[test]
    fn test_category_invalid_state() {
        assert_eq!(
            category_for_code(INVALID_ELEMENT_STATE),
            ErrorCategory::InvalidState
        );
    }

    #[test]
    fn test_category_busy() {
        assert_eq!(category_for_code(SESSION_LIMIT), ErrorCategory::Busy);
        assert_eq!(category_for_code(LOCK_TIMEOUT), ErrorCategory::Busy);
    }

    #[test]
    fn test_category_external() {
        assert_eq!(category_for_code(EXECUTION_FAILED), ErrorCategory::External);
        assert_eq!(category_for_code(DAEMON_ERROR), ErrorCategory::External);
    }

    #[test]
    fn test_category_fallback_internal() {
        assert_eq!(category_for_code(-32099), ErrorCategory::Internal);
    }

    #[test]
    fn test_kind_strings_stable() {
        assert_eq!(kind_for_code(ELEMENT_NOT_FOUND), "element_not_found");
        assert_eq!(kind_for_code(INVALID_ARGUMENT), "invalid_argument");
        assert_eq!(
            kind_for_code(UNSUPPORTED_STRATEGY),
            "unsupported_selector_strategy"
        );
        assert_eq!(kind_for_code(INVALID_ELEMENT_STATE), "invalid_element_state");
        assert_eq!(kind_for_code(EXECUTION_FAILED), "execution_failed");
        assert_eq!(kind_for_code(-1), "error");
    }

    #[test]
    fn test_category_round_trip() {
        for cat in [
            ErrorCategory::NotFound,
            ErrorCategory::InvalidInput,
            ErrorCategory::InvalidState,
            ErrorCategory::Busy,
            ErrorCategory::External,
            ErrorCategory::Internal,
        ] {
            assert_eq!(cat.as_str().parse::<ErrorCategory>(), Ok(cat));
        }
        assert!("unknown".parse::<ErrorCategory>().is_err());
    }
}
