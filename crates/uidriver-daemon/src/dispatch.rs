//! The fixed command-dispatch sequence.
//!
//! Every session-scoped command runs the same pipeline: resolve the
//! session, take its lock, parse and resolve parameters, execute the
//! command-specific action, and map the outcome onto the wire. Handlers
//! supply only the action closure; none of them re-implements validation
//! or error mapping. Any stage can fail straight to a structured error
//! response.

use serde_json::Value;

use uidriver_core::Point;
use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

use crate::error::CommandError;
use crate::lock_helpers::LOCK_TIMEOUT;
use crate::lock_helpers::acquire_lock;
use crate::resolve::TargetParams;
use crate::session::Session;
use crate::session::SessionRegistry;

/// The value merged into the success response, or the command's failure.
pub type ActionResult = Result<Value, CommandError>;

/// Run a command against one locked session.
pub fn run_session_command<F>(
    registry: &SessionRegistry,
    request: &RpcRequest,
    action: F,
) -> RpcResponse
where
    F: FnOnce(&mut Session, &RpcRequest) -> ActionResult,
{
    let session = match registry.resolve(request.param_str("session")) {
        Ok(session) => session,
        Err(e) => return e.to_response(request.id),
    };

    let Some(mut sess) = acquire_lock(&session, LOCK_TIMEOUT) else {
        let err = CommandError::LockTimeout {
            session_id: request.param_str("session").map(str::to_string),
        };
        return err.to_response(request.id);
    };

    let session_id = sess.id.to_string();
    match action(&mut sess, request) {
        Ok(value) => RpcResponse::command_success(request.id, &session_id, value),
        Err(e) => e.to_response(request.id),
    }
}

/// Run a pointer command: parse the target params, resolve them to a point
/// against the session's element cache, then execute the gesture.
pub fn run_pointer_command<F>(
    registry: &SessionRegistry,
    request: &RpcRequest,
    action: F,
) -> RpcResponse
where
    F: FnOnce(&mut Session, Point, &RpcRequest) -> ActionResult,
{
    run_session_command(registry, request, |session, request| {
        let params = TargetParams::from_params(request.params.as_ref())?;
        let point = session.resolve_target(&params)?;
        action(session, point, request)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DeviceState;
    use crate::test_support::scripted_factory;
    use serde_json::json;
    use std::sync::Arc;
    use uidriver_core::ElementHandle;
    use uidriver_core::Rect;
    use uidriver_ipc::error_codes;

    fn request(method: &str, params: Value) -> RpcRequest {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        }))
        .unwrap()
    }

    fn registry_with_session() -> SessionRegistry {
        let registry = SessionRegistry::new(scripted_factory(Arc::new(DeviceState::default())));
        registry.create().unwrap();
        registry
    }

    #[test]
    fn test_success_carries_session_and_value() {
        let registry = registry_with_session();
        let resp = run_session_command(&registry, &request("probe", json!({})), |_, _| {
            Ok(json!({"ok": 1}))
        });
        let result = resp.result().unwrap();
        assert!(result["session"].is_string());
        assert_eq!(result["value"]["ok"], 1);
    }

    #[test]
    fn test_action_error_maps_to_wire() {
        let registry = registry_with_session();
        let resp = run_session_command(&registry, &request("probe", json!({})), |_, _| {
            Err(CommandError::InvalidElementState("obscured".into()))
        });
        assert_eq!(
            resp.error_code(),
            Some(error_codes::INVALID_ELEMENT_STATE)
        );
    }

    #[test]
    fn test_unknown_session_rejected_before_action() {
        let registry = registry_with_session();
        let resp = run_session_command(
            &registry,
            &request("probe", json!({"session": "nope"})),
            |_, _| panic!("action must not run"),
        );
        assert_eq!(resp.error_code(), Some(error_codes::SESSION_NOT_FOUND));
    }

    #[test]
    fn test_pointer_command_resolves_before_action() {
        let registry = registry_with_session();
        let session = registry.resolve(None).unwrap();
        let id = session
            .lock()
            .unwrap()
            .cache_mut()
            .put(ElementHandle::new(Rect::new(0, 0, 4, 4)));

        let resp = run_pointer_command(
            &registry,
            &request("probe", json!({"element": id})),
            |_, point, _| Ok(json!({"x": point.x, "y": point.y})),
        );
        let value = &resp.result().unwrap()["value"];
        assert_eq!(value["x"], 2);
        assert_eq!(value["y"], 2);
    }

    #[test]
    fn test_pointer_command_validation_short_circuits() {
        let registry = registry_with_session();
        let resp = run_pointer_command(
            &registry,
            &request("probe", json!({"x": 5})),
            |_, _, _| panic!("action must not run"),
        );
        assert_eq!(resp.error_code(), Some(error_codes::INVALID_ARGUMENT));
        assert!(resp.error_message().unwrap().contains('y'));
    }
}
