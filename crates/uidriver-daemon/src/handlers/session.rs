//! Session lifecycle commands.

use serde_json::json;

use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

use crate::error::CommandError;
use crate::session::SessionRegistry;

pub fn handle_new_session(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    match registry.create() {
        Ok(id) => RpcResponse::success(request.id, json!({ "session": id.as_str() })),
        Err(e) => e.to_response(request.id),
    }
}

pub fn handle_delete_session(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    let session = match request.param_str("session") {
        Some(session) => session,
        None => return CommandError::missing("session").to_response(request.id),
    };
    match registry.delete(session) {
        Ok(()) => RpcResponse::success(request.id, json!({ "session": session, "deleted": true })),
        Err(e) => e.to_response(request.id),
    }
}

pub fn handle_activate_session(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    let session = match request.param_str("session") {
        Some(session) => session,
        None => return CommandError::missing("session").to_response(request.id),
    };
    match registry.set_active(session) {
        Ok(()) => RpcResponse::success(request.id, json!({ "session": session, "active": true })),
        Err(e) => e.to_response(request.id),
    }
}

pub fn handle_sessions(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    let sessions = registry.list();
    let active = registry.active_session_id().map(|id| id.to_string());
    RpcResponse::success(
        request.id,
        json!({ "sessions": sessions, "active": active }),
    )
}
