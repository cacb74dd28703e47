//! Pointer gesture commands. Each handler supplies only the action step;
//! target parsing and resolution run once in the dispatch layer.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

use crate::dispatch::run_pointer_command;
use crate::dispatch::run_session_command;
use crate::error::CommandError;
use crate::resolve::TargetParams;
use crate::session::SessionRegistry;

const DEFAULT_LONG_TAP_MS: u64 = 500;
const DEFAULT_DRAG_STEPS: u32 = 32;

pub fn handle_tap(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, _| {
        debug!(x = point.x, y = point.y, "performing tap");
        session.tap(point)?;
        Ok(json!({ "x": point.x, "y": point.y }))
    })
}

pub fn handle_double_tap(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, _| {
        debug!(x = point.x, y = point.y, "performing double tap");
        session.double_tap(point)?;
        Ok(json!({ "x": point.x, "y": point.y }))
    })
}

pub fn handle_long_tap(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, request| {
        let duration = Duration::from_millis(request.param_u64("duration_ms", DEFAULT_LONG_TAP_MS));
        debug!(
            x = point.x,
            y = point.y,
            duration_ms = duration.as_millis() as u64,
            "performing long tap"
        );
        session.long_tap(point, duration)?;
        Ok(json!({
            "x": point.x,
            "y": point.y,
            "duration_ms": duration.as_millis() as u64,
        }))
    })
}

pub fn handle_touch_down(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, _| {
        debug!(x = point.x, y = point.y, "performing touch down");
        session.touch_down(point)?;
        Ok(json!({ "x": point.x, "y": point.y }))
    })
}

pub fn handle_touch_up(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, _| {
        debug!(x = point.x, y = point.y, "performing touch up");
        session.touch_up(point)?;
        Ok(json!({ "x": point.x, "y": point.y }))
    })
}

pub fn handle_touch_move(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_pointer_command(registry, &request, |session, point, _| {
        debug!(x = point.x, y = point.y, "performing touch move");
        session.touch_move(point)?;
        Ok(json!({ "x": point.x, "y": point.y }))
    })
}

/// Two-point command; start and end each follow the same
/// element-or-coordinates policy as single-point gestures.
pub fn handle_drag(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_session_command(registry, &request, |session, request| {
        let from = request
            .param("from")
            .ok_or_else(|| CommandError::missing("from"))?;
        let to = request
            .param("to")
            .ok_or_else(|| CommandError::missing("to"))?;

        let from = session.resolve_target(&TargetParams::from_params(Some(from))?)?;
        let to = session.resolve_target(&TargetParams::from_params(Some(to))?)?;
        let steps = request.param_u32("steps", DEFAULT_DRAG_STEPS);

        debug!(
            from_x = from.x,
            from_y = from.y,
            to_x = to.x,
            to_y = to.y,
            steps,
            "performing drag"
        );
        session.drag(from, to, steps)?;
        Ok(json!({
            "from": { "x": from.x, "y": from.y },
            "to": { "x": to.x, "y": to.y },
            "steps": steps,
        }))
    })
}
