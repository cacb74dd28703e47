//! Element discovery and inspection commands.

use serde_json::json;
use tracing::debug;

use uidriver_core::Selector;
use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

use crate::dispatch::run_session_command;
use crate::error::CommandError;
use crate::session::SessionRegistry;

/// Translate the wire strategy, run the device lookup, and cache the hit.
/// Validation failures (unknown strategy, missing params) surface before
/// the device is touched.
pub fn handle_find_element(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_session_command(registry, &request, |session, request| {
        let strategy = request
            .param_str("strategy")
            .ok_or_else(|| CommandError::missing("strategy"))?;
        let value = request
            .param_str("selector")
            .ok_or_else(|| CommandError::missing("selector"))?;

        let selector = Selector::translate(strategy, value)?;
        debug!(%selector, "finding element");
        let handle = session.find_element(selector)?;

        Ok(json!({
            "element": handle.id,
            "bounds": handle.bounds,
        }))
    })
}

/// Re-read a cached element's rectangle, reported as the on-wire
/// x/y/width/height shape.
pub fn handle_element_rect(registry: &SessionRegistry, request: RpcRequest) -> RpcResponse {
    run_session_command(registry, &request, |session, request| {
        let element = request
            .param_str("element")
            .or_else(|| request.param_str("elementId"))
            .ok_or_else(|| CommandError::missing("element"))?;

        let rect = session.element_rect(element)?;
        Ok(json!({
            "x": rect.left,
            "y": rect.top,
            "width": rect.width(),
            "height": rect.height(),
        }))
    })
}
