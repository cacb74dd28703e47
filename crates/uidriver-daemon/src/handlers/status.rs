//! Liveness and diagnostics commands.

use std::time::Instant;

use serde_json::json;

use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

use crate::metrics::DaemonMetrics;
use crate::session::SessionRegistry;

pub fn handle_ping(request: RpcRequest) -> RpcResponse {
    RpcResponse::success(request.id, json!({ "pong": true }))
}

pub fn handle_status(
    registry: &SessionRegistry,
    metrics: &DaemonMetrics,
    started_at: Instant,
    request: RpcRequest,
) -> RpcResponse {
    RpcResponse::success(
        request.id,
        json!({
            "uptime_secs": started_at.elapsed().as_secs(),
            "sessions": registry.count(),
            "requests": metrics.requests(),
            "errors": metrics.errors(),
        }),
    )
}
