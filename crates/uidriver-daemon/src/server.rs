use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::mpsc;
use std::sync::mpsc::SyncSender;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use signal_hook::consts::SIGINT;
use signal_hook::consts::SIGTERM;
use signal_hook::iterator::Signals;
use tracing::error;
use tracing::info;
use tracing::warn;

use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;
use uidriver_ipc::socket_path;

use crate::config::DaemonConfig;
use crate::device::BackendFactory;
use crate::error::DaemonError;
use crate::handlers;
use crate::metrics::DaemonMetrics;
use crate::session::SessionRegistry;
use crate::transport::TransportConnection;
use crate::transport::TransportError;
use crate::transport::TransportListener;
use crate::transport::UnixSocketConnection;
use crate::transport::UnixSocketListener;

const CHANNEL_CAPACITY: usize = 64;
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DaemonServer {
    registry: Arc<SessionRegistry>,
    metrics: Arc<DaemonMetrics>,
    active_connections: Arc<AtomicUsize>,
    started_at: Instant,
    idle_timeout: Duration,
}

impl DaemonServer {
    pub fn new(config: &DaemonConfig, backends: BackendFactory) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::with_max_sessions(
                config.max_sessions,
                backends,
            )),
            metrics: Arc::new(DaemonMetrics::new()),
            active_connections: Arc::new(AtomicUsize::new(0)),
            started_at: Instant::now(),
            idle_timeout: config.idle_timeout,
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn metrics(&self) -> &DaemonMetrics {
        &self.metrics
    }

    /// Route one request to its handler. Every outcome, including an
    /// unknown method, is a structured response.
    pub fn handle_request(&self, request: RpcRequest) -> RpcResponse {
        self.metrics.record_request();
        let response = self.route(request);
        if !response.is_success() {
            self.metrics.record_error();
        }
        response
    }

    fn route(&self, request: RpcRequest) -> RpcResponse {
        match request.method.as_str() {
            "ping" => handlers::status::handle_ping(request),
            "status" => handlers::status::handle_status(
                &self.registry,
                &self.metrics,
                self.started_at,
                request,
            ),

            // Session lifecycle
            "new_session" => handlers::session::handle_new_session(&self.registry, request),
            "delete_session" => handlers::session::handle_delete_session(&self.registry, request),
            "activate_session" => {
                handlers::session::handle_activate_session(&self.registry, request)
            }
            "sessions" => handlers::session::handle_sessions(&self.registry, request),

            // Pointer gestures
            "tap" => handlers::touch::handle_tap(&self.registry, request),
            "double_tap" => handlers::touch::handle_double_tap(&self.registry, request),
            "long_tap" => handlers::touch::handle_long_tap(&self.registry, request),
            "touch_down" => handlers::touch::handle_touch_down(&self.registry, request),
            "touch_up" => handlers::touch::handle_touch_up(&self.registry, request),
            "touch_move" => handlers::touch::handle_touch_move(&self.registry, request),
            "drag" => handlers::touch::handle_drag(&self.registry, request),

            // Elements
            "find_element" => handlers::elements::handle_find_element(&self.registry, request),
            "element_rect" => handlers::elements::handle_element_rect(&self.registry, request),

            _ => RpcResponse::error(
                request.id,
                -32601,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_client(&self, mut conn: impl TransportConnection) {
        if let Err(e) = conn.set_read_timeout(Some(self.idle_timeout)) {
            warn!(error = %e, "failed to set read timeout");
            return;
        }
        if let Err(e) = conn.set_write_timeout(Some(WRITE_TIMEOUT)) {
            warn!(error = %e, "failed to set write timeout");
            return;
        }

        loop {
            let request = match conn.read_request() {
                Ok(request) => request,
                Err(TransportError::ConnectionClosed) | Err(TransportError::Timeout) => break,
                Err(TransportError::SizeLimit { max_bytes }) => {
                    self.metrics.record_error();
                    let response = RpcResponse::error(
                        0,
                        -32700,
                        &format!("Parse error: request exceeds {} bytes", max_bytes),
                    );
                    let _ = conn.write_response(&response);
                    break;
                }
                Err(TransportError::Parse(msg)) => {
                    self.metrics.record_error();
                    let response = RpcResponse::error(0, -32700, &format!("Parse error: {}", msg));
                    let _ = conn.write_response(&response);
                    continue;
                }
                Err(TransportError::Io(e)) => {
                    warn!(error = %e, "client connection error");
                    break;
                }
            };

            let response = self.handle_request(request);

            if let Err(e) = conn.write_response(&response) {
                match e {
                    TransportError::ConnectionClosed => {}
                    _ => warn!(error = %e, "client write error"),
                }
                break;
            }
        }
    }
}

struct ThreadPool {
    workers: Vec<thread::JoinHandle<()>>,
    sender: SyncSender<UnixSocketConnection>,
}

impl ThreadPool {
    fn new(
        size: usize,
        server: Arc<DaemonServer>,
        shutdown: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel::<UnixSocketConnection>(CHANNEL_CAPACITY);
        let receiver = Arc::new(std::sync::Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = Arc::clone(&receiver);
            let server = Arc::clone(&server);
            let shutdown = Arc::clone(&shutdown);

            let handle = thread::Builder::new()
                .name(format!("worker-{}", id))
                .spawn(move || {
                    loop {
                        if shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        let conn = {
                            let lock = match receiver.lock() {
                                Ok(lock) => lock,
                                Err(_) => break,
                            };
                            match lock.recv_timeout(Duration::from_millis(100)) {
                                Ok(conn) => conn,
                                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                            }
                        };

                        server.active_connections.fetch_add(1, Ordering::Relaxed);
                        server.handle_client(conn);
                        server.active_connections.fetch_sub(1, Ordering::Relaxed);
                    }
                })?;
            workers.push(handle);
        }

        Ok(ThreadPool { workers, sender })
    }

    fn execute(&self, conn: UnixSocketConnection) -> Result<(), UnixSocketConnection> {
        self.sender.try_send(conn).map_err(|e| match e {
            mpsc::TrySendError::Full(conn) | mpsc::TrySendError::Disconnected(conn) => conn,
        })
    }

    fn shutdown(self) {
        drop(self.sender);
        for worker in self.workers {
            let _ = worker.join();
        }
    }
}

/// Run the daemon until SIGINT/SIGTERM: single-instance lock, Unix socket
/// listener, fixed worker pool, graceful drain on shutdown.
pub fn start_daemon(config: DaemonConfig, backends: BackendFactory) -> Result<(), DaemonError> {
    let socket_path = socket_path();
    let lock_path = socket_path.with_extension("lock");

    let mut lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| DaemonError::LockFailed(format!("failed to open lock file: {}", e)))?;

    let fd = lock_file.as_raw_fd();
    if unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) } != 0 {
        return Err(DaemonError::AlreadyRunning);
    }

    lock_file
        .set_len(0)
        .map_err(|e| DaemonError::LockFailed(format!("failed to truncate lock file: {}", e)))?;
    writeln!(lock_file, "{}", std::process::id())
        .map_err(|e| DaemonError::LockFailed(format!("failed to write PID: {}", e)))?;

    if socket_path.exists() {
        std::fs::remove_file(&socket_path).map_err(|e| {
            DaemonError::SocketBind(format!("failed to remove stale socket: {}", e))
        })?;
    }

    let listener = UnixSocketListener::bind(&socket_path, config.max_request_bytes)
        .map_err(|e| DaemonError::SocketBind(format!("failed to bind socket: {}", e)))?;
    listener
        .set_nonblocking(true)
        .map_err(|e| DaemonError::SocketBind(format!("failed to set non-blocking: {}", e)))?;

    info!(socket = %socket_path.display(), pid = std::process::id(), "uidriver daemon started");

    let shutdown = Arc::new(AtomicBool::new(false));
    let server = Arc::new(DaemonServer::new(&config, backends));

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
    let shutdown_signal = Arc::clone(&shutdown);
    thread::Builder::new()
        .name("signal-handler".to_string())
        .spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!(signal = sig, "initiating graceful shutdown");
                shutdown_signal.store(true, Ordering::SeqCst);
            }
        })
        .map_err(|e| DaemonError::SignalSetup(format!("failed to spawn signal handler: {}", e)))?;

    let pool = ThreadPool::new(
        config.max_connections,
        Arc::clone(&server),
        Arc::clone(&shutdown),
    )
    .map_err(|e| DaemonError::ThreadPool(e.to_string()))?;

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok(conn) => {
                if pool.execute(conn).is_err() {
                    warn!("worker queue full, dropping connection");
                }
            }
            Err(TransportError::Timeout) => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => {
                if !shutdown.load(Ordering::Relaxed) {
                    error!(error = %e, "error accepting connection");
                }
            }
        }
    }

    info!("shutting down daemon");
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.active_connections.load(Ordering::Relaxed) > 0 {
        if Instant::now() > deadline {
            warn!("shutdown timeout, forcing close");
            break;
        }
        thread::sleep(Duration::from_millis(50));
    }

    pool.shutdown();

    if socket_path.exists() {
        let _ = std::fs::remove_file(&socket_path);
    }
    if lock_path.exists() {
        let _ = std::fs::remove_file(&lock_path);
    }

    info!("daemon shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::DeviceState;
    use crate::test_support::scripted_factory;
    use serde_json::json;

    fn server() -> DaemonServer {
        let state = Arc::new(DeviceState::default());
        DaemonServer::new(&DaemonConfig::from_env(), scripted_factory(state))
    }

    fn request(method: &str, params: serde_json::Value) -> RpcRequest {
        serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        }))
        .unwrap()
    }

    #[test]
    fn test_ping() {
        let server = server();
        let resp = server.handle_request(request("ping", json!({})));
        assert_eq!(resp.result().unwrap()["pong"], true);
    }

    #[test]
    fn test_unknown_method() {
        let server = server();
        let resp = server.handle_request(request("teleport", json!({})));
        assert_eq!(resp.error_code(), Some(-32601));
        assert!(resp.error_message().unwrap().contains("teleport"));
    }

    #[test]
    fn test_metrics_count_requests_and_errors() {
        let server = server();
        server.handle_request(request("ping", json!({})));
        server.handle_request(request("teleport", json!({})));
        assert_eq!(server.metrics().requests(), 2);
        assert_eq!(server.metrics().errors(), 1);
    }
}
