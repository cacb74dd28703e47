#![deny(clippy::all)]

mod config;
mod device;
mod dispatch;
mod error;
mod handlers;
mod lock_helpers;
mod metrics;
mod resolve;
mod server;
mod session;
mod transport;

pub mod test_support;

pub use config::DaemonConfig;
pub use device::BackendFactory;
pub use device::DeviceError;
pub use device::NoopBackend;
pub use device::UiBackend;
pub use error::CommandError;
pub use error::DaemonError;
pub use lock_helpers::LOCK_TIMEOUT;
pub use lock_helpers::MAX_BACKOFF;
pub use lock_helpers::acquire_lock;
pub use metrics::DaemonMetrics;
pub use resolve::TargetParams;
pub use resolve::resolve_point;
pub use server::DaemonServer;
pub use server::start_daemon;
pub use session::DEFAULT_MAX_SESSIONS;
pub use session::Session;
pub use session::SessionId;
pub use session::SessionInfo;
pub use session::SessionRegistry;
pub use session::generate_session_id;
pub use transport::TransportConnection;
pub use transport::TransportError;
pub use transport::TransportListener;

pub type Result<T> = std::result::Result<T, CommandError>;
