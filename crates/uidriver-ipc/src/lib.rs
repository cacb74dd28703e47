#![deny(clippy::all)]

mod client;
pub mod error_codes;
mod socket;
mod types;

pub use client::ClientError;
pub use client::DaemonClient;
pub use socket::socket_path;
pub use types::RpcRequest;
pub use types::RpcResponse;
pub use types::RpcServerError;

pub type Result<T> = std::result::Result<T, ClientError>;
