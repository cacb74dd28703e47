//! Narrow transport seam between the socket and the dispatch layer.
//!
//! Everything above these traits is transport-agnostic; the daemon's
//! correctness is testable by calling `handle_request` directly, and the
//! Unix-socket implementation here is a thin line-delimited JSON shell.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use uidriver_ipc::RpcRequest;
use uidriver_ipc::RpcResponse;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection closed")]
    ConnectionClosed,
    #[error("read timed out")]
    Timeout,
    #[error("request exceeds size limit ({max_bytes} bytes)")]
    SizeLimit { max_bytes: usize },
    #[error("parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait TransportConnection {
    fn read_request(&mut self) -> Result<RpcRequest, TransportError>;
    fn write_response(&mut self, response: &RpcResponse) -> Result<(), TransportError>;
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError>;
    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError>;
}

pub trait TransportListener {
    type Conn: TransportConnection;

    fn accept(&self) -> Result<Self::Conn, TransportError>;
}

pub struct UnixSocketListener {
    listener: UnixListener,
    max_request_bytes: usize,
}

impl UnixSocketListener {
    pub fn bind(path: &Path, max_request_bytes: usize) -> std::io::Result<Self> {
        Ok(Self {
            listener: UnixListener::bind(path)?,
            max_request_bytes,
        })
    }

    pub fn set_nonblocking(&self, nonblocking: bool) -> std::io::Result<()> {
        self.listener.set_nonblocking(nonblocking)
    }
}

impl TransportListener for UnixSocketListener {
    type Conn = UnixSocketConnection;

    fn accept(&self) -> Result<Self::Conn, TransportError> {
        match self.listener.accept() {
            Ok((stream, _)) => Ok(UnixSocketConnection::new(stream, self.max_request_bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Io(e)),
        }
    }
}

pub struct UnixSocketConnection {
    stream: UnixStream,
    reader: BufReader<UnixStream>,
    max_request_bytes: usize,
}

impl UnixSocketConnection {
    pub fn new(stream: UnixStream, max_request_bytes: usize) -> std::io::Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            stream,
            reader,
            max_request_bytes,
        })
    }
}

impl TransportConnection for UnixSocketConnection {
    fn read_request(&mut self) -> Result<RpcRequest, TransportError> {
        let mut line = String::new();
        // cap the read so a runaway client cannot exhaust memory
        let mut limited = (&mut self.reader).take(self.max_request_bytes as u64 + 1);
        match limited.read_line(&mut line) {
            Ok(0) => Err(TransportError::ConnectionClosed),
            Ok(_) => {
                if line.len() > self.max_request_bytes {
                    return Err(TransportError::SizeLimit {
                        max_bytes: self.max_request_bytes,
                    });
                }
                serde_json::from_str(&line).map_err(|e| TransportError::Parse(e.to_string()))
            }
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Err(TransportError::Timeout)
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Err(TransportError::Parse(e.to_string()))
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn write_response(&mut self, response: &RpcResponse) -> Result<(), TransportError> {
        let text =
            serde_json::to_string(response).map_err(|e| TransportError::Parse(e.to_string()))?;
        let write = writeln!(self.stream, "{}", text).and_then(|_| self.stream.flush());
        write.map_err(|e| match e.kind() {
            std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset => {
                TransportError::ConnectionClosed
            }
            _ => TransportError::Io(e),
        })
    }

    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<(), TransportError> {
        self.stream.set_write_timeout(timeout)?;
        Ok(())
    }
}
