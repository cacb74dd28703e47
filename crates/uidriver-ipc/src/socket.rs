use std::path::PathBuf;

/// Path of the daemon's Unix socket.
///
/// `UIDRIVER_SOCKET` overrides; otherwise the socket lives in
/// `XDG_RUNTIME_DIR`, falling back to the system temp directory.
pub fn socket_path() -> PathBuf {
    if let Ok(path) = std::env::var("UIDRIVER_SOCKET") {
        return PathBuf::from(path);
    }
    let dir = std::env::var("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    dir.join("uidriver.sock")
}
