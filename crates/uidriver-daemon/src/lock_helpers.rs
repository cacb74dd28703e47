use std::sync::Mutex;
use std::sync::MutexGuard;
use std::thread;
use std::time::Duration;
use std::time::Instant;

pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);
pub const MAX_BACKOFF: Duration = Duration::from_millis(50);

const INITIAL_BACKOFF: Duration = Duration::from_micros(100);

/// Try-lock loop with exponential backoff, so one session's slow device
/// call cannot wedge a caller forever. Returns `None` when the lock stays
/// held past `timeout`.
pub fn acquire_lock<T>(lock: &Mutex<T>, timeout: Duration) -> Option<MutexGuard<'_, T>> {
    let start = Instant::now();
    let mut backoff = INITIAL_BACKOFF;

    while start.elapsed() < timeout {
        if let Ok(guard) = lock.try_lock() {
            return Some(guard);
        }
        thread::sleep(backoff);
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
    None
}
