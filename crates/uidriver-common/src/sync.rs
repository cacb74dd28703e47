//! Lock acquisition that survives poisoning.
//!
//! A panic while holding a lock poisons it; the data behind the lock is
//! still structurally valid, so we recover the guard and log rather than
//! propagate the poison to every later caller.

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use tracing::warn;

pub fn rwlock_read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned rwlock (read)");
        poisoned.into_inner()
    })
}

pub fn rwlock_write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned rwlock (write)");
        poisoned.into_inner()
    })
}

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        warn!("recovering from poisoned mutex");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_mutex_recover_after_panic() {
        let data = Arc::new(Mutex::new(7u32));
        let poisoner = Arc::clone(&data);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the mutex");
        })
        .join();

        assert!(data.lock().is_err());
        assert_eq!(*mutex_lock_or_recover(&data), 7);
    }

    #[test]
    fn test_rwlock_recover_after_panic() {
        let data = Arc::new(RwLock::new(vec![1, 2, 3]));
        let poisoner = Arc::clone(&data);
        let _ = thread::spawn(move || {
            let _guard = poisoner.write().unwrap();
            panic!("poison the rwlock");
        })
        .join();

        assert_eq!(rwlock_read_or_recover(&data).len(), 3);
        rwlock_write_or_recover(&data).push(4);
        assert_eq!(rwlock_read_or_recover(&data).len(), 4);
    }

    #[test]
    fn test_unpoisoned_locks_pass_through() {
        let m = Mutex::new(1u8);
        let rw = RwLock::new(2u8);
        assert_eq!(*mutex_lock_or_recover(&m), 1);
        assert_eq!(*rwlock_read_or_recover(&rw), 2);
    }
}
