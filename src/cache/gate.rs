//! Reader-Preferring Gate
//!
//! A reader/writer lock where the first reader in takes the write permit on
//! behalf of every reader and the last reader out gives it back.
//!
//! Any number of readers proceed together. A writer waits until the reader
//! count drops to zero, so a steady stream of overlapping readers can starve
//! writers indefinitely. Would-be readers queue behind a first reader that is
//! itself waiting on an active writer.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::{
    AcquireError, Mutex as AsyncMutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Semaphore,
    SemaphorePermit,
};

// == Reader-Preferring Lock ==
/// Async reader/writer lock with reader preference.
///
/// The permit decides who gets in. The value itself sits in a `RwLock`
/// that is never contended, since readers and a writer never hold the
/// permit at the same time.
///
/// Guards release on drop, so a cancelled task never leaves the gate held.
pub struct ReaderPreferringLock<T> {
    /// Number of readers currently inside
    readers: Mutex<usize>,
    /// Serializes arriving readers while a first reader waits for the permit
    turnstile: AsyncMutex<()>,
    /// Single exclusive permit shared by "all readers" or one writer
    write_lock: Semaphore,
    data: RwLock<T>,
}

impl<T> ReaderPreferringLock<T> {
    pub fn new(data: T) -> Self {
        Self {
            readers: Mutex::new(0),
            turnstile: AsyncMutex::new(()),
            write_lock: Semaphore::new(1),
            data: RwLock::new(data),
        }
    }

    fn reader_slot(&self) -> MutexGuard<'_, usize> {
        self.readers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of readers currently holding the gate.
    pub fn reader_count(&self) -> usize {
        *self.reader_slot()
    }

    // == Read ==
    /// Enters the gate in shared mode.
    pub async fn read(&self) -> Result<ReadGuard<'_, T>, AcquireError> {
        let membership = self.join_readers().await?;
        let inner = self.data.read().await;

        Ok(ReadGuard {
            inner,
            _membership: membership,
        })
    }

    async fn join_readers(&self) -> Result<ReaderMembership<'_, T>, AcquireError> {
        let _turn = self.turnstile.lock().await;

        let joined = {
            let mut readers = self.reader_slot();
            if *readers > 0 {
                *readers += 1;
                true
            } else {
                false
            }
        };

        if !joined {
            // First reader: claim the permit for the whole reader group. It is
            // returned by whichever reader leaves last, not necessarily us.
            self.write_lock.acquire().await?.forget();
            *self.reader_slot() += 1;
        }

        Ok(ReaderMembership { lock: self })
    }

    // == Write ==
    /// Enters the gate in exclusive mode.
    pub async fn write(&self) -> Result<WriteGuard<'_, T>, AcquireError> {
        let permit = self.write_lock.acquire().await?;
        let inner = self.data.write().await;

        Ok(WriteGuard {
            inner,
            _permit: permit,
        })
    }

    /// Closes the gate. Writers, and readers that would need the permit,
    /// fail from now on.
    pub fn close(&self) {
        self.write_lock.close();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReaderPreferringLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderPreferringLock")
            .field("readers", &self.reader_count())
            .field("write_permits", &self.write_lock.available_permits())
            .finish_non_exhaustive()
    }
}

// == Guards ==
/// One reader's share of the group-held permit.
struct ReaderMembership<'a, T> {
    lock: &'a ReaderPreferringLock<T>,
}

impl<T> Drop for ReaderMembership<'_, T> {
    fn drop(&mut self) {
        let mut readers = self.lock.reader_slot();
        *readers -= 1;
        if *readers == 0 {
            self.lock.write_lock.add_permits(1);
        }
    }
}

/// Shared access to the gated value.
pub struct ReadGuard<'a, T> {
    // Field order matters: the value is released before the membership
    inner: RwLockReadGuard<'a, T>,
    _membership: ReaderMembership<'a, T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Exclusive access to the gated value.
pub struct WriteGuard<'a, T> {
    // Field order matters: the value is released before the permit
    inner: RwLockWriteGuard<'a, T>,
    _permit: SemaphorePermit<'a>,
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
