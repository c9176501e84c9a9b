//! Per-user mutation locks
//!
//! Every mutating closet operation is a read-modify-write against the
//! repository record, so two concurrent mutations for the same user must
//! not interleave. Locks are keyed by user and created lazily; unrelated
//! users never contend. The registry itself is guarded by a std mutex,
//! held only long enough to clone the Arc — never across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct UserLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (creating if needed) the mutation lock for a user.
    ///
    /// Lock entries are never removed; the registry grows with the number
    /// of distinct users seen by this process.
    pub fn lock_for(&self, user: &str) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().expect("user lock registry poisoned");
        map.entry(user.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
