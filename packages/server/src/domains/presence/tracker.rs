use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::common::MemberId;
use crate::kernel::BaseClock;

/// Members seen within this window count as online.
pub const DEFAULT_PRESENCE_WINDOW_SECS: i64 = 5 * 60;

/// Process-wide last-heartbeat registry.
pub struct PresenceTracker {
    clock: Arc<dyn BaseClock>,
    window: Duration,
    last_seen: Mutex<HashMap<MemberId, DateTime<Utc>>>,
}

impl PresenceTracker {
    pub fn new(clock: Arc<dyn BaseClock>, window: Duration) -> Self {
        Self {
            clock,
            window,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<MemberId, DateTime<Utc>>> {
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that the member is here now.
    pub fn mark_online(&self, member_id: MemberId) {
        let now = self.clock.now();
        self.lock().insert(member_id, now);
    }

    /// Snapshot of members seen within the window.
    pub fn list_online(&self) -> HashSet<MemberId> {
        let now = self.clock.now();
        self.lock()
            .iter()
            .filter(|(_, seen)| now - **seen < self.window)
            .map(|(member_id, _)| *member_id)
            .collect()
    }

    /// Drop records that fell out of the window. Returns how many were dropped.
    pub fn forget_inactive(&self) -> usize {
        let now = self.clock.now();
        let mut last_seen = self.lock();
        let before = last_seen.len();
        last_seen.retain(|_, seen| now - *seen < self.window);
        before - last_seen.len()
    }
}
