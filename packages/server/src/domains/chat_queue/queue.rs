//! In-memory matchmaking queue.
//!
//! One `ChatQueue` lives for the whole process and is shared by every request
//! handler. All state sits behind a single `std::sync::Mutex`; each public
//! operation takes the lock once, never awaits, and leaves the maps consistent
//! before releasing it. That makes heartbeat + eviction + pairing one critical
//! section, so two concurrent polls can't both see an empty opposite queue and
//! lose a pairing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::models::{DialogPair, QueueRole, QueueSettings, QueueUpdate};
use crate::common::{MemberId, OrganizationId};
use crate::kernel::BaseClock;

fn is_live(at: DateTime<Utc>, now: DateTime<Utc>, stale_after: Duration) -> bool {
    now - at < stale_after
}

/// Waiting lines of one organization, keyed by member with last heartbeat.
#[derive(Debug, Default)]
struct OrganizationQueue {
    students: HashMap<MemberId, DateTime<Utc>>,
    enrollees: HashMap<MemberId, DateTime<Utc>>,
}

impl OrganizationQueue {
    fn side(&self, role: QueueRole) -> &HashMap<MemberId, DateTime<Utc>> {
        match role {
            QueueRole::Student => &self.students,
            QueueRole::Enrollee => &self.enrollees,
        }
    }

    fn side_mut(&mut self, role: QueueRole) -> &mut HashMap<MemberId, DateTime<Utc>> {
        match role {
            QueueRole::Student => &mut self.students,
            QueueRole::Enrollee => &mut self.enrollees,
        }
    }

    fn remove_member(&mut self, member_id: MemberId) {
        self.students.remove(&member_id);
        self.enrollees.remove(&member_id);
    }

    fn is_empty(&self) -> bool {
        self.students.is_empty() && self.enrollees.is_empty()
    }

    /// Oldest heartbeat on `role`'s side; ties go to the smaller member id.
    fn oldest(&self, role: QueueRole) -> Option<MemberId> {
        self.side(role)
            .iter()
            .min_by(|(a_id, a_at), (b_id, b_at)| a_at.cmp(b_at).then_with(|| a_id.cmp(b_id)))
            .map(|(member_id, _)| *member_id)
    }
}

/// A pair handed to the counterpart on its next poll.
#[derive(Debug, Clone, Copy)]
struct Offer {
    pair: DialogPair,
    offered_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct QueueState {
    organizations: HashMap<OrganizationId, OrganizationQueue>,
    offers: HashMap<(OrganizationId, MemberId), Offer>,
}

impl QueueState {
    fn heartbeat(
        &mut self,
        member_id: MemberId,
        organization_id: OrganizationId,
        role: QueueRole,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> Option<DialogPair> {
        let queue = self.organizations.entry(organization_id).or_default();

        // A member on the other side would end up in both lines after the
        // insert below. Purge both entries first.
        if queue.side(role.opposite()).contains_key(&member_id) {
            debug!(
                member_id = %member_id,
                organization_id = %organization_id,
                "member switched queue side, purging both entries"
            );
            queue.remove_member(member_id);
        }

        queue.side_mut(role).insert(member_id, now);

        self.evict(now, stale_after);
        self.find_pair(member_id, organization_id, role)
    }

    fn find_pair(
        &self,
        member_id: MemberId,
        organization_id: OrganizationId,
        role: QueueRole,
    ) -> Option<DialogPair> {
        let counterpart = self.organizations.get(&organization_id)?.oldest(role.opposite())?;

        Some(match role {
            QueueRole::Student => DialogPair {
                organization_id,
                student_id: member_id,
                enrollee_id: counterpart,
            },
            QueueRole::Enrollee => DialogPair {
                organization_id,
                student_id: counterpart,
                enrollee_id: member_id,
            },
        })
    }

    fn evict(&mut self, now: DateTime<Utc>, stale_after: Duration) -> usize {
        let mut evicted = 0;

        for queue in self.organizations.values_mut() {
            let before = queue.students.len() + queue.enrollees.len();
            queue.students.retain(|_, at| is_live(*at, now, stale_after));
            queue.enrollees.retain(|_, at| is_live(*at, now, stale_after));
            evicted += before - (queue.students.len() + queue.enrollees.len());
        }
        self.organizations.retain(|_, queue| !queue.is_empty());
        self.offers
            .retain(|_, offer| is_live(offer.offered_at, now, stale_after));

        if evicted > 0 {
            debug!(evicted, "evicted stale queue entries");
        }
        evicted
    }

    fn remove_pair(&mut self, pair: &DialogPair) {
        let Some(queue) = self.organizations.get_mut(&pair.organization_id) else {
            return;
        };
        queue.students.remove(&pair.student_id);
        queue.enrollees.remove(&pair.enrollee_id);
        if queue.is_empty() {
            self.organizations.remove(&pair.organization_id);
        }
    }

    fn live_counts(
        &self,
        organization_id: OrganizationId,
        now: DateTime<Utc>,
        stale_after: Duration,
    ) -> (usize, usize) {
        let Some(queue) = self.organizations.get(&organization_id) else {
            return (0, 0);
        };
        let live = |side: &HashMap<MemberId, DateTime<Utc>>| {
            side.values()
                .filter(|at| is_live(**at, now, stale_after))
                .count()
        };
        (live(&queue.students), live(&queue.enrollees))
    }
}

/// Process-wide matchmaking queue.
pub struct ChatQueue {
    clock: Arc<dyn BaseClock>,
    settings: QueueSettings,
    state: Mutex<QueueState>,
}

impl ChatQueue {
    pub fn new(clock: Arc<dyn BaseClock>, settings: QueueSettings) -> Self {
        Self {
            clock,
            settings,
            state: Mutex::new(QueueState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // Critical sections never leave the maps half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Refresh the member's place on `role`'s side, sweep stale entries in all
    /// organizations, and propose a pair with the oldest live counterpart.
    ///
    /// Both entries stay queued; call [`ChatQueue::consume_pair`] once the
    /// dialog exists.
    pub fn heartbeat(
        &self,
        member_id: MemberId,
        organization_id: OrganizationId,
        role: QueueRole,
    ) -> Option<DialogPair> {
        let now = self.clock.now();
        self.lock()
            .heartbeat(member_id, organization_id, role, now, self.settings.stale_after)
    }

    /// Live `(students, enrollees)` counts; `(0, 0)` for unknown organizations.
    pub fn queue_lengths(&self, organization_id: OrganizationId) -> (usize, usize) {
        let now = self.clock.now();
        self.lock()
            .live_counts(organization_id, now, self.settings.stale_after)
    }

    /// Remove both parties of a pair from their queues. No-op when absent.
    pub fn consume_pair(&self, pair: &DialogPair) {
        self.lock().remove_pair(pair);
    }

    /// Remove the member from both sides of the organization's queue and
    /// drop any offer waiting for them there.
    pub fn leave_queue(&self, member_id: MemberId, organization_id: OrganizationId) {
        let mut state = self.lock();
        state.offers.remove(&(organization_id, member_id));
        if let Some(queue) = state.organizations.get_mut(&organization_id) {
            queue.remove_member(member_id);
            if queue.is_empty() {
                state.organizations.remove(&organization_id);
            }
        }
    }

    /// Run the eviction sweep on its own. Returns the number of entries dropped.
    pub fn evict_stale(&self) -> usize {
        let now = self.clock.now();
        self.lock().evict(now, self.settings.stale_after)
    }

    /// Poll used by the HTTP layer, in one critical section:
    ///
    /// 1. hand out an offer left for this member by a counterpart's poll;
    /// 2. otherwise heartbeat, and on a pair consume both entries and leave an
    ///    offer for the counterpart;
    /// 3. otherwise report live counts.
    pub fn claim(
        &self,
        member_id: MemberId,
        organization_id: OrganizationId,
        role: QueueRole,
    ) -> QueueUpdate {
        let now = self.clock.now();
        let stale_after = self.settings.stale_after;
        let mut state = self.lock();

        if let Some(offer) = state.offers.remove(&(organization_id, member_id)) {
            if is_live(offer.offered_at, now, stale_after) {
                debug!(
                    member_id = %member_id,
                    organization_id = %organization_id,
                    "delivering pending pair offer"
                );
                return QueueUpdate::Paired(offer.pair);
            }
        }

        if let Some(pair) = state.heartbeat(member_id, organization_id, role, now, stale_after) {
            state.remove_pair(&pair);
            let counterpart = pair.counterpart_of(member_id);
            state.offers.insert(
                (organization_id, counterpart),
                Offer {
                    pair,
                    offered_at: now,
                },
            );
            debug!(
                organization_id = %organization_id,
                student_id = %pair.student_id,
                enrollee_id = %pair.enrollee_id,
                "paired student with enrollee"
            );
            return QueueUpdate::Paired(pair);
        }

        let (students, enrollees) = state.live_counts(organization_id, now, stale_after);
        QueueUpdate::Waiting {
            students,
            enrollees,
        }
    }

    /// Hand `pair` back to `member_id`'s next `claim`, for when the dialog
    /// for a claimed pair could not be opened. Ignored if `member_id` is not
    /// a party to the pair.
    pub fn restore_offer(&self, member_id: MemberId, pair: DialogPair) {
        if !pair.involves(member_id) {
            return;
        }
        let now = self.clock.now();
        self.lock().offers.insert(
            (pair.organization_id, member_id),
            Offer {
                pair,
                offered_at: now,
            },
        );
        debug!(
            member_id = %member_id,
            organization_id = %pair.organization_id,
            "pair offer restored"
        );
    }

    #[cfg(test)]
    fn contains(&self, member_id: MemberId, organization_id: OrganizationId, role: QueueRole) -> bool {
        self.lock()
            .organizations
            .get(&organization_id)
            .is_some_and(|queue| queue.side(role).contains_key(&member_id))
    }

    #[cfg(test)]
    fn tracked_organizations(&self) -> usize {
        self.lock().organizations.len()
    }
}
