// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thread-safe table of remote participants learned from discovery
//! announcements.

use crate::codec::{self, ParticipantRecord};
use crate::signal::ChangeSignal;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a single announcement did to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No identity segment; nothing was recorded.
    Dropped,
    /// Stored record already matched the announcement.
    Unchanged,
    /// Record created or replaced with different content.
    Changed,
}

/// Counters describing registry activity since creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub announcements: u64,
    pub dropped: u64,
    pub changes: u64,
    pub signal_failures: u64,
}

#[derive(Default)]
struct StatsCounters {
    announcements: AtomicU64,
    dropped: AtomicU64,
    changes: AtomicU64,
    signal_failures: AtomicU64,
}

#[derive(Default)]
struct RegistryState {
    version: u64,
    participants: BTreeMap<String, ParticipantRecord>,
}

/// Participant table fed by the discovery subscription.
///
/// Entries are keyed by participant identity and fully replaced by every
/// announcement carrying that identity. Entries are never evicted.
pub struct DiscoveryRegistry {
    state: RwLock<RegistryState>,
    signal: Arc<dyn ChangeSignal>,
    stats: StatsCounters,
}

impl DiscoveryRegistry {
    pub fn new(signal: Arc<dyn ChangeSignal>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            signal,
            stats: StatsCounters::default(),
        }
    }

    /// Transport callback entry point.
    ///
    /// `correlation` identifies the delivering subscription/publication and
    /// is only used for logging.
    pub fn on_publication<C, I, S>(&self, correlation: C, topics: I) -> Outcome
    where
        C: fmt::Debug,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        log::debug!("[discovery] on_publication({:?})", correlation);
        self.on_announcement(topics)
    }

    /// Decode one announcement and record it.
    ///
    /// The change signal fires once when the stored record for the identity
    /// changes; a first sighting counts when it differs from the default
    /// record. The signal is invoked after the table lock is released; a
    /// failure is logged and does not undo the update.
    pub fn on_announcement<I, S>(&self, topics: I) -> Outcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stats.announcements.fetch_add(1, Ordering::Relaxed);

        let Some((identity, record)) = codec::decode(topics).into_parts() else {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            log::debug!("[discovery] announcement without identity dropped");
            return Outcome::Dropped;
        };

        let changed = {
            let mut guard = self.state.write();
            let changed = match guard.participants.get(&identity) {
                Some(old) => *old != record,
                None => record != ParticipantRecord::default(),
            };
            guard.participants.insert(identity.clone(), record);
            if changed {
                guard.version += 1;
                self.stats.changes.fetch_add(1, Ordering::Relaxed);
            }
            changed
        };

        if !changed {
            return Outcome::Unchanged;
        }

        log::debug!("[discovery] participant {} changed", identity);
        if let Err(e) = self.signal.trigger() {
            self.stats.signal_failures.fetch_add(1, Ordering::Relaxed);
            log::error!("[discovery] failed to trigger graph guard condition: {}", e);
        }
        Outcome::Changed
    }

    /// Copy of every known record, ordered by identity.
    pub fn snapshot(&self) -> Vec<ParticipantRecord> {
        self.state.read().participants.values().cloned().collect()
    }

    /// Number of publishers across all participants advertising `topic_name`.
    pub fn count_matching_publishers(&self, topic_name: &str) -> usize {
        self.state
            .read()
            .participants
            .values()
            .map(|p| p.count_publishers(topic_name))
            .sum()
    }

    /// Number of subscribers across all participants advertising `topic_name`.
    pub fn count_matching_subscribers(&self, topic_name: &str) -> usize {
        self.state
            .read()
            .participants
            .values()
            .map(|p| p.count_subscribers(topic_name))
            .sum()
    }

    pub fn get(&self, identity: &str) -> Option<ParticipantRecord> {
        self.state.read().participants.get(identity).cloned()
    }

    pub fn identities(&self) -> Vec<String> {
        self.state.read().participants.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().participants.is_empty()
    }

    /// Incremented on every content change.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            announcements: self.stats.announcements.load(Ordering::Relaxed),
            dropped: self.stats.dropped.load(Ordering::Relaxed),
            changes: self.stats.changes.load(Ordering::Relaxed),
            signal_failures: self.stats.signal_failures.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for DiscoveryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.state.read();
        f.debug_struct("DiscoveryRegistry")
            .field("version", &guard.version)
            .field("participants", &guard.participants.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::signal::GraphGuard;
    use std::sync::Weak;

    fn registry() -> (DiscoveryRegistry, Arc<GraphGuard>) {
        let guard = Arc::new(GraphGuard::new());
        (DiscoveryRegistry::new(guard.clone()), guard)
    }

    struct FailingSignal;

    impl ChangeSignal for FailingSignal {
        fn trigger(&self) -> Result<()> {
            Err(Error::SignalFailed("rejected".into()))
        }
    }

    #[test]
    fn first_announcement_inserts_and_triggers() {
        let (registry, guard) = registry();
        let outcome = registry.on_announcement([
            "_did_=abc123",
            "_nsp_=/ns",
            "_name_=talker",
            "_pub_=chatter&types=std_msgs/String",
        ]);

        assert_eq!(outcome, Outcome::Changed);
        assert_eq!(guard.trigger_count(), 1);
        assert_eq!(registry.len(), 1);
        let record = registry.get("abc123").expect("record");
        assert_eq!(record.name, "talker");
        assert_eq!(registry.count_matching_publishers("chatter"), 1);
    }

    #[test]
    fn identical_reannouncement_does_not_trigger() {
        let (registry, guard) = registry();
        let topics = ["_did_=n1", "_name_=a"];

        assert_eq!(registry.on_announcement(topics), Outcome::Changed);
        assert_eq!(registry.on_announcement(topics), Outcome::Unchanged);
        assert_eq!(guard.trigger_count(), 1);
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn default_record_for_new_identity_is_unchanged() {
        // The implicit previous value is the default record.
        let (registry, guard) = registry();
        assert_eq!(registry.on_announcement(["_did_=bare"]), Outcome::Unchanged);
        assert_eq!(guard.trigger_count(), 0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("bare"), Some(ParticipantRecord::default()));
    }

    #[test]
    fn replacement_is_full_not_merged() {
        let (registry, guard) = registry();
        registry.on_announcement(["_did_=n", "_name_=a", "_pub_=t1&types=T"]);
        registry.on_announcement(["_did_=n", "_sub_=t2&types=T"]);

        let record = registry.get("n").expect("record");
        assert!(record.name.is_empty());
        assert!(record.publishers.is_empty());
        assert_eq!(record.subscribers.len(), 1);
        assert_eq!(guard.trigger_count(), 2);
    }

    #[test]
    fn missing_identity_leaves_table_untouched() {
        let (registry, guard) = registry();
        registry.on_announcement(["_did_=keep", "_name_=k"]);
        let before = registry.snapshot();

        assert_eq!(
            registry.on_announcement(["_name_=ghost", "_pub_=chatter&types=T"]),
            Outcome::Dropped
        );
        assert_eq!(registry.snapshot(), before);
        assert_eq!(guard.trigger_count(), 1);
        assert_eq!(registry.stats().dropped, 1);
    }

    #[test]
    fn empty_identity_is_dropped() {
        let (registry, guard) = registry();
        registry.on_announcement(["_did_=keep", "_pub_=chatter&types=T"]);
        let before = registry.snapshot();

        assert_eq!(
            registry.on_announcement(["_did_=", "_name_=ghost", "_pub_=chatter&types=T"]),
            Outcome::Dropped
        );
        assert_eq!(
            registry.on_announcement(["_did_=keep", "_name_=ghost", "_did_="]),
            Outcome::Dropped
        );

        assert_eq!(registry.snapshot(), before);
        assert_eq!(registry.identities(), vec!["keep"]);
        assert_eq!(registry.count_matching_publishers("chatter"), 1);
        assert_eq!(registry.stats().dropped, 2);
        assert_eq!(guard.trigger_count(), 1);
    }

    #[test]
    fn empty_identity_alone_leaves_registry_empty() {
        let (registry, guard) = registry();
        assert_eq!(registry.on_announcement(["_did_="]), Outcome::Dropped);
        assert!(registry.snapshot().is_empty());
        assert_eq!(registry.stats().dropped, 1);
        assert_eq!(guard.trigger_count(), 0);
    }

    #[test]
    fn changes_counter_matches_version() {
        let (registry, _guard) = registry();
        registry.on_announcement(["_did_=a", "_name_=x"]);
        registry.on_announcement(["_did_=a", "_name_=y"]);
        registry.on_announcement(["_did_=a", "_name_=y"]);
        assert_eq!(registry.stats().changes, registry.version());
        assert_eq!(registry.version(), 2);
    }

    #[test]
    fn counts_ignore_types_and_sum_across_participants() {
        let (registry, _guard) = registry();
        registry.on_announcement(["_did_=a", "_pub_=chatter&types=A", "_pub_=chatter&types=B"]);
        registry.on_announcement(["_did_=b", "_pub_=chatter", "_sub_=chatter&types=A"]);

        assert_eq!(registry.count_matching_publishers("chatter"), 3);
        assert_eq!(registry.count_matching_subscribers("chatter"), 1);
        assert_eq!(registry.count_matching_publishers("missing"), 0);
        assert_eq!(registry.count_matching_subscribers("missing"), 0);
    }

    #[test]
    fn empty_registry_reads() {
        let (registry, _guard) = registry();
        assert!(registry.is_empty());
        assert!(registry.snapshot().is_empty());
        assert_eq!(registry.count_matching_publishers("x"), 0);
    }

    #[test]
    fn signal_failure_is_counted_and_update_kept() {
        let registry = DiscoveryRegistry::new(Arc::new(FailingSignal));
        assert_eq!(
            registry.on_announcement(["_did_=n", "_name_=x"]),
            Outcome::Changed
        );
        assert_eq!(registry.get("n").map(|r| r.name), Some("x".to_string()));
        assert_eq!(registry.stats().signal_failures, 1);
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn released_weak_signal_is_non_fatal() {
        let guard = Arc::new(GraphGuard::new());
        let weak: Weak<GraphGuard> = Arc::downgrade(&guard);
        let registry = DiscoveryRegistry::new(Arc::new(weak));
        drop(guard);

        registry.on_announcement(["_did_=n", "_name_=x"]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stats().signal_failures, 1);
    }

    #[test]
    fn snapshot_is_ordered_by_identity() {
        let (registry, _guard) = registry();
        registry.on_announcement(["_did_=b", "_name_=second"]);
        registry.on_announcement(["_did_=a", "_name_=first"]);

        let names: Vec<_> = registry.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(registry.identities(), vec!["a", "b"]);
    }

    #[test]
    fn stats_track_activity() {
        let (registry, _guard) = registry();
        registry.on_announcement(["_did_=a", "_name_=x"]);
        registry.on_announcement(["_did_=a", "_name_=x"]);
        registry.on_announcement(["nothing"]);

        assert_eq!(
            registry.stats(),
            RegistryStats {
                announcements: 3,
                dropped: 1,
                changes: 1,
                signal_failures: 0,
            }
        );
    }
}
