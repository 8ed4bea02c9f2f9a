// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Randomized checks of the discovery topic codec and change detection.

use dps_discovery::{
    decode, encode, DiscoveryRegistry, GraphGuard, ParticipantRecord, TopicDescriptor,
};
use std::sync::Arc;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789/_";

fn token(rng: &mut fastrand::Rng, max_len: usize) -> String {
    let len = rng.usize(0..=max_len);
    (0..len)
        .map(|_| ALPHABET[rng.usize(..ALPHABET.len())] as char)
        .collect()
}

fn descriptor(rng: &mut fastrand::Rng) -> TopicDescriptor {
    let topic = format!("t{}", token(rng, 8));
    let types: Vec<String> = (0..rng.usize(0..4)).map(|_| token(rng, 6)).collect();
    TopicDescriptor::new(topic, types)
}

fn record(rng: &mut fastrand::Rng) -> ParticipantRecord {
    ParticipantRecord {
        name: token(rng, 10),
        namespace: format!("/{}", token(rng, 6)),
        publishers: (0..rng.usize(0..4)).map(|_| descriptor(rng)).collect(),
        subscribers: (0..rng.usize(0..4)).map(|_| descriptor(rng)).collect(),
    }
}

#[test]
fn descriptors_round_trip() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..500 {
        let desc = descriptor(&mut rng);
        assert_eq!(TopicDescriptor::parse(&desc.encode()), desc);
    }
}

#[test]
fn records_round_trip_through_announcements() {
    let mut rng = fastrand::Rng::with_seed(42);
    for i in 0..200 {
        let original = record(&mut rng);
        let identity = format!("id{i}");
        let mut topics = encode(&identity, &original);
        // Unrelated strings anywhere in the announcement are ignored.
        topics.insert(rng.usize(..=topics.len()), "$ROS".to_string());

        let decoded = decode(&topics).into_parts().expect("identity");
        assert_eq!(decoded, (identity, original));
    }
}

#[test]
fn signal_fires_exactly_when_records_differ() {
    let mut rng = fastrand::Rng::with_seed(7);
    let guard = Arc::new(GraphGuard::new());
    let registry = DiscoveryRegistry::new(guard.clone());

    let mut current = ParticipantRecord::default();
    let mut expected_triggers = 0u64;
    for _ in 0..300 {
        // Half the time re-send the current record unchanged.
        let next = if rng.bool() {
            current.clone()
        } else {
            record(&mut rng)
        };
        if next != current {
            expected_triggers += 1;
        }
        registry.on_announcement(encode("same", &next));
        current = next;
        assert_eq!(guard.trigger_count(), expected_triggers);
    }
    assert_eq!(registry.len(), 1);
}
