// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Announcement of the local participant.
//!
//! Publishers and subscribers created on the local node are added here; the
//! resulting topic list is what the transport republishes on the discovery
//! channel.

use crate::codec::{self, ParticipantRecord, TopicDescriptor};

/// The local node's own discovery announcement.
#[derive(Clone, Debug)]
pub struct Advertisement {
    identity: String,
    record: ParticipantRecord,
    version: u64,
}

impl Advertisement {
    pub fn new(
        identity: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            record: ParticipantRecord {
                name: name.into(),
                namespace: namespace.into(),
                ..ParticipantRecord::default()
            },
            version: 0,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn record(&self) -> &ParticipantRecord {
        &self.record
    }

    /// Bumped on every mutation of the advertised record.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn add_publisher<I, S>(&mut self, topic: &str, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.publishers.push(TopicDescriptor::new(topic, types));
        self.version += 1;
    }

    pub fn add_subscriber<I, S>(&mut self, topic: &str, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.subscribers.push(TopicDescriptor::new(topic, types));
        self.version += 1;
    }

    /// Remove the first publisher on `topic`.
    pub fn remove_publisher(&mut self, topic: &str) -> bool {
        let removed = remove_first(&mut self.record.publishers, topic);
        if removed {
            self.version += 1;
        }
        removed
    }

    /// Remove the first subscriber on `topic`.
    pub fn remove_subscriber(&mut self, topic: &str) -> bool {
        let removed = remove_first(&mut self.record.subscribers, topic);
        if removed {
            self.version += 1;
        }
        removed
    }

    /// Topic strings to publish: the discovery channel topic followed by the
    /// encoded record.
    pub fn topics(&self, discovery_topic: &str) -> Vec<String> {
        let mut topics = vec![discovery_topic.to_string()];
        topics.extend(codec::encode(&self.identity, &self.record));
        topics
    }
}

fn remove_first(entries: &mut Vec<TopicDescriptor>, topic: &str) -> bool {
    match entries.iter().position(|d| d.topic_name == topic) {
        Some(index) => {
            entries.remove(index);
            true
        }
        None => false,
    }
}
