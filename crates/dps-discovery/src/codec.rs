// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery topic codec.
//!
//! A participant announces itself by publishing on the discovery channel with
//! a flat set of topic strings. Each string carries one piece of the node
//! description behind a fixed marker:
//!
//! | Marker    | Meaning             | Remainder                         |
//! |-----------|---------------------|-----------------------------------|
//! | `_did_=`  | participant id      | opaque                            |
//! | `_nsp_=`  | namespace           | opaque                            |
//! | `_name_=` | node name           | opaque                            |
//! | `_pub_=`  | published topic     | `<topic>[&types=<t1>,<t2>,...]`   |
//! | `_sub_=`  | subscribed topic    | `<topic>[&types=<t1>,<t2>,...]`   |
//!
//! Strings without a marker are ignored, which lets the discovery channel
//! topic itself travel in the same publication.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const IDENTITY_MARKER: &str = "_did_=";
pub const NAMESPACE_MARKER: &str = "_nsp_=";
pub const NAME_MARKER: &str = "_name_=";
pub const PUBLISHER_MARKER: &str = "_pub_=";
pub const SUBSCRIBER_MARKER: &str = "_sub_=";
pub const TYPES_MARKER: &str = "&types=";
pub const TYPES_SEPARATOR: char = ',';

pub const DEFAULT_NAMESPACE: &str = "/";

/// One published or subscribed interface of a participant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TopicDescriptor {
    pub topic_name: String,
    pub type_names: Vec<String>,
}

impl TopicDescriptor {
    pub fn new<T, I, S>(topic_name: T, type_names: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topic_name: topic_name.into(),
            type_names: type_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the remainder that follows a publisher/subscriber marker.
    ///
    /// Every comma-separated segment is kept, empty ones included, so
    /// `"chatter&types=A,"` yields `["A", ""]`. Without `&types=` the whole
    /// remainder is the topic name and the type list is empty.
    pub fn parse(remainder: &str) -> Self {
        match remainder.split_once(TYPES_MARKER) {
            Some((topic, types)) => Self {
                topic_name: topic.to_string(),
                type_names: types.split(TYPES_SEPARATOR).map(String::from).collect(),
            },
            None => Self {
                topic_name: remainder.to_string(),
                type_names: Vec::new(),
            },
        }
    }

    /// Inverse of [`TopicDescriptor::parse`].
    pub fn encode(&self) -> String {
        if self.type_names.is_empty() {
            return self.topic_name.clone();
        }
        let mut out = String::with_capacity(
            self.topic_name.len()
                + TYPES_MARKER.len()
                + self.type_names.iter().map(|t| t.len() + 1).sum::<usize>(),
        );
        out.push_str(&self.topic_name);
        out.push_str(TYPES_MARKER);
        for (idx, type_name) in self.type_names.iter().enumerate() {
            if idx > 0 {
                out.push(TYPES_SEPARATOR);
            }
            out.push_str(type_name);
        }
        out
    }
}

/// Latest known shape of a remote node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParticipantRecord {
    pub name: String,
    pub namespace: String,
    pub publishers: Vec<TopicDescriptor>,
    pub subscribers: Vec<TopicDescriptor>,
}

impl Default for ParticipantRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            publishers: Vec::new(),
            subscribers: Vec::new(),
        }
    }
}

impl ParticipantRecord {
    pub fn count_publishers(&self, topic_name: &str) -> usize {
        count_topic(&self.publishers, topic_name)
    }

    pub fn count_subscribers(&self, topic_name: &str) -> usize {
        count_topic(&self.subscribers, topic_name)
    }
}

fn count_topic(descriptors: &[TopicDescriptor], topic_name: &str) -> usize {
    descriptors
        .iter()
        .filter(|d| d.topic_name == topic_name)
        .count()
}

/// Role of a single announcement string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Identity(&'a str),
    Namespace(&'a str),
    Name(&'a str),
    Publisher(TopicDescriptor),
    Subscriber(TopicDescriptor),
}

impl<'a> Segment<'a> {
    /// Classify one topic string.
    ///
    /// Markers are tried in the order identity, namespace, name, publisher,
    /// subscriber; the first one found anywhere in the string wins and the
    /// text after it is the remainder.
    pub fn classify(topic: &'a str) -> Option<Self> {
        if let Some(rest) = after_marker(topic, IDENTITY_MARKER) {
            return Some(Self::Identity(rest));
        }
        if let Some(rest) = after_marker(topic, NAMESPACE_MARKER) {
            return Some(Self::Namespace(rest));
        }
        if let Some(rest) = after_marker(topic, NAME_MARKER) {
            return Some(Self::Name(rest));
        }
        if let Some(rest) = after_marker(topic, PUBLISHER_MARKER) {
            return Some(Self::Publisher(TopicDescriptor::parse(rest)));
        }
        after_marker(topic, SUBSCRIBER_MARKER)
            .map(|rest| Self::Subscriber(TopicDescriptor::parse(rest)))
    }
}

fn after_marker<'a>(topic: &'a str, marker: &str) -> Option<&'a str> {
    topic.find(marker).map(|pos| &topic[pos + marker.len()..])
}

/// Result of decoding one announcement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    pub identity: Option<String>,
    pub record: ParticipantRecord,
}

impl Decoded {
    /// Split into identity and record; an empty identity counts as missing.
    pub fn into_parts(self) -> Option<(String, ParticipantRecord)> {
        let Self { identity, record } = self;
        identity
            .filter(|id| !id.is_empty())
            .map(|id| (id, record))
    }
}

/// Decode the topic strings of a single announcement.
///
/// Scalar segments (identity, namespace, name) keep the last value seen;
/// interface descriptors are appended in encounter order without
/// de-duplication.
pub fn decode<I, S>(topics: I) -> Decoded
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoded = Decoded::default();
    for topic in topics {
        match Segment::classify(topic.as_ref()) {
            Some(Segment::Identity(id)) => decoded.identity = Some(id.to_string()),
            Some(Segment::Namespace(ns)) => decoded.record.namespace = ns.to_string(),
            Some(Segment::Name(name)) => decoded.record.name = name.to_string(),
            Some(Segment::Publisher(desc)) => decoded.record.publishers.push(desc),
            Some(Segment::Subscriber(desc)) => decoded.record.subscribers.push(desc),
            None => {}
        }
    }
    decoded
}

/// Encode a participant description into announcement topic strings.
pub fn encode(identity: &str, record: &ParticipantRecord) -> Vec<String> {
    let mut topics = Vec::with_capacity(3 + record.publishers.len() + record.subscribers.len());
    topics.push(format!("{IDENTITY_MARKER}{identity}"));
    topics.push(format!("{NAMESPACE_MARKER}{}", record.namespace));
    topics.push(format!("{NAME_MARKER}{}", record.name));
    topics.extend(
        record
            .publishers
            .iter()
            .map(|d| format!("{PUBLISHER_MARKER}{}", d.encode())),
    );
    topics.extend(
        record
            .subscribers
            .iter()
            .map(|d| format!("{SUBSCRIBER_MARKER}{}", d.encode())),
    );
    topics
}
