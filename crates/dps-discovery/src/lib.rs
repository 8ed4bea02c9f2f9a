// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discovery decoding and node registry for DPS-based ROS 2 graphs.
//!
//! Remote participants announce themselves on a well-known discovery topic
//! with a flat set of marker-tagged topic strings. [`codec`] turns those
//! strings into [`ParticipantRecord`]s, [`DiscoveryRegistry`] keeps the
//! latest record per participant and fires a [`ChangeSignal`] whenever the
//! observable content changes.
//!
//! ```
//! use dps_discovery::{DiscoveryRegistry, GraphGuard};
//! use std::sync::Arc;
//!
//! let guard = Arc::new(GraphGuard::new());
//! let registry = DiscoveryRegistry::new(guard.clone());
//!
//! registry.on_announcement(["_did_=abc123", "_name_=talker", "_pub_=chatter&types=std_msgs/String"]);
//! assert_eq!(registry.count_matching_publishers("chatter"), 1);
//! assert!(guard.take_trigger());
//! ```

pub mod advertisement;
pub mod codec;
pub mod config;
pub mod error;
pub mod registry;
pub mod signal;

pub use advertisement::Advertisement;
pub use codec::{decode, encode, Decoded, ParticipantRecord, Segment, TopicDescriptor};
pub use config::EnvConfig;
pub use error::{Error, Result};
pub use registry::{DiscoveryRegistry, Outcome, RegistryStats};
pub use signal::{ChangeSignal, GraphGuard};
