// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Environment variable configuration for the discovery layer.
//!
//! - `DPS_DOMAIN_ID`: domain ID (default: 0, or ROS_DOMAIN_ID if set)
//! - `DPS_DISCOVERY_TOPIC`: discovery channel topic (default: `$ROS`)
//! - `DPS_LOG_LEVEL`: logging level (default: "info")
//!
//! # Example
//!
//! ```bash
//! export DPS_DOMAIN_ID=7
//! export DPS_LOG_LEVEL=debug
//! ```

use std::env;

pub const ENV_DOMAIN_ID: &str = "DPS_DOMAIN_ID";
pub const ENV_DISCOVERY_TOPIC: &str = "DPS_DISCOVERY_TOPIC";
pub const ENV_LOG_LEVEL: &str = "DPS_LOG_LEVEL";

/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";

pub const DEFAULT_DISCOVERY_TOPIC: &str = "$ROS";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Domain the announcements were captured on. Informational only: the
    /// registry does not filter by domain.
    pub domain_id: u32,

    /// Topic every participant publishes its announcement on
    pub discovery_topic: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            discovery_topic: DEFAULT_DISCOVERY_TOPIC.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl EnvConfig {
    /// Load configuration from environment variables
    ///
    /// Priority for domain ID:
    /// 1. DPS_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. Default (0)
    #[must_use]
    pub fn from_env() -> Self {
        let domain_id = env::var(ENV_DOMAIN_ID)
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .or_else(|| {
                env::var(ENV_ROS_DOMAIN_ID)
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .unwrap_or(0);

        let discovery_topic = non_empty_var(ENV_DISCOVERY_TOPIC)
            .unwrap_or_else(|| DEFAULT_DISCOVERY_TOPIC.to_string());

        let log_level =
            non_empty_var(ENV_LOG_LEVEL).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Self {
            domain_id,
            discovery_topic,
            log_level,
        }
    }

    /// Check if any setting that changes behaviour was customized
    ///
    /// `domain_id` is informational and not considered.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.discovery_topic != DEFAULT_DISCOVERY_TOPIC || self.log_level != DEFAULT_LOG_LEVEL
    }

    /// Export the log level as `RUST_LOG` unless the caller already set it.
    pub fn apply_log_level(&self) {
        if let Err(env::VarError::NotPresent) = env::var("RUST_LOG") {
            env::set_var("RUST_LOG", &self.log_level);
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}
