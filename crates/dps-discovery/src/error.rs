// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use thiserror::Error;

/// Errors surfaced by change signals.
///
/// The registry never propagates these to the announcement source; they are
/// logged and counted instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A non-owning signal reference outlived its target.
    #[error("change signal target has been released")]
    SignalReleased,
    /// The host signal reported a failure.
    #[error("change signal failed: {0}")]
    SignalFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
