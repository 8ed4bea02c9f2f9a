// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Recorded announcement input.
//!
//! One announcement per line, topic strings separated by whitespace. Blank
//! lines and lines starting with `#` are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub type Announcement = Vec<String>;

pub fn read_announcements<R: BufRead>(reader: R) -> io::Result<Vec<Announcement>> {
    let mut announcements = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        announcements.push(trimmed.split_whitespace().map(String::from).collect());
    }
    Ok(announcements)
}

/// Read from `path`, or stdin when no path (or `-`) is given.
pub fn load(path: Option<&Path>) -> io::Result<Vec<Announcement>> {
    match path {
        Some(p) if p != Path::new("-") => read_announcements(BufReader::new(File::open(p)?)),
        _ => read_announcements(io::stdin().lock()),
    }
}
