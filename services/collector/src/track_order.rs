//! Delivery-order checks for recorded `Track: N` events.
//!
//! Test apps emit events named `Track: 1`, `Track: 2`, ... and the collector
//! records their names in arrival order. These helpers read that record back
//! and report where the sequence went backwards, repeated, or has gaps.

use std::{collections::BTreeSet, fmt, path::Path};

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

static TRACK_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Track:\s*(\d+)").expect("track pattern is valid"));

/// A track that arrived at or below the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderInconsistency {
    /// One-based position of the offending track in the sequence.
    pub position: usize,
    pub previous_track: u64,
    pub current_track: u64,
    /// Approximate line in the batch file.
    pub line_number: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackReport {
    pub tracks: Vec<u64>,
    pub inconsistencies: Vec<OrderInconsistency>,
    pub missing: Vec<u64>,
    pub duplicates: Vec<u64>,
}

impl TrackReport {
    pub fn is_ordered(&self) -> bool {
        self.inconsistencies.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.is_ordered() && self.missing.is_empty() && self.duplicates.is_empty()
    }
}

pub fn extract_track_numbers(content: &str) -> Vec<u64> {
    TRACK_PATTERN
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| match m.as_str().parse::<u64>() {
            Ok(track) => Some(track),
            Err(err) => {
                warn!(value = m.as_str(), error = %err, "skipping unparsable track number");
                None
            }
        })
        .collect()
}

pub fn find_order_inconsistencies(tracks: &[u64]) -> Vec<OrderInconsistency> {
    tracks
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1] <= pair[0])
        .map(|(idx, pair)| {
            let i = idx + 1;
            OrderInconsistency {
                position: i + 1,
                previous_track: pair[0],
                current_track: pair[1],
                line_number: i + 2,
            }
        })
        .collect()
}

/// Each repeated track once, in the order it was first repeated.
pub fn find_duplicate_tracks(tracks: &[u64]) -> Vec<u64> {
    let mut seen = BTreeSet::new();
    let mut duplicates = Vec::new();
    for &track in tracks {
        if !seen.insert(track) && !duplicates.contains(&track) {
            duplicates.push(track);
        }
    }
    duplicates
}

/// Tracks in `1..=tracks.len()` that never arrived.
pub fn find_missing_tracks(tracks: &[u64]) -> Vec<u64> {
    let present: BTreeSet<u64> = tracks.iter().copied().collect();
    (1..=tracks.len() as u64)
        .filter(|track| !present.contains(track))
        .collect()
}

pub fn check_track_order(content: &str) -> TrackReport {
    let tracks = extract_track_numbers(content);
    TrackReport {
        inconsistencies: find_order_inconsistencies(&tracks),
        missing: find_missing_tracks(&tracks),
        duplicates: find_duplicate_tracks(&tracks),
        tracks,
    }
}

/// Reads a batch file written by the collector and checks its tracks.
pub fn check_track_file(path: &Path) -> Result<TrackReport> {
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("error reading file {}", path.display()))?;
    debug!(path = %path.display(), bytes = content.len(), "batch file loaded");

    Ok(check_track_order(&content))
}

impl fmt::Display for TrackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tracks.is_empty() {
            return writeln!(f, "No track numbers found.");
        }

        writeln!(f, "Found {} track entries.", self.tracks.len())?;
        writeln!(f, "Track numbers: {:?}", self.tracks)?;

        if self.inconsistencies.is_empty() {
            writeln!(f, "\nAll tracks are in ascending order.")?;
        } else {
            writeln!(
                f,
                "\nINCONSISTENCIES FOUND: {} places where tracks are not in ascending order:",
                self.inconsistencies.len()
            )?;
            writeln!(f, "{}", "-".repeat(70))?;
            for issue in &self.inconsistencies {
                writeln!(
                    f,
                    "Position {}: Track {} comes after Track {}",
                    issue.position, issue.current_track, issue.previous_track
                )?;
                writeln!(
                    f,
                    "  Expected: Track {} < Track {}",
                    issue.previous_track, issue.current_track
                )?;
                writeln!(f, "  Approximate line: {}\n", issue.line_number)?;
            }
        }

        if !self.missing.is_empty() {
            writeln!(
                f,
                "Missing tracks (if expecting 1 to {}): {:?}",
                self.tracks.len(),
                self.missing
            )?;
        }
        if !self.duplicates.is_empty() {
            writeln!(f, "Duplicate tracks found: {:?}", self.duplicates)?;
        }

        Ok(())
    }
}
