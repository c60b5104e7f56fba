// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Labelwerk drivers and capability negotiation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix marking the maximum bound of a roll-fed media range.
pub const ROLL_MAX_PREFIX: &str = "roll_max_";

/// Prefix marking the minimum bound of a roll-fed media range.
pub const ROLL_MIN_PREFIX: &str = "roll_min_";

/// Unique identifier for a driver instance attached to a printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub Uuid);

impl DriverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DriverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DriverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A print resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub x: i32,
    pub y: i32,
}

impl Resolution {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Square resolution (same dpi in both directions).
    pub const fn square(dpi: i32) -> Self {
        Self { x: dpi, y: dpi }
    }
}

/// Symmetric media margins in hundredths of millimetres.
///
/// Only two values are stored: left and right share one, bottom and top
/// share the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub left_right: i32,
    pub bottom_top: i32,
}

impl Margins {
    pub const fn new(left_right: i32, bottom_top: i32) -> Self {
        Self {
            left_right,
            bottom_top,
        }
    }
}

/// Physical media dimensions in hundredths of millimetres (PWG units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSize {
    pub width: i32,
    pub length: i32,
}

/// One entry of a driver's media list, classified once by naming convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaEntry {
    /// A discrete sheet or label size.
    Fixed(String),
    /// Minimum bound of a roll-fed range (`roll_min_...`).
    RollMin(String),
    /// Maximum bound of a roll-fed range (`roll_max_...`).
    RollMax(String),
}

impl MediaEntry {
    /// Classify a media keyword by its prefix.
    pub fn classify(keyword: &str) -> Self {
        if keyword.starts_with(ROLL_MAX_PREFIX) {
            Self::RollMax(keyword.to_string())
        } else if keyword.starts_with(ROLL_MIN_PREFIX) {
            Self::RollMin(keyword.to_string())
        } else {
            Self::Fixed(keyword.to_string())
        }
    }

    /// The original media keyword, sentinel prefix included.
    pub fn keyword(&self) -> &str {
        match self {
            Self::Fixed(k) | Self::RollMin(k) | Self::RollMax(k) => k,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }
}

impl std::fmt::Display for MediaEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_prefix() {
        assert_eq!(
            MediaEntry::classify("roll_max_2.3125x3600in"),
            MediaEntry::RollMax("roll_max_2.3125x3600in".into())
        );
        assert_eq!(
            MediaEntry::classify("roll_min_0.25x0.25in"),
            MediaEntry::RollMin("roll_min_0.25x0.25in".into())
        );
        assert_eq!(
            MediaEntry::classify("oe_address-label_1.125x3.5in"),
            MediaEntry::Fixed("oe_address-label_1.125x3.5in".into())
        );
    }

    #[test]
    fn prefix_must_be_leading() {
        // "roll_max_" appearing mid-keyword does not make a sentinel.
        assert!(MediaEntry::classify("oe_roll_max_1x1in").is_fixed());
    }

    #[test]
    fn keyword_round_trips_verbatim() {
        let entry = MediaEntry::classify("roll_min_0.25x0.25in");
        assert_eq!(entry.keyword(), "roll_min_0.25x0.25in");
        assert_eq!(entry.to_string(), "roll_min_0.25x0.25in");
    }

    #[test]
    fn driver_ids_are_unique() {
        assert_ne!(DriverId::new(), DriverId::new());
    }
}
