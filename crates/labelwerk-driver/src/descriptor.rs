// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Static capabilities of a single driver.

use serde::Serialize;

use labelwerk_core::types::{Margins, MediaEntry, Resolution};

/// Everything a driver can do, filled in once by its family initializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityDescriptor {
    /// Driver keyword, `<family>_<model>`.
    pub name: String,
    /// Supported resolutions, ascending; the last one is the default.
    pub resolutions: Vec<Resolution>,
    /// Media list in driver order, roll sentinels included.
    pub media: Vec<MediaEntry>,
    pub margins: Margins,
    /// media-source keywords.
    pub sources: Vec<String>,
    /// media-type keywords.
    pub types: Vec<String>,
}

/// A descriptor's media list split into fixed sizes and roll bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPartition<'a> {
    /// Fixed sizes in original order.
    pub fixed: Vec<&'a str>,
    pub roll_min: Option<&'a str>,
    pub roll_max: Option<&'a str>,
}

impl MediaPartition<'_> {
    /// The (min, max) roll pair, only when both bounds are present.
    pub fn roll_range(&self) -> Option<(&str, &str)> {
        Some((self.roll_min?, self.roll_max?))
    }

    /// Number of size collections this partition produces.
    pub fn output_count(&self) -> usize {
        self.fixed.len() + usize::from(self.roll_range().is_some())
    }
}

impl CapabilityDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Replace the media list, classifying each keyword.
    pub fn set_media<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.media = keywords
            .into_iter()
            .map(|k| MediaEntry::classify(k.as_ref()))
            .collect();
    }

    /// Raw media keywords, sentinels included, in driver order.
    pub fn media_keywords(&self) -> Vec<&str> {
        self.media.iter().map(MediaEntry::keyword).collect()
    }

    /// Highest (last) resolution, if any.
    pub fn default_resolution(&self) -> Option<Resolution> {
        self.resolutions.last().copied()
    }

    /// Split media into fixed sizes and roll bounds.  When a bound appears
    /// more than once the last occurrence wins.
    pub fn partition_media(&self) -> MediaPartition<'_> {
        let mut partition = MediaPartition {
            fixed: Vec::new(),
            roll_min: None,
            roll_max: None,
        };
        for entry in &self.media {
            match entry {
                MediaEntry::Fixed(k) => partition.fixed.push(k.as_str()),
                MediaEntry::RollMin(k) => partition.roll_min = Some(k.as_str()),
                MediaEntry::RollMax(k) => partition.roll_max = Some(k.as_str()),
            }
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_media(media: &[&str]) -> CapabilityDescriptor {
        let mut desc = CapabilityDescriptor::new("test_model");
        desc.set_media(media);
        desc
    }

    #[test]
    fn partition_keeps_fixed_order_and_pairs_rolls() {
        let desc = with_media(&["media_a", "roll_min_x", "roll_max_x", "media_b"]);
        let p = desc.partition_media();
        assert_eq!(p.fixed, vec!["media_a", "media_b"]);
        assert_eq!(p.roll_range(), Some(("roll_min_x", "roll_max_x")));
        assert_eq!(p.output_count(), 3);
    }

    #[test]
    fn lone_sentinel_has_no_range() {
        let desc = with_media(&["media_a", "roll_min_x"]);
        let p = desc.partition_media();
        assert_eq!(p.fixed, vec!["media_a"]);
        assert!(p.roll_range().is_none());
        assert_eq!(p.output_count(), 1);

        let desc = with_media(&["roll_max_x"]);
        assert_eq!(desc.partition_media().output_count(), 0);
    }

    #[test]
    fn raw_keywords_keep_sentinels() {
        let desc = with_media(&["roll_max_x", "media_a", "roll_min_x"]);
        assert_eq!(desc.media_keywords(), vec!["roll_max_x", "media_a", "roll_min_x"]);
    }

    #[test]
    fn default_resolution_is_last() {
        let mut desc = CapabilityDescriptor::new("test_model");
        assert!(desc.default_resolution().is_none());
        desc.resolutions = vec![Resolution::square(150), Resolution::square(300)];
        assert_eq!(desc.default_resolution(), Some(Resolution::square(300)));
    }
}
