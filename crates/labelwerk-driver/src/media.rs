// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Media size lookup.
//
// PWG 5101.1 media names are self-describing: `class_name_WxHunits`, e.g.
// `oe_address-label_1.125x3.5in` or `iso_a6_105x148mm`.  Roll sentinels drop
// the name part (`roll_max_2.3125x3600in`).  Dimensions are reported in
// hundredths of millimetres, the unit used by media-size collections.

use std::collections::HashMap;

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::MediaSize;

/// PWG units per inch (hundredths of millimetres).
const PWG_PER_INCH: f64 = 2540.0;

/// PWG units per millimetre.
const PWG_PER_MM: f64 = 100.0;

/// Resolves a media keyword to its physical dimensions.
pub trait MediaLookup {
    /// Width and length of `keyword`, or `UnknownMedia`.
    fn resolve(&self, keyword: &str) -> Result<MediaSize>;
}

/// Lookup that parses PWG self-describing media names.
#[derive(Debug, Clone, Copy, Default)]
pub struct PwgMediaDatabase;

impl MediaLookup for PwgMediaDatabase {
    fn resolve(&self, keyword: &str) -> Result<MediaSize> {
        parse_pwg_media(keyword).ok_or_else(|| LabelwerkError::UnknownMedia(keyword.to_string()))
    }
}

/// Fixed table, mostly for tests and drivers with non-PWG names.
impl MediaLookup for HashMap<String, MediaSize> {
    fn resolve(&self, keyword: &str) -> Result<MediaSize> {
        self.get(keyword)
            .copied()
            .ok_or_else(|| LabelwerkError::UnknownMedia(keyword.to_string()))
    }
}

/// Parse `class_name_WxHunits` into PWG units.
fn parse_pwg_media(keyword: &str) -> Option<MediaSize> {
    let (prefix, dims) = keyword.rsplit_once('_')?;
    if prefix.is_empty() {
        return None;
    }

    let (numbers, scale) = if let Some(n) = dims.strip_suffix("in") {
        (n, PWG_PER_INCH)
    } else if let Some(n) = dims.strip_suffix("mm") {
        (n, PWG_PER_MM)
    } else {
        return None;
    };

    let (w, h) = numbers.split_once('x')?;
    Some(MediaSize {
        width: scale_measurement(w, scale)?,
        length: scale_measurement(h, scale)?,
    })
}

/// Decimal measurement → PWG units, rounded.  Rejects anything but plain
/// positive decimals.
fn scale_measurement(text: &str, scale: f64) -> Option<i32> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = text.parse().ok()?;
    let scaled = (value * scale).round();
    if scaled <= 0.0 || scaled > f64::from(i32::MAX) {
        return None;
    }
    Some(scaled as i32)
}
