// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver registry: keyword → make-and-model string and printer family.
//
// The registry is immutable once built.  Each keyword's family is resolved at
// construction so attaching a driver never re-parses prefixes.  The built-in
// table is constructed on first use and shared for the life of the process.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, info};

use labelwerk_core::error::{LabelwerkError, Result};

use crate::families::DriverFamily;

/// Returned by [`DriverRegistry::model_for`] for unregistered keywords.
pub const UNKNOWN_MODEL: &str = "Unknown";

/// Built-in drivers, in discovery order.
const BUILTIN_DRIVERS: &[(&str, &str)] = &[
    ("cpcl_2inch-203dpi", "Generic CPCL 2-inch 203dpi"),
    ("cpcl_4inch-203dpi", "Generic CPCL 4-inch 203dpi"),
    ("dymo_lm-400", "Dymo LabelMANAGER 400"),
    ("dymo_lm-450", "Dymo LabelMANAGER 450"),
    ("dymo_lm-pc", "Dymo LabelMANAGER PC"),
    ("dymo_lm-pc-ii", "Dymo LabelMANAGER PC II"),
    ("dymo_lm-pnp", "Dymo LabelMANAGER PNP"),
    ("dymo_lp-350", "Dymo LabelPOINT 350"),
    ("dymo_lw-300", "Dymo LabelWriter 300"),
    ("dymo_lw-310", "Dymo LabelWriter 310"),
    ("dymo_lw-315", "Dymo LabelWriter 315"),
    ("dymo_lw-320", "Dymo LabelWriter 320"),
    ("dymo_lw-330-turbo", "Dymo LabelWriter 330 Turbo"),
    ("dymo_lw-330", "Dymo LabelWriter 330"),
    ("dymo_lw-400-turbo", "Dymo LabelWriter 400 Turbo"),
    ("dymo_lw-400", "Dymo LabelWriter 400"),
    ("dymo_lw-450-duo-label", "Dymo LabelWriter 450 DUO Label"),
    ("dymo_lw-450-duo-tape", "Dymo LabelWriter 450 DUO Tape"),
    ("dymo_lw-450-turbo", "Dymo LabelWriter 450 Turbo"),
    ("dymo_lw-450-twin-turbo", "Dymo LabelWriter 450 Twin Turbo"),
    ("dymo_lw-450", "Dymo LabelWriter 450"),
    ("dymo_lw-4xl", "Dymo LabelWriter 4XL"),
    ("dymo_lw-duo-label", "Dymo LabelWriter DUO Label"),
    ("dymo_lw-duo-tape", "Dymo LabelWriter DUO Tape"),
    ("dymo_lw-duo-tape-128", "Dymo LabelWriter DUO Tape 128"),
    ("dymo_lw-se450", "Dymo LabelWriter SE450"),
    ("dymo_lw-wireless", "Dymo LabelWriter Wireless"),
    ("epl1_2inch-203dpi", "Generic EPL1 2-inch 203dpi"),
    ("epl1_4inch-203dpi", "Generic EPL1 4-inch 203dpi"),
    ("epl2_2inch-203dpi-dt", "Generic EPL2 2-inch 203dpi Direct Thermal"),
    ("epl2_4inch-203dpi-tt", "Generic EPL2 4-inch 203dpi Thermal Transfer"),
    ("epl2_4inch-300dpi-tt", "Generic EPL2 4-inch 300dpi Thermal Transfer"),
    ("fgl_26-200dpi", "Boca FGL 26 200dpi"),
    ("fgl_46-300dpi", "Boca FGL 46 300dpi"),
    ("pcl_generic", "Generic PCL Laser Printer"),
    ("zpl_2inch-203dpi-dt", "Zebra ZPL 2-inch 203dpi Direct Thermal"),
    ("zpl_2inch-300dpi-tt", "Zebra ZPL 2-inch 300dpi Thermal Transfer"),
    ("zpl_4inch-203dpi-dt", "Zebra ZPL 4-inch 203dpi Direct Thermal"),
    ("zpl_4inch-300dpi-tt", "Zebra ZPL 4-inch 300dpi Thermal Transfer"),
    ("zpl_4inch-600dpi-tt", "Zebra ZPL 4-inch 600dpi Thermal Transfer"),
];

static BUILTIN: OnceLock<DriverRegistry> = OnceLock::new();

/// One registered driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverEntry {
    pub keyword: String,
    pub model: String,
    pub family: DriverFamily,
}

/// Immutable mapping from driver keyword to model and family.
#[derive(Debug, Clone)]
pub struct DriverRegistry {
    /// Entries in registration order.
    entries: Vec<DriverEntry>,
    /// Keyword → index into `entries`.
    index: BTreeMap<String, usize>,
}

impl DriverRegistry {
    /// The built-in driver table, built on first use.
    pub fn builtin() -> Result<&'static DriverRegistry> {
        if let Some(registry) = BUILTIN.get() {
            return Ok(registry);
        }
        let registry = Self::from_entries(BUILTIN_DRIVERS.iter().copied())?;
        info!(drivers = registry.len(), "built-in driver registry ready");
        Ok(BUILTIN.get_or_init(|| registry))
    }

    /// Build from parallel keyword and model tables.
    ///
    /// The tables must be the same length; a mismatch is a configuration
    /// defect.
    pub fn from_tables(keywords: &[&str], models: &[&str]) -> Result<Self> {
        if keywords.len() != models.len() {
            return Err(LabelwerkError::RegistryMismatch {
                keywords: keywords.len(),
                models: models.len(),
            });
        }
        Self::from_entries(keywords.iter().copied().zip(models.iter().copied()))
    }

    /// Build from (keyword, model) pairs.  Duplicate keywords are rejected.
    pub fn from_entries<I, K, M>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, M)>,
        K: Into<String>,
        M: Into<String>,
    {
        let mut entries = Vec::new();
        let mut index = BTreeMap::new();

        for (keyword, model) in pairs {
            let keyword = keyword.into();
            if index.contains_key(&keyword) {
                return Err(LabelwerkError::DuplicateDriver(keyword));
            }
            let family = DriverFamily::from_keyword(&keyword);
            debug!(%keyword, family = family.name(), "registering driver");
            index.insert(keyword.clone(), entries.len());
            entries.push(DriverEntry {
                keyword,
                model: model.into(),
                family,
            });
        }

        Ok(Self { entries, index })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of `keyword` in registration order.
    pub fn lookup(&self, keyword: &str) -> Option<usize> {
        self.index.get(keyword).copied()
    }

    pub fn entry(&self, keyword: &str) -> Option<&DriverEntry> {
        self.lookup(keyword).map(|i| &self.entries[i])
    }

    /// Entry at a position returned by [`lookup`](Self::lookup).
    pub fn get(&self, index: usize) -> Option<&DriverEntry> {
        self.entries.get(index)
    }

    /// All registered keywords, in registration order.
    pub fn list_all(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.keyword.as_str()).collect()
    }

    pub fn entries(&self) -> &[DriverEntry] {
        &self.entries
    }

    /// Make-and-model string for `keyword`, or [`UNKNOWN_MODEL`].
    pub fn model_for(&self, keyword: &str) -> &str {
        self.entry(keyword)
            .map(|e| e.model.as_str())
            .unwrap_or(UNKNOWN_MODEL)
    }
}
