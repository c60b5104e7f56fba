// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;

/// Persistent settings for a Labelwerk printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name advertised for the printer.
    pub printer_name: String,
    /// Driver keyword to attach on startup (e.g. "dymo_lw-450").
    pub driver: Option<String>,
    /// Device URI the driver talks to, if any.
    pub device_uri: Option<String>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            printer_name: "Labelwerk Printer".into(),
            driver: None,
            device_uri: None,
            log_filter: "info".into(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        info!(path = %path.display(), driver = ?config.driver, "configuration loaded");
        Ok(config)
    }

    /// Write configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert!(config.driver.is_none());
    }

    #[test]
    fn save_then_load_preserves_driver() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labelwerk.json");

        let config = ServiceConfig {
            driver: Some("dymo_lw-450".into()),
            device_uri: Some("usb://DYMO/LabelWriter%20450".into()),
            ..ServiceConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = ServiceConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "driver": "zpl_4inch-203dpi-dt" }"#).unwrap();

        let loaded = ServiceConfig::load(&path).unwrap();
        assert_eq!(loaded.driver.as_deref(), Some("zpl_4inch-203dpi-dt"));
        assert_eq!(loaded.log_filter, "info");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(ServiceConfig::load(&path).is_err());
    }
}
