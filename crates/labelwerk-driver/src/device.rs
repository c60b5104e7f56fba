// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output device handle owned by an attached driver.
//
// Transports (USB, network, serial) live outside this crate; a driver only
// needs to know the device's URI and how to close it on detach.

use tracing::debug;

use labelwerk_core::error::{LabelwerkError, Result};

/// A connection to a physical printer.
pub trait Device: Send {
    /// Device URI, e.g. `usb://Zebra/ZD420` or `socket://10.0.0.5`.
    fn uri(&self) -> &str;

    fn is_open(&self) -> bool;

    /// Release the connection.  Closing an already-closed device is an error.
    fn close(&mut self) -> Result<()>;
}

/// Device that accepts nothing and only tracks whether it is open.
#[derive(Debug, Clone)]
pub struct NullDevice {
    uri: String,
    open: bool,
}

impl NullDevice {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            open: true,
        }
    }
}

impl Device for NullDevice {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Err(LabelwerkError::Device(format!("{} already closed", self.uri)));
        }
        debug!(uri = %self.uri, "null device closed");
        self.open = false;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Device that counts how many times it has been closed.
    pub struct CountingDevice {
        pub closes: Arc<AtomicUsize>,
    }

    impl CountingDevice {
        pub fn new() -> (Self, Arc<AtomicUsize>) {
            let closes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    closes: Arc::clone(&closes),
                },
                closes,
            )
        }
    }

    impl Device for CountingDevice {
        fn uri(&self) -> &str {
            "test://counting"
        }

        fn is_open(&self) -> bool {
            self.closes.load(Ordering::SeqCst) == 0
        }

        fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Device whose close always fails.
    pub struct FailingDevice;

    impl Device for FailingDevice {
        fn uri(&self) -> &str {
            "test://failing"
        }

        fn is_open(&self) -> bool {
            true
        }

        fn close(&mut self) -> Result<()> {
            Err(LabelwerkError::Device("close refused".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_device_closes_once() {
        let mut dev = NullDevice::new("socket://10.0.0.5");
        assert!(dev.is_open());
        dev.close().unwrap();
        assert!(!dev.is_open());
        assert!(matches!(dev.close(), Err(LabelwerkError::Device(_))));
    }
}
