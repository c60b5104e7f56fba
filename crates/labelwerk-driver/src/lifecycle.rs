// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver lifecycle: lookup, attachment to a printer, and teardown.
//
// # Locking
//
// Each printer guards its attributes and driver reference with one
// `RwLock`.  Attaching holds the writer lock from registry lookup to the end
// of synthesis, so readers observe either the old capability set or the new
// one, never a mixture.  Synthesis runs into a staged copy that is installed
// only on success.  Capability queries take the reader lock.  No lock is
// ever taken while another is held; a replaced driver is torn down after the
// writer lock is released.

use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use labelwerk_core::error::{LabelwerkError, Result};
use labelwerk_core::types::DriverId;

use crate::attributes::{AttributeStore, ValueTag};
use crate::descriptor::CapabilityDescriptor;
use crate::device::Device;
use crate::families::DriverFamily;
use crate::media::{MediaLookup, PwgMediaDatabase};
use crate::registry::{DriverRegistry, UNKNOWN_MODEL};
use crate::response::printer_attributes_response;
use crate::synthesize::CapabilitySynthesizer;

/// Printer attribute naming the configured driver keyword.
pub const ATTR_DRIVER_KEYWORD: &str = "labelwerk-driver";

/// Printer attribute carrying the printer's name.
pub const ATTR_PRINTER_NAME: &str = "printer-name";

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// A driver instance attached to one printer.
pub struct Driver {
    id: DriverId,
    descriptor: CapabilityDescriptor,
    model: String,
    family: DriverFamily,
    attached_at: DateTime<Utc>,
    device: Mutex<Option<Box<dyn Device>>>,
}

impl Driver {
    fn new(descriptor: CapabilityDescriptor, model: String, family: DriverFamily) -> Self {
        Self {
            id: DriverId::new(),
            descriptor,
            model,
            family,
            attached_at: Utc::now(),
            device: Mutex::new(None),
        }
    }

    pub fn id(&self) -> DriverId {
        self.id
    }

    /// The driver keyword.
    pub fn keyword(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn family(&self) -> DriverFamily {
        self.family
    }

    pub fn attached_at(&self) -> DateTime<Utc> {
        self.attached_at
    }

    /// Hand the driver its output device.  A device already held is closed
    /// first.
    pub fn set_device(&self, device: Box<dyn Device>) -> Result<()> {
        let mut slot = self.device.lock().map_err(|_| LabelwerkError::LockPoisoned)?;
        if let Some(mut old) = slot.take() {
            if old.is_open() {
                old.close()?;
            }
        }
        debug!(driver = %self.id, uri = device.uri(), "device assigned");
        *slot = Some(device);
        Ok(())
    }

    pub fn has_device(&self) -> bool {
        self.device.lock().map(|d| d.is_some()).unwrap_or(false)
    }

    /// Close and drop the device, if any.  Later calls do nothing.
    pub fn release_device(&self) -> Result<()> {
        let mut slot = self.device.lock().map_err(|_| LabelwerkError::LockPoisoned)?;
        match slot.take() {
            Some(mut device) if device.is_open() => {
                info!(driver = %self.id, uri = device.uri(), "closing device");
                device.close()
            }
            _ => Ok(()),
        }
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        let slot = match self.device.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut device) = slot.take() {
            if device.is_open() {
                if let Err(e) = device.close() {
                    warn!(driver = %self.id, error = %e, "failed to close device on drop");
                }
            }
        }
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("id", &self.id)
            .field("keyword", &self.descriptor.name)
            .field("model", &self.model)
            .field("family", &self.family)
            .field("attached_at", &self.attached_at)
            .field("has_device", &self.has_device())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Printer
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct PrinterState {
    attrs: AttributeStore,
    driver: Option<Arc<Driver>>,
}

/// A print queue: its advertised attributes and its attached driver.
#[derive(Debug)]
pub struct Printer {
    name: String,
    state: RwLock<PrinterState>,
}

impl Printer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::seeded(name.into(), None)
    }

    /// A printer whose `labelwerk-driver` attribute is already set.
    pub fn with_driver_keyword(name: impl Into<String>, keyword: &str) -> Self {
        Self::seeded(name.into(), Some(keyword))
    }

    fn seeded(name: String, keyword: Option<&str>) -> Self {
        let mut attrs = AttributeStore::new();
        attrs.add_string(ATTR_PRINTER_NAME, ValueTag::Name, &name);
        if let Some(keyword) = keyword {
            attrs.add_string(ATTR_DRIVER_KEYWORD, ValueTag::Keyword, keyword);
        }
        Self {
            name,
            state: RwLock::new(PrinterState {
                attrs,
                driver: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current attributes.
    pub fn attributes(&self) -> Result<AttributeStore> {
        Ok(self.read()?.attrs.clone())
    }

    /// Run `f` against the attributes under the reader lock.
    pub fn with_attributes<R>(&self, f: impl FnOnce(&AttributeStore) -> R) -> Result<R> {
        Ok(f(&self.read()?.attrs))
    }

    pub fn driver(&self) -> Result<Option<Arc<Driver>>> {
        Ok(self.read()?.driver.clone())
    }

    /// Get-Printer-Attributes response bytes.  `requested` filters by
    /// attribute name; empty or `all` returns everything.
    pub fn capabilities_response(&self, request_id: u32, requested: &[&str]) -> Result<Vec<u8>> {
        let state = self.read()?;
        let selected = state.attrs.select(requested);
        Ok(printer_attributes_response(request_id, &selected))
    }

    /// Set the `labelwerk-driver` attribute read by
    /// [`DriverLifecycle::attach_configured`].
    pub fn set_driver_keyword(&self, keyword: &str) -> Result<()> {
        let mut state = self.write()?;
        state.attrs.remove(ATTR_DRIVER_KEYWORD);
        state
            .attrs
            .add_string(ATTR_DRIVER_KEYWORD, ValueTag::Keyword, keyword);
        Ok(())
    }

    /// Clear and return the driver reference.
    pub fn take_driver(&self) -> Result<Option<Arc<Driver>>> {
        Ok(self.write()?.driver.take())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PrinterState>> {
        self.state.read().map_err(|_| LabelwerkError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PrinterState>> {
        self.state.write().map_err(|_| LabelwerkError::LockPoisoned)
    }
}

// ---------------------------------------------------------------------------
// DriverLifecycle
// ---------------------------------------------------------------------------

/// Attaches registry drivers to printers and tears them down.
#[derive(Debug, Clone)]
pub struct DriverLifecycle<'r, M = PwgMediaDatabase> {
    registry: &'r DriverRegistry,
    media: M,
}

impl DriverLifecycle<'static, PwgMediaDatabase> {
    /// Built-in registry with PWG media name parsing.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(DriverRegistry::builtin()?, PwgMediaDatabase))
    }
}

impl<'r, M: MediaLookup> DriverLifecycle<'r, M> {
    pub fn new(registry: &'r DriverRegistry, media: M) -> Self {
        Self { registry, media }
    }

    pub fn registry(&self) -> &'r DriverRegistry {
        self.registry
    }

    /// Attach the driver named `keyword` to `printer`.
    ///
    /// Returns `Ok(None)` and leaves the printer untouched when the keyword
    /// is unset or unregistered.  A synthesis failure also leaves it
    /// untouched.  A previously attached driver is detached.
    #[instrument(skip_all, fields(printer = %printer.name(), keyword = ?keyword))]
    pub fn attach(&self, printer: &Printer, keyword: Option<&str>) -> Result<Option<Arc<Driver>>> {
        let (attached, previous) = {
            let mut state = printer.write()?;
            self.attach_locked(&mut state, keyword)?
        };
        self.retire(previous);
        Ok(attached)
    }

    /// Attach the driver named by the printer's `labelwerk-driver`
    /// attribute, read under the same writer lock.
    #[instrument(skip_all, fields(printer = %printer.name()))]
    pub fn attach_configured(&self, printer: &Printer) -> Result<Option<Arc<Driver>>> {
        let (attached, previous) = {
            let mut state = printer.write()?;
            let keyword = state
                .attrs
                .find_by_name_and_tag(ATTR_DRIVER_KEYWORD, ValueTag::Keyword)
                .and_then(|a| a.first())
                .and_then(|v| v.as_str())
                .map(str::to_string);
            self.attach_locked(&mut state, keyword.as_deref())?
        };
        self.retire(previous);
        Ok(attached)
    }

    /// Release the driver's device, then the driver.  No-op for `None`.
    pub fn detach(&self, driver: Option<Arc<Driver>>) -> Result<()> {
        let Some(driver) = driver else {
            return Ok(());
        };
        info!(
            driver = %driver.id(),
            keyword = driver.keyword(),
            attached_for = %(Utc::now() - driver.attached_at()),
            "detaching driver"
        );
        driver.release_device()
    }

    /// Detach whatever driver `printer` holds.
    pub fn detach_printer(&self, printer: &Printer) -> Result<()> {
        let driver = printer.take_driver()?;
        self.detach(driver)
    }

    /// Detach a driver displaced by a committed attach.  The attach already
    /// succeeded, so a close failure is logged rather than returned.
    fn retire(&self, previous: Option<Arc<Driver>>) {
        let Some(previous) = previous else {
            return;
        };
        let id = previous.id();
        if let Err(e) = self.detach(Some(previous)) {
            warn!(driver = %id, error = %e, "failed to detach replaced driver");
        }
    }

    /// Make-and-model string for `driver`, or `"Unknown"`.
    pub fn make_and_model(&self, driver: Option<&Driver>) -> &'r str {
        match driver {
            Some(d) => self.registry.model_for(d.keyword()),
            None => UNKNOWN_MODEL,
        }
    }

    /// Returns the new driver and the one it replaced.
    fn attach_locked(
        &self,
        state: &mut PrinterState,
        keyword: Option<&str>,
    ) -> Result<(Option<Arc<Driver>>, Option<Arc<Driver>>)> {
        let Some(keyword) = keyword.filter(|k| !k.is_empty()) else {
            debug!("no driver keyword");
            return Ok((None, None));
        };
        let Some(entry) = self.registry.entry(keyword) else {
            info!(%keyword, "driver not registered");
            return Ok((None, None));
        };

        let mut descriptor = CapabilityDescriptor::new(keyword);
        entry.family.initialize(&mut descriptor);

        let mut staged = state.attrs.clone();
        CapabilitySynthesizer::new(&self.media).apply(&mut staged, &descriptor, &entry.model)?;
        staged.remove(ATTR_DRIVER_KEYWORD);
        staged.add_string(ATTR_DRIVER_KEYWORD, ValueTag::Keyword, keyword);

        let driver = Arc::new(Driver::new(descriptor, entry.model.clone(), entry.family));
        state.attrs = staged;
        let previous = state.driver.replace(Arc::clone(&driver));

        info!(
            driver = %driver.id(),
            model = %entry.model,
            family = entry.family.name(),
            "driver attached"
        );
        Ok((Some(driver), previous))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::thread;

    use labelwerk_core::types::MediaSize;

    use super::*;
    use crate::device::testing::{CountingDevice, FailingDevice};
    use crate::synthesize::{ATTR_MAKE_AND_MODEL, ATTR_URF_SUPPORTED};

    fn lifecycle() -> DriverLifecycle<'static> {
        DriverLifecycle::builtin().unwrap()
    }

    fn model_of(printer: &Printer) -> Option<String> {
        printer
            .with_attributes(|a| {
                a.find(ATTR_MAKE_AND_MODEL)
                    .and_then(|attr| attr.first())
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            })
            .unwrap()
    }

    #[test]
    fn attach_synthesizes_capabilities() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let driver = lc.attach(&printer, Some("dymo_lw-450")).unwrap().unwrap();

        assert_eq!(driver.keyword(), "dymo_lw-450");
        assert_eq!(driver.family(), DriverFamily::Dymo);
        assert_eq!(lc.make_and_model(Some(&*driver)), "Dymo LabelWriter 450");
        assert_eq!(model_of(&printer).as_deref(), Some("Dymo LabelWriter 450"));

        let attrs = printer.attributes().unwrap();
        assert_eq!(attrs.find(ATTR_DRIVER_KEYWORD).unwrap().strings(), vec!["dymo_lw-450"]);
        assert_eq!(attrs.find(ATTR_PRINTER_NAME).unwrap().strings(), vec!["front-desk"]);
        assert!(attrs.find(ATTR_URF_SUPPORTED).is_some());
        assert!(Arc::ptr_eq(&printer.driver().unwrap().unwrap(), &driver));
    }

    #[test]
    fn every_builtin_driver_attaches() {
        let lc = lifecycle();
        for keyword in lc.registry().list_all() {
            let printer = Printer::new("matrix");
            let driver = lc
                .attach(&printer, Some(keyword))
                .unwrap_or_else(|e| panic!("{keyword}: {e}"))
                .unwrap();
            assert_eq!(driver.keyword(), keyword);
            assert_eq!(
                model_of(&printer).as_deref(),
                Some(lc.registry().model_for(keyword))
            );
        }
    }

    #[test]
    fn unset_or_unknown_keyword_changes_nothing() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let before = printer.attributes().unwrap();

        assert!(lc.attach(&printer, None).unwrap().is_none());
        assert!(lc.attach(&printer, Some("")).unwrap().is_none());
        assert!(lc.attach(&printer, Some("dymo_lw-9999")).unwrap().is_none());

        assert_eq!(printer.attributes().unwrap(), before);
        assert!(printer.driver().unwrap().is_none());
    }

    #[test]
    fn unknown_keyword_keeps_attached_driver() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let driver = lc.attach(&printer, Some("dymo_lw-450")).unwrap().unwrap();
        let (device, closes) = CountingDevice::new();
        driver.set_device(Box::new(device)).unwrap();
        let before = printer.attributes().unwrap().fingerprint();

        assert!(lc.attach(&printer, Some("dymo_lw-9999")).unwrap().is_none());
        assert!(lc.attach(&printer, None).unwrap().is_none());

        let installed = printer.driver().unwrap().unwrap();
        assert!(Arc::ptr_eq(&installed, &driver));
        assert_eq!(printer.attributes().unwrap().fingerprint(), before);
        assert_eq!(closes.load(Ordering::SeqCst), 0);
        assert!(driver.has_device());
    }

    #[test]
    fn failed_close_of_replaced_driver_keeps_attach() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let first = lc.attach(&printer, Some("dymo_lw-450")).unwrap().unwrap();
        first.set_device(Box::new(FailingDevice)).unwrap();
        drop(first);

        let second = lc
            .attach(&printer, Some("pcl_generic"))
            .unwrap()
            .unwrap();
        let installed = printer.driver().unwrap().unwrap();
        assert!(Arc::ptr_eq(&installed, &second));
        assert_eq!(model_of(&printer).as_deref(), Some("Generic PCL Laser Printer"));

        printer.set_driver_keyword("zpl_2inch-203dpi-dt").unwrap();
        second.set_device(Box::new(FailingDevice)).unwrap();
        drop(second);
        let third = lc.attach_configured(&printer).unwrap().unwrap();
        assert_eq!(third.keyword(), "zpl_2inch-203dpi-dt");
    }

    #[test]
    fn attach_configured_reads_printer_attribute() {
        let lc = lifecycle();
        let printer = Printer::with_driver_keyword("shipping", "zpl_4inch-203dpi-dt");
        let driver = lc.attach_configured(&printer).unwrap().unwrap();
        assert_eq!(driver.model(), "Zebra ZPL 4-inch 203dpi Direct Thermal");

        let bare = Printer::new("bare");
        assert!(lc.attach_configured(&bare).unwrap().is_none());
    }

    #[test]
    fn make_and_model_without_driver_is_unknown() {
        assert_eq!(lifecycle().make_and_model(None), UNKNOWN_MODEL);
    }

    #[test]
    fn detach_without_driver_is_noop() {
        let lc = lifecycle();
        lc.detach(None).unwrap();
        lc.detach_printer(&Printer::new("idle")).unwrap();
    }

    #[test]
    fn device_closed_exactly_once() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let driver = lc.attach(&printer, Some("pcl_generic")).unwrap().unwrap();
        let (device, closes) = CountingDevice::new();
        driver.set_device(Box::new(device)).unwrap();
        drop(driver);

        lc.detach_printer(&printer).unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(printer.driver().unwrap().is_none());
    }

    #[test]
    fn dropping_driver_closes_device() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let driver = lc.attach(&printer, Some("epl2_2inch-203dpi-dt")).unwrap().unwrap();
        let (device, closes) = CountingDevice::new();
        driver.set_device(Box::new(device)).unwrap();
        drop(driver);
        drop(printer);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reattach_detaches_previous_driver() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        let first = lc.attach(&printer, Some("dymo_lw-450")).unwrap().unwrap();
        let (device, closes) = CountingDevice::new();
        first.set_device(Box::new(device)).unwrap();

        let second = lc.attach(&printer, Some("cpcl_2inch-203dpi")).unwrap().unwrap();
        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(!first.has_device());
        assert_ne!(first.id(), second.id());
        assert_eq!(model_of(&printer).as_deref(), Some("Generic CPCL 2-inch 203dpi"));
    }

    #[test]
    fn synthesis_failure_leaves_printer_untouched() {
        let registry = DriverRegistry::builtin().unwrap();
        let empty: HashMap<String, MediaSize> = HashMap::new();
        let lc = DriverLifecycle::new(registry, empty);

        let printer = Printer::new("front-desk");
        let before = printer.attributes().unwrap();
        let err = lc.attach(&printer, Some("dymo_lw-450")).unwrap_err();

        assert!(matches!(err, LabelwerkError::UnknownMedia(_)));
        assert_eq!(printer.attributes().unwrap(), before);
        assert!(printer.driver().unwrap().is_none());
    }

    #[test]
    fn capabilities_response_filters_requested() {
        let lc = lifecycle();
        let printer = Printer::new("front-desk");
        lc.attach(&printer, Some("zpl_2inch-203dpi-dt")).unwrap();

        let full = printer.capabilities_response(9, &[]).unwrap();
        let name_only = printer.capabilities_response(9, &[ATTR_PRINTER_NAME]).unwrap();
        assert!(name_only.len() < full.len());
        assert_eq!(&full[4..8], &9u32.to_be_bytes());
    }

    #[test]
    fn readers_never_see_partial_synthesis() {
        let lc = lifecycle();
        let keywords = ["dymo_lw-450", "zpl_4inch-300dpi-tt"];

        // Expected fingerprints for each fully-attached state.
        let expected: Vec<String> = keywords
            .iter()
            .map(|k| {
                let p = Printer::new("shared");
                lc.attach(&p, Some(*k)).unwrap();
                p.attributes().unwrap().fingerprint()
            })
            .collect();
        let initial = Printer::new("shared").attributes().unwrap().fingerprint();

        let printer = Printer::new("shared");
        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..50 {
                    lc.attach(&printer, Some(keywords[i % 2])).unwrap();
                }
            });
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..200 {
                        let print = printer.with_attributes(AttributeStore::fingerprint).unwrap();
                        assert!(
                            print == initial || expected.contains(&print),
                            "observed a partially synthesized store"
                        );
                    }
                });
            }
        });
    }
}
