// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Labelwerk Driver — label printer driver registry and capability
// negotiation.  Attaching a driver to a printer rewrites the printer's IPP
// attributes (resolutions, media, margins, sources, types) from the driver's
// static capability descriptor.

pub mod attributes;
pub mod descriptor;
pub mod device;
pub mod families;
pub mod lifecycle;
pub mod media;
pub mod registry;
pub mod response;
pub mod synthesize;

pub use attributes::{AttrValue, Attribute, AttributeStore, ValueTag};
pub use descriptor::CapabilityDescriptor;
pub use device::{Device, NullDevice};
pub use families::DriverFamily;
pub use lifecycle::{Driver, DriverLifecycle, Printer};
pub use media::{MediaLookup, PwgMediaDatabase};
pub use registry::DriverRegistry;
pub use synthesize::{CapabilitySynthesizer, media_col};
