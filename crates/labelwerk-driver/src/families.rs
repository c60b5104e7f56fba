// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer families and their capability initializers.
//
// A driver keyword is `<family>_<model>`.  The family is resolved once, when
// the registry is built, by checking known prefixes in a fixed order; any
// keyword without a known prefix belongs to the ZPL family.  Each family's
// initializer fills a fresh `CapabilityDescriptor` completely.

use serde::Serialize;

use labelwerk_core::types::{Margins, Resolution};

use crate::descriptor::CapabilityDescriptor;

/// Label printer command-language families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverFamily {
    /// Comtec Printer Control Language (mobile printers).
    Cpcl,
    /// DYMO LabelManager / LabelWriter raster protocol.
    Dymo,
    /// Eltron Programming Language, page mode.
    Epl1,
    /// Eltron Programming Language 2.
    Epl2,
    /// Friendly Ghost Language (Boca ticket printers).
    Fgl,
    /// HP Printer Command Language.
    Pcl,
    /// Zebra Programming Language.
    Zpl,
}

/// Prefix table, checked in order.  ZPL is the fallback.
const FAMILY_PREFIXES: &[(&str, DriverFamily)] = &[
    ("cpcl_", DriverFamily::Cpcl),
    ("dymo_", DriverFamily::Dymo),
    ("epl1_", DriverFamily::Epl1),
    ("epl2_", DriverFamily::Epl2),
    ("fgl_", DriverFamily::Fgl),
    ("pcl_", DriverFamily::Pcl),
];

impl DriverFamily {
    /// Resolve a driver keyword's family from its prefix.
    pub fn from_keyword(keyword: &str) -> Self {
        FAMILY_PREFIXES
            .iter()
            .find(|(prefix, _)| keyword.starts_with(prefix))
            .map(|(_, family)| *family)
            .unwrap_or(Self::Zpl)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cpcl => "CPCL",
            Self::Dymo => "DYMO",
            Self::Epl1 => "EPL1",
            Self::Epl2 => "EPL2",
            Self::Fgl => "FGL",
            Self::Pcl => "PCL",
            Self::Zpl => "ZPL",
        }
    }

    /// Fill `desc` with this family's capabilities for `desc.name`.
    pub fn initialize(&self, desc: &mut CapabilityDescriptor) {
        match self {
            Self::Cpcl => init_cpcl(desc),
            Self::Dymo => init_dymo(desc),
            Self::Epl1 => init_epl1(desc),
            Self::Epl2 => init_epl2(desc),
            Self::Fgl => init_fgl(desc),
            Self::Pcl => init_pcl(desc),
            Self::Zpl => init_zpl(desc),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared media tables
// ---------------------------------------------------------------------------

/// Direct-thermal label stock for 2-inch print heads.
const LABELS_2INCH: &[&str] = &[
    "oe_1.25x0.25-label_1.25x0.25in",
    "oe_1.25x2.25-label_1.25x2.25in",
    "oe_1.5x0.25-label_1.5x0.25in",
    "oe_1.5x0.5-label_1.5x0.5in",
    "oe_1.5x1-label_1.5x1in",
    "oe_1.5x2-label_1.5x2in",
    "oe_2x0.37-label_2x0.37in",
    "oe_2x0.5-label_2x0.5in",
    "oe_2x1-label_2x1in",
    "oe_2x1.25-label_2x1.25in",
    "oe_2x2-label_2x2in",
    "oe_2x3-label_2x3in",
    "oe_2x4-label_2x4in",
    "oe_2x5.5-label_2x5.5in",
];

/// Additional stock usable on 4-inch print heads.
const LABELS_4INCH: &[&str] = &[
    "oe_2.25x0.5-label_2.25x0.5in",
    "oe_2.25x1.25-label_2.25x1.25in",
    "oe_2.25x4-label_2.25x4in",
    "oe_2.25x5.5-label_2.25x5.5in",
    "oe_2.38x5.5-label_2.38x5.5in",
    "oe_2.5x1-label_2.5x1in",
    "oe_2.5x2-label_2.5x2in",
    "oe_2.75x1.25-label_2.75x1.25in",
    "oe_2.9x1-label_2.9x1in",
    "oe_3x1-label_3x1in",
    "oe_3x2-label_3x2in",
    "oe_3x3-label_3x3in",
    "oe_3x5-label_3x5in",
    "oe_3.25x2-label_3.25x2in",
    "oe_3.25x5-label_3.25x5in",
    "oe_3.25x5.5-label_3.25x5.5in",
    "oe_3.25x5.83-label_3.25x5.83in",
    "oe_3.25x7.83-label_3.25x7.83in",
    "oe_3.5x1-label_3.5x1in",
    "oe_4x1-label_4x1in",
    "oe_4x2-label_4x2in",
    "oe_4x3-label_4x3in",
    "oe_4x4-label_4x4in",
    "oe_4x5-label_4x5in",
    "oe_4x6-label_4x6in",
    "oe_4x6.5-label_4x6.5in",
    "oe_4x13-label_4x13in",
];

const ROLL_MIN_THERMAL: &str = "roll_min_0.25x0.25in";
const ROLL_MAX_2INCH: &str = "roll_max_2x100in";
const ROLL_MAX_4INCH: &str = "roll_max_4x100in";

const TYPES_THERMAL: &[&str] = &["labels", "labels-continuous", "continuous"];

/// Print-head width in inches from a `..._<n>inch-...` keyword.
fn head_width_inches(keyword: &str) -> Option<u32> {
    keyword
        .split(['_', '-'])
        .find_map(|part| part.strip_suffix("inch")?.parse().ok())
}

/// Resolution from a `...-<n>dpi...` keyword.
fn keyword_dpi(keyword: &str) -> Option<i32> {
    keyword
        .split(['_', '-'])
        .find_map(|part| part.strip_suffix("dpi")?.parse().ok())
}

/// Media list for a thermal head of the given width, roll bounds appended.
fn thermal_media(width_inches: u32) -> Vec<&'static str> {
    let mut media: Vec<&str> = LABELS_2INCH.to_vec();
    if width_inches >= 4 {
        media.extend_from_slice(LABELS_4INCH);
        media.push(ROLL_MAX_4INCH);
    } else {
        media.push(ROLL_MAX_2INCH);
    }
    media.push(ROLL_MIN_THERMAL);
    media
}

fn set_strings(target: &mut Vec<String>, values: &[&str]) {
    *target = values.iter().map(|v| v.to_string()).collect();
}

// ---------------------------------------------------------------------------
// Family initializers
// ---------------------------------------------------------------------------

fn init_cpcl(desc: &mut CapabilityDescriptor) {
    let dpi = keyword_dpi(&desc.name).unwrap_or(203);
    let width = head_width_inches(&desc.name).unwrap_or(2);

    desc.resolutions = vec![Resolution::square(dpi)];
    let media = thermal_media(width);
    desc.set_media(&media);
    desc.margins = Margins::new(0, 0);
    set_strings(&mut desc.sources, &["main-roll"]);
    set_strings(&mut desc.types, TYPES_THERMAL);
}

/// DYMO LabelManager tape cassettes (continuous, 6-24 mm).
const DYMO_TAPE_MEDIA: &[&str] = &[
    "oe_thin-1in-tape_0.25x1in",
    "oe_thin-2in-tape_0.25x2in",
    "oe_thick-1in-tape_0.375x1in",
    "oe_thick-2in-tape_0.375x2in",
    "oe_medium-1in-tape_0.5x1in",
    "oe_medium-2in-tape_0.5x2in",
    "oe_wide-1in-tape_0.75x1in",
    "oe_wide-2in-tape_0.75x2in",
    "roll_max_1x100in",
    "roll_min_0.25x1in",
];

/// DYMO LabelWriter die-cut labels.
const DYMO_LABEL_MEDIA: &[&str] = &[
    "oe_address-label_1.125x3.5in",
    "oe_lg-address-label_1.4x3.5in",
    "oe_return-address-label_0.75x2in",
    "oe_file-folder-label_0.5625x3.4375in",
    "oe_hanging-file-folder-label_0.5625x2in",
    "oe_multipurpose-label_1x2.125in",
    "oe_multipurpose-label_2x2.3125in",
    "oe_name-badge-label_2.125x4in",
    "oe_shipping-label_2.125x4in",
    "oe_square-multipurpose-label_1x1in",
    "oe_video-spine-label_0.75x5.875in",
    "oe_video-top-label_1.8x3.1in",
    "roll_max_2.3125x3600in",
    "roll_min_0.25x0.25in",
];

/// Extra stock for the wide-format LabelWriter 4XL.
const DYMO_4XL_MEDIA: &[&str] = &[
    "oe_4xl-shipping-label_4x6in",
    "oe_4xl-extra-large-shipping-label_4x6.75in",
    "roll_max_4.16x3600in",
];

fn init_dymo(desc: &mut CapabilityDescriptor) {
    let model = desc.name.trim_start_matches("dymo_").to_string();
    let is_tape = model.starts_with("lm-") || model.contains("tape");

    if is_tape {
        desc.resolutions = vec![Resolution::square(180)];
        desc.set_media(DYMO_TAPE_MEDIA);
        desc.margins = Margins::new(100, 0);
        set_strings(&mut desc.sources, &["main-roll"]);
        set_strings(&mut desc.types, &["continuous"]);
        return;
    }

    desc.resolutions = vec![Resolution::new(136, 330), Resolution::square(300)];
    if model == "lw-4xl" {
        let media: Vec<&str> = DYMO_LABEL_MEDIA
            .iter()
            .filter(|m| !m.starts_with("roll_max_"))
            .chain(DYMO_4XL_MEDIA)
            .copied()
            .collect();
        desc.set_media(&media);
    } else {
        desc.set_media(DYMO_LABEL_MEDIA);
    }
    desc.margins = Margins::new(132, 100);

    if model.contains("twin-turbo") {
        set_strings(&mut desc.sources, &["main-roll", "alternate-roll"]);
    } else {
        set_strings(&mut desc.sources, &["main-roll"]);
    }
    set_strings(&mut desc.types, &["labels", "continuous"]);
}

fn init_epl1(desc: &mut CapabilityDescriptor) {
    let width = head_width_inches(&desc.name).unwrap_or(2);

    desc.resolutions = vec![Resolution::square(203)];
    let media = thermal_media(width);
    desc.set_media(&media);
    desc.margins = Margins::new(0, 0);
    set_strings(&mut desc.sources, &["main-roll"]);
    set_strings(&mut desc.types, &["labels", "continuous"]);
}

fn init_epl2(desc: &mut CapabilityDescriptor) {
    let dpi = keyword_dpi(&desc.name).unwrap_or(203);
    let width = head_width_inches(&desc.name).unwrap_or(4);

    desc.resolutions = vec![Resolution::square(dpi)];
    let media = thermal_media(width);
    desc.set_media(&media);
    desc.margins = Margins::new(0, 0);
    set_strings(&mut desc.sources, &["main-roll"]);
    set_strings(&mut desc.types, TYPES_THERMAL);
}

/// Boca ticket stock.  Tickets are fixed lengths, so no roll range.
const FGL_MEDIA: &[&str] = &[
    "oe_2x5.5-ticket_2x5.5in",
    "oe_3.25x5.5-ticket_3.25x5.5in",
    "oe_2.13x7-ticket_2.13x7in",
    "oe_3.25x8-ticket_3.25x8in",
];

fn init_fgl(desc: &mut CapabilityDescriptor) {
    let dpi = keyword_dpi(&desc.name).unwrap_or(200);

    desc.resolutions = vec![Resolution::square(dpi)];
    desc.set_media(FGL_MEDIA);
    desc.margins = Margins::new(0, 0);
    // Ticket printers have a single fixed path; no selectable sources.
    desc.sources.clear();
    set_strings(&mut desc.types, &["cardstock"]);
}

fn init_pcl(desc: &mut CapabilityDescriptor) {
    desc.resolutions = vec![Resolution::square(300), Resolution::square(600)];
    desc.set_media([
        "na_letter_8.5x11in",
        "na_legal_8.5x14in",
        "iso_a4_210x297mm",
        "na_number-10_4.125x9.5in",
        "iso_dl_110x220mm",
    ]);
    desc.margins = Margins::new(635, 423);
    set_strings(&mut desc.sources, &["auto", "main", "manual"]);
    set_strings(&mut desc.types, &["stationery", "envelope", "labels"]);
}

fn init_zpl(desc: &mut CapabilityDescriptor) {
    let dpi = keyword_dpi(&desc.name).unwrap_or(203);
    let width = head_width_inches(&desc.name).unwrap_or(4);

    desc.resolutions = vec![Resolution::square(dpi)];
    let media = thermal_media(width);
    desc.set_media(&media);
    desc.margins = Margins::new(0, 0);
    set_strings(&mut desc.sources, &["main-roll"]);
    if desc.name.ends_with("-tt") {
        set_strings(&mut desc.types, TYPES_THERMAL);
    } else {
        set_strings(&mut desc.types, &["labels", "continuous"]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaLookup, PwgMediaDatabase};

    fn build(keyword: &str) -> CapabilityDescriptor {
        let mut desc = CapabilityDescriptor::new(keyword);
        DriverFamily::from_keyword(keyword).initialize(&mut desc);
        desc
    }

    #[test]
    fn prefixes_resolve_in_order() {
        assert_eq!(DriverFamily::from_keyword("cpcl_2inch-203dpi"), DriverFamily::Cpcl);
        assert_eq!(DriverFamily::from_keyword("dymo_lw-450"), DriverFamily::Dymo);
        assert_eq!(DriverFamily::from_keyword("epl1_2inch-203dpi"), DriverFamily::Epl1);
        assert_eq!(DriverFamily::from_keyword("epl2_4inch-203dpi-tt"), DriverFamily::Epl2);
        assert_eq!(DriverFamily::from_keyword("fgl_26-200dpi"), DriverFamily::Fgl);
        assert_eq!(DriverFamily::from_keyword("pcl_generic"), DriverFamily::Pcl);
        assert_eq!(DriverFamily::from_keyword("zpl_4inch-203dpi-dt"), DriverFamily::Zpl);
    }

    #[test]
    fn unknown_prefix_falls_back_to_zpl() {
        assert_eq!(DriverFamily::from_keyword("acme_widget"), DriverFamily::Zpl);
        // Prefix must include the underscore.
        assert_eq!(DriverFamily::from_keyword("dymolw-450"), DriverFamily::Zpl);
    }

    #[test]
    fn keyword_parsing() {
        assert_eq!(head_width_inches("zpl_4inch-300dpi-tt"), Some(4));
        assert_eq!(keyword_dpi("zpl_4inch-300dpi-tt"), Some(300));
        assert_eq!(keyword_dpi("pcl_generic"), None);
    }

    #[test]
    fn zpl_uses_keyword_resolution() {
        let desc = build("zpl_2inch-300dpi-tt");
        assert_eq!(desc.resolutions, vec![Resolution::square(300)]);
        assert_eq!(desc.partition_media().roll_max, Some(ROLL_MAX_2INCH));
        assert!(desc.types.contains(&"labels-continuous".to_string()));
    }

    #[test]
    fn dymo_tape_and_label_models_differ() {
        let tape = build("dymo_lm-450");
        assert_eq!(tape.resolutions, vec![Resolution::square(180)]);
        assert_eq!(tape.types, vec!["continuous".to_string()]);

        let labels = build("dymo_lw-450-twin-turbo");
        assert_eq!(labels.resolutions.len(), 2);
        assert_eq!(labels.sources, vec!["main-roll".to_string(), "alternate-roll".to_string()]);
    }

    #[test]
    fn dymo_4xl_has_wide_roll() {
        let desc = build("dymo_lw-4xl");
        let p = desc.partition_media();
        assert_eq!(p.roll_range(), Some(("roll_min_0.25x0.25in", "roll_max_4.16x3600in")));
        assert!(p.fixed.contains(&"oe_4xl-shipping-label_4x6in"));
        // Exactly one roll_max survives.
        let maxes = desc.media_keywords().iter().filter(|k| k.starts_with("roll_max_")).count();
        assert_eq!(maxes, 1);
    }

    #[test]
    fn fgl_has_no_sources() {
        let desc = build("fgl_46-300dpi");
        assert!(desc.sources.is_empty());
        assert!(desc.partition_media().roll_range().is_none());
    }

    #[test]
    fn every_family_ships_resolvable_media() {
        for keyword in [
            "cpcl_4inch-203dpi",
            "dymo_lw-450",
            "dymo_lm-pnp",
            "dymo_lw-4xl",
            "epl1_2inch-203dpi",
            "epl2_4inch-203dpi-tt",
            "fgl_26-200dpi",
            "pcl_generic",
            "zpl_4inch-600dpi-tt",
        ] {
            let desc = build(keyword);
            assert!(!desc.resolutions.is_empty(), "{keyword}");
            for media in desc.media_keywords() {
                assert!(PwgMediaDatabase.resolve(media).is_ok(), "{keyword}: {media}");
            }
        }
    }
}
