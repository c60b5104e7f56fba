// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability synthesis: descriptor → printer attributes.
//
// Rewrites every negotiable capability attribute a driver controls.  Each
// write replaces any earlier attribute of the same name, so re-running with
// the same descriptor yields byte-identical attributes.
//
// All media lookups happen before the first write: an unresolvable media
// keyword fails the whole synthesis and leaves the store untouched.

use tracing::{debug, instrument};

use labelwerk_core::error::Result;
use labelwerk_core::types::{Margins, Resolution};

use crate::attributes::{AttrValue, Attribute, AttributeStore, ValueTag};
use crate::descriptor::{CapabilityDescriptor, MediaPartition};
use crate::media::MediaLookup;

/// First `urf-supported` token: Apple raster version.
pub const URF_VERSION: &str = "V1.4";

/// Second `urf-supported` token: 8-bit grayscale.
pub const URF_BIT_DEPTH: &str = "W8";

// Published attribute names.
pub const ATTR_MAKE_AND_MODEL: &str = "printer-make-and-model";
pub const ATTR_RESOLUTION_DEFAULT: &str = "printer-resolution-default";
pub const ATTR_RESOLUTION_SUPPORTED: &str = "printer-resolution-supported";
pub const ATTR_PWG_RASTER_RESOLUTION: &str = "pwg-raster-document-resolution-supported";
pub const ATTR_URF_SUPPORTED: &str = "urf-supported";
pub const ATTR_BOTTOM_MARGIN: &str = "media-bottom-margin-supported";
pub const ATTR_TOP_MARGIN: &str = "media-top-margin-supported";
pub const ATTR_LEFT_MARGIN: &str = "media-left-margin-supported";
pub const ATTR_RIGHT_MARGIN: &str = "media-right-margin-supported";
pub const ATTR_MEDIA_SUPPORTED: &str = "media-supported";
pub const ATTR_MEDIA_SIZE_SUPPORTED: &str = "media-size-supported";
pub const ATTR_MEDIA_COL_DATABASE: &str = "media-col-database";
pub const ATTR_MEDIA_SOURCE_SUPPORTED: &str = "media-source-supported";
pub const ATTR_MEDIA_TYPE_SUPPORTED: &str = "media-type-supported";

/// Writes a descriptor's capabilities into a printer's attribute store.
#[derive(Debug, Clone, Copy)]
pub struct CapabilitySynthesizer<'a, M> {
    media: &'a M,
}

impl<'a, M: MediaLookup> CapabilitySynthesizer<'a, M> {
    pub fn new(media: &'a M) -> Self {
        Self { media }
    }

    /// Replace every capability attribute in `attrs` from `desc`.
    #[instrument(skip_all, fields(driver = %desc.name))]
    pub fn apply(
        &self,
        attrs: &mut AttributeStore,
        desc: &CapabilityDescriptor,
        make_and_model: &str,
    ) -> Result<()> {
        // Fallible work first.
        let partition = desc.partition_media();
        let sizes = media_size_collections(&partition, self.media)?;
        let cols = media_col_collections(&partition, desc.margins, self.media)?;

        attrs.replace(Attribute::new(
            ATTR_MAKE_AND_MODEL,
            ValueTag::Text,
            vec![AttrValue::String(make_and_model.to_string())],
        ));

        write_resolutions(attrs, &desc.resolutions);
        write_margins(attrs, desc.margins);

        attrs.replace(Attribute::new(
            ATTR_MEDIA_SUPPORTED,
            ValueTag::Keyword,
            desc.media_keywords()
                .into_iter()
                .map(|k| AttrValue::String(k.to_string()))
                .collect(),
        ));
        attrs.replace(collections_attr(ATTR_MEDIA_SIZE_SUPPORTED, sizes));
        attrs.replace(collections_attr(ATTR_MEDIA_COL_DATABASE, cols));

        write_optional_keywords(attrs, ATTR_MEDIA_SOURCE_SUPPORTED, &desc.sources);
        write_optional_keywords(attrs, ATTR_MEDIA_TYPE_SUPPORTED, &desc.types);

        debug!(
            resolutions = desc.resolutions.len(),
            media = desc.media.len(),
            sizes = partition.output_count(),
            roll_range = partition.roll_range().is_some(),
            "capabilities synthesized"
        );
        Ok(())
    }
}

/// The `RS` token of `urf-supported`: the single x-resolution, or the two
/// highest x-resolutions lowest-first.
pub fn urf_resolution_token(resolutions: &[Resolution]) -> Option<String> {
    match resolutions {
        [] => None,
        [only] => Some(format!("RS{}", only.x)),
        [.., lower, highest] => Some(format!("RS{}-{}", lower.x, highest.x)),
    }
}

/// `media-size` collection for a fixed size: integer x/y dimensions.
pub fn media_size<M: MediaLookup + ?Sized>(size_name: &str, lookup: &M) -> Result<AttributeStore> {
    let size = lookup.resolve(size_name)?;
    let mut col = AttributeStore::new();
    col.add_integer("x-dimension", size.width)
        .add_integer("y-dimension", size.length);
    Ok(col)
}

/// `media-size` collection for a roll: x/y dimension ranges spanning the
/// minimum and maximum sizes.
pub fn media_size_range<M: MediaLookup + ?Sized>(
    min_name: &str,
    max_name: &str,
    lookup: &M,
) -> Result<AttributeStore> {
    let min = lookup.resolve(min_name)?;
    let max = lookup.resolve(max_name)?;
    let mut col = AttributeStore::new();
    col.add_range("x-dimension", min.width, max.width)
        .add_range("y-dimension", min.length, max.length);
    Ok(col)
}

/// A full `media-col` value for one size, with optional source and type.
pub fn media_col<M: MediaLookup + ?Sized>(
    size_name: &str,
    source: Option<&str>,
    media_type: Option<&str>,
    margins: Margins,
    lookup: &M,
) -> Result<AttributeStore> {
    let size = media_size(size_name, lookup)?;

    let mut col = AttributeStore::new();
    col.add_string("media-size-name", ValueTag::Keyword, size_name)
        .add_collection("media-size", size)
        .add_integer("media-bottom-margin", margins.bottom_top)
        .add_integer("media-left-margin", margins.left_right)
        .add_integer("media-right-margin", margins.left_right)
        .add_integer("media-top-margin", margins.bottom_top);

    if let Some(source) = source {
        col.add_string("media-source", ValueTag::Keyword, source);
    }
    if let Some(media_type) = media_type {
        col.add_string("media-type", ValueTag::Keyword, media_type);
    }
    Ok(col)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// `media-size-supported` values: fixed sizes, then the roll range.
fn media_size_collections<M: MediaLookup>(
    partition: &MediaPartition<'_>,
    lookup: &M,
) -> Result<Vec<AttributeStore>> {
    let mut out = Vec::with_capacity(partition.output_count());
    for name in &partition.fixed {
        out.push(media_size(name, lookup)?);
    }
    if let Some((min, max)) = partition.roll_range() {
        out.push(media_size_range(min, max, lookup)?);
    }
    Ok(out)
}

/// `media-col-database` values: a media-col per fixed size, then a
/// size-only entry for the roll range.
fn media_col_collections<M: MediaLookup>(
    partition: &MediaPartition<'_>,
    margins: Margins,
    lookup: &M,
) -> Result<Vec<AttributeStore>> {
    let mut out = Vec::with_capacity(partition.output_count());
    for name in &partition.fixed {
        out.push(media_col(name, None, None, margins, lookup)?);
    }
    if let Some((min, max)) = partition.roll_range() {
        let mut col = AttributeStore::new();
        col.add_collection("media-size", media_size_range(min, max, lookup)?);
        out.push(col);
    }
    Ok(out)
}

fn collections_attr(name: &str, collections: Vec<AttributeStore>) -> Attribute {
    Attribute::new(
        name,
        ValueTag::BeginCollection,
        collections.into_iter().map(AttrValue::Collection).collect(),
    )
}

fn write_resolutions(attrs: &mut AttributeStore, resolutions: &[Resolution]) {
    attrs.remove(ATTR_RESOLUTION_DEFAULT);
    attrs.remove(ATTR_RESOLUTION_SUPPORTED);
    attrs.remove(ATTR_PWG_RASTER_RESOLUTION);
    attrs.remove(ATTR_URF_SUPPORTED);

    let (Some(default), Some(rs)) = (resolutions.last(), urf_resolution_token(resolutions)) else {
        return;
    };

    attrs
        .add_resolution(ATTR_RESOLUTION_DEFAULT, *default)
        .add_resolutions(ATTR_RESOLUTION_SUPPORTED, resolutions)
        .add_resolutions(ATTR_PWG_RASTER_RESOLUTION, resolutions)
        .add_strings(
            ATTR_URF_SUPPORTED,
            ValueTag::Keyword,
            [URF_VERSION.to_string(), URF_BIT_DEPTH.to_string(), rs],
        );
}

fn write_margins(attrs: &mut AttributeStore, margins: Margins) {
    for (name, value) in [
        (ATTR_BOTTOM_MARGIN, margins.bottom_top),
        (ATTR_LEFT_MARGIN, margins.left_right),
        (ATTR_RIGHT_MARGIN, margins.left_right),
        (ATTR_TOP_MARGIN, margins.bottom_top),
    ] {
        attrs.remove(name);
        attrs.add_integer(name, value);
    }
}

/// Keyword list, or no attribute at all when `values` is empty.
fn write_optional_keywords(attrs: &mut AttributeStore, name: &str, values: &[String]) {
    attrs.remove(name);
    if !values.is_empty() {
        attrs.add_strings(name, ValueTag::Keyword, values.iter().cloned());
    }
}
