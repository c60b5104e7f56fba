// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed IPP attribute store.
//
// An `AttributeStore` is an ordered list of named, tagged, multi-valued
// attributes.  The same type doubles as a collection value, so media-col
// entries nest naturally.  The store can render itself in the binary
// attribute syntax of RFC 8010 SS3.1 for Get-Printer-Attributes responses.
//
// Replace semantics: `replace` deletes every attribute with the given name,
// whatever its tag, before appending the new one.  Names never accumulate.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use labelwerk_core::types::Resolution;

// ---------------------------------------------------------------------------
// IPP value tags (RFC 8010 SS3.5.2)
// ---------------------------------------------------------------------------

const VALUE_TAG_INTEGER: u8 = 0x21;
const VALUE_TAG_RESOLUTION: u8 = 0x32;
const VALUE_TAG_RANGE_OF_INTEGER: u8 = 0x33;
const VALUE_TAG_BEGIN_COLLECTION: u8 = 0x34;
const VALUE_TAG_END_COLLECTION: u8 = 0x37;
const VALUE_TAG_TEXT: u8 = 0x41;
const VALUE_TAG_NAME: u8 = 0x42;
const VALUE_TAG_KEYWORD: u8 = 0x44;
const VALUE_TAG_CHARSET: u8 = 0x47;
const VALUE_TAG_NATURAL_LANGUAGE: u8 = 0x48;
const VALUE_TAG_MEMBER_ATTR_NAME: u8 = 0x4A;

/// `units` byte for dots-per-inch resolutions (RFC 8011 SS5.1.16).
const RESOLUTION_UNITS_PER_INCH: u8 = 3;

/// Names and values carry a two-byte length on the wire.
pub const MAX_WIRE_LEN: usize = u16::MAX as usize;

/// The syntax of an attribute's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueTag {
    Integer,
    Resolution,
    RangeOfInteger,
    BeginCollection,
    Text,
    Name,
    Keyword,
    Charset,
    NaturalLanguage,
}

impl ValueTag {
    /// Wire value of this tag.
    pub fn wire(self) -> u8 {
        match self {
            Self::Integer => VALUE_TAG_INTEGER,
            Self::Resolution => VALUE_TAG_RESOLUTION,
            Self::RangeOfInteger => VALUE_TAG_RANGE_OF_INTEGER,
            Self::BeginCollection => VALUE_TAG_BEGIN_COLLECTION,
            Self::Text => VALUE_TAG_TEXT,
            Self::Name => VALUE_TAG_NAME,
            Self::Keyword => VALUE_TAG_KEYWORD,
            Self::Charset => VALUE_TAG_CHARSET,
            Self::NaturalLanguage => VALUE_TAG_NATURAL_LANGUAGE,
        }
    }

    /// Whether values with this tag are carried as strings.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Name
                | Self::Keyword
                | Self::Charset
                | Self::NaturalLanguage
        )
    }
}

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Integer(i32),
    String(String),
    Range { min: i32, max: i32 },
    Resolution(Resolution),
    Collection(AttributeStore),
}

impl AttrValue {
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<(i32, i32)> {
        match self {
            Self::Range { min, max } => Some((*min, *max)),
            _ => None,
        }
    }

    pub fn as_resolution(&self) -> Option<Resolution> {
        match self {
            Self::Resolution(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&AttributeStore> {
        match self {
            Self::Collection(c) => Some(c),
            _ => None,
        }
    }
}

impl Serialize for AttrValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(v) => serializer.serialize_i32(*v),
            Self::String(s) => serializer.serialize_str(s),
            Self::Range { min, max } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("min", min)?;
                map.serialize_entry("max", max)?;
                map.end()
            }
            Self::Resolution(r) => serializer.serialize_str(&format!("{}x{}dpi", r.x, r.y)),
            Self::Collection(c) => c.serialize(serializer),
        }
    }
}

/// A named, tagged attribute with one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub tag: ValueTag,
    pub values: Vec<AttrValue>,
}

impl Attribute {
    /// Names and string values longer than [`MAX_WIRE_LEN`] bytes are cut
    /// back to the last character boundary that fits.
    pub fn new(name: impl Into<String>, tag: ValueTag, values: Vec<AttrValue>) -> Self {
        let values = values
            .into_iter()
            .map(|v| match v {
                AttrValue::String(s) => AttrValue::String(clamp_to_wire(s)),
                other => other,
            })
            .collect();
        Self {
            name: clamp_to_wire(name.into()),
            tag,
            values,
        }
    }

    /// First value, if any.
    pub fn first(&self) -> Option<&AttrValue> {
        self.values.first()
    }

    /// All string values (empty for non-string attributes).
    pub fn strings(&self) -> Vec<&str> {
        self.values.iter().filter_map(AttrValue::as_str).collect()
    }

    /// All collection values (empty for non-collection attributes).
    pub fn collections(&self) -> Vec<&AttributeStore> {
        self.values.iter().filter_map(AttrValue::as_collection).collect()
    }
}

// ---------------------------------------------------------------------------
// AttributeStore
// ---------------------------------------------------------------------------

/// Ordered set of IPP attributes; also used as a collection value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStore {
    attrs: Vec<Attribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    /// Attribute names in store order.
    pub fn names(&self) -> Vec<&str> {
        self.attrs.iter().map(|a| a.name.as_str()).collect()
    }

    /// Copy of the attributes whose names appear in `names`, in store order.
    /// An empty filter or one containing `all` selects everything.
    pub fn select(&self, names: &[&str]) -> AttributeStore {
        if names.is_empty() || names.contains(&"all") {
            return self.clone();
        }
        AttributeStore {
            attrs: self
                .attrs
                .iter()
                .filter(|a| names.contains(&a.name.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// First attribute with the given name, whatever its tag.
    pub fn find(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name)
    }

    /// First attribute matching both name and tag.
    pub fn find_by_name_and_tag(&self, name: &str, tag: ValueTag) -> Option<&Attribute> {
        self.attrs.iter().find(|a| a.name == name && a.tag == tag)
    }

    /// Delete the first attribute matching name and tag, returning it.
    pub fn delete_entry(&mut self, name: &str, tag: ValueTag) -> Option<Attribute> {
        let pos = self
            .attrs
            .iter()
            .position(|a| a.name == name && a.tag == tag)?;
        Some(self.attrs.remove(pos))
    }

    /// Delete every attribute with the given name.  Returns how many went.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name != name);
        before - self.attrs.len()
    }

    /// Delete any attribute named like `attr`, then append `attr`.
    pub fn replace(&mut self, attr: Attribute) -> &mut Self {
        self.remove(&attr.name);
        self.attrs.push(attr);
        self
    }

    /// Append an attribute without touching existing ones.
    pub fn push(&mut self, attr: Attribute) -> &mut Self {
        self.attrs.push(attr);
        self
    }

    pub fn add_string(&mut self, name: &str, tag: ValueTag, value: &str) -> &mut Self {
        debug_assert!(tag.is_string());
        self.push(Attribute::new(
            name,
            tag,
            vec![AttrValue::String(value.to_string())],
        ))
    }

    pub fn add_strings<I, S>(&mut self, name: &str, tag: ValueTag, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        debug_assert!(tag.is_string());
        let values = values
            .into_iter()
            .map(|v| AttrValue::String(v.into()))
            .collect();
        self.push(Attribute::new(name, tag, values))
    }

    pub fn add_integer(&mut self, name: &str, value: i32) -> &mut Self {
        self.push(Attribute::new(
            name,
            ValueTag::Integer,
            vec![AttrValue::Integer(value)],
        ))
    }

    pub fn add_range(&mut self, name: &str, min: i32, max: i32) -> &mut Self {
        self.push(Attribute::new(
            name,
            ValueTag::RangeOfInteger,
            vec![AttrValue::Range { min, max }],
        ))
    }

    pub fn add_resolution(&mut self, name: &str, resolution: Resolution) -> &mut Self {
        self.push(Attribute::new(
            name,
            ValueTag::Resolution,
            vec![AttrValue::Resolution(resolution)],
        ))
    }

    pub fn add_resolutions(&mut self, name: &str, resolutions: &[Resolution]) -> &mut Self {
        let values = resolutions.iter().copied().map(AttrValue::Resolution).collect();
        self.push(Attribute::new(name, ValueTag::Resolution, values))
    }

    pub fn add_collection(&mut self, name: &str, collection: AttributeStore) -> &mut Self {
        self.push(Attribute::new(
            name,
            ValueTag::BeginCollection,
            vec![AttrValue::Collection(collection)],
        ))
    }

    pub fn add_collections(&mut self, name: &str, collections: Vec<AttributeStore>) -> &mut Self {
        let values = collections.into_iter().map(AttrValue::Collection).collect();
        self.push(Attribute::new(name, ValueTag::BeginCollection, values))
    }

    /// Overwrite (or append, when `index` equals the current length) one
    /// value of a collection attribute.  Returns `false` if there is no such
    /// collection attribute or the index is out of range.
    pub fn set_collection_at(
        &mut self,
        name: &str,
        index: usize,
        collection: AttributeStore,
    ) -> bool {
        let Some(attr) = self
            .attrs
            .iter_mut()
            .find(|a| a.name == name && a.tag == ValueTag::BeginCollection)
        else {
            return false;
        };

        match index.cmp(&attr.values.len()) {
            std::cmp::Ordering::Less => {
                attr.values[index] = AttrValue::Collection(collection);
                true
            }
            std::cmp::Ordering::Equal => {
                attr.values.push(AttrValue::Collection(collection));
                true
            }
            std::cmp::Ordering::Greater => false,
        }
    }

    // -- Wire encoding ------------------------------------------------------

    /// Append every attribute in RFC 8010 binary syntax to `buf`.
    ///
    /// Group delimiters are the caller's concern.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        for attr in &self.attrs {
            for (i, value) in attr.values.iter().enumerate() {
                // Additional values of a 1setOf carry name-length = 0.
                let name = if i == 0 { attr.name.as_str() } else { "" };
                write_value(buf, attr.tag, name, value);
            }
        }
    }

    /// Encoded bytes of the whole store.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);
        self.encode(&mut buf);
        buf
    }

    /// SHA-256 of the encoded store, hex-encoded.
    ///
    /// Two stores with the same fingerprint have byte-identical wire forms.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.to_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Serialize for AttributeStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attrs.len()))?;
        for attr in &self.attrs {
            map.serialize_entry(&attr.name, &ValuesRef(&attr.values))?;
        }
        map.end()
    }
}

/// Single values serialize bare; 1setOf serializes as an array.
struct ValuesRef<'a>(&'a [AttrValue]);

impl Serialize for ValuesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if let [single] = self.0 {
            return single.serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in self.0 {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

// ---------------------------------------------------------------------------
// Binary writer
// ---------------------------------------------------------------------------

/// Write one value: value-tag, name-length, name, value-length, value.
fn write_value(buf: &mut Vec<u8>, tag: ValueTag, name: &str, value: &AttrValue) {
    match value {
        AttrValue::Integer(v) => write_raw(buf, tag.wire(), name, &v.to_be_bytes()),
        AttrValue::String(s) => write_raw(buf, tag.wire(), name, s.as_bytes()),
        AttrValue::Range { min, max } => {
            let mut bytes = [0u8; 8];
            bytes[..4].copy_from_slice(&min.to_be_bytes());
            bytes[4..].copy_from_slice(&max.to_be_bytes());
            write_raw(buf, VALUE_TAG_RANGE_OF_INTEGER, name, &bytes);
        }
        AttrValue::Resolution(r) => {
            let mut bytes = [0u8; 9];
            bytes[..4].copy_from_slice(&r.x.to_be_bytes());
            bytes[4..8].copy_from_slice(&r.y.to_be_bytes());
            bytes[8] = RESOLUTION_UNITS_PER_INCH;
            write_raw(buf, VALUE_TAG_RESOLUTION, name, &bytes);
        }
        AttrValue::Collection(members) => {
            // RFC 8010 SS3.1.6: begCollection, then memberAttrName/value
            // pairs with empty names, then endCollection.
            write_raw(buf, VALUE_TAG_BEGIN_COLLECTION, name, &[]);
            for member in &members.attrs {
                write_raw(buf, VALUE_TAG_MEMBER_ATTR_NAME, "", member.name.as_bytes());
                for member_value in &member.values {
                    write_value(buf, member.tag, "", member_value);
                }
            }
            write_raw(buf, VALUE_TAG_END_COLLECTION, "", &[]);
        }
    }
}

fn clamp_to_wire(mut s: String) -> String {
    if s.len() > MAX_WIRE_LEN {
        let mut end = MAX_WIRE_LEN;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}

fn write_raw(buf: &mut Vec<u8>, value_tag: u8, name: &str, value: &[u8]) {
    debug_assert!(name.len() <= MAX_WIRE_LEN && value.len() <= MAX_WIRE_LEN);
    buf.push(value_tag);
    let name_bytes = name.as_bytes();
    buf.extend_from_slice(&(name_bytes.len() as u16).to_be_bytes());
    buf.extend_from_slice(name_bytes);
    buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
    buf.extend_from_slice(value);
}
