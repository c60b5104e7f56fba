// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Get-Printer-Attributes response framing (RFC 8010 SS3.1.1).
//
// A response is the version-number, status-code and request-id header,
// followed by delimited attribute groups and the end-of-attributes tag.
// Attribute bodies come from an `AttributeStore`, which already knows the
// value encoding.

use crate::attributes::{AttributeStore, ValueTag};

/// IPP version 1.1 major byte.
pub const IPP_VERSION_MAJOR: u8 = 0x01;

/// IPP version 1.1 minor byte.
pub const IPP_VERSION_MINOR: u8 = 0x01;

/// Operation attributes group delimiter.
pub const TAG_OPERATION_ATTRIBUTES: u8 = 0x01;

/// End-of-attributes-tag -- terminates the attribute section.
pub const TAG_END_OF_ATTRIBUTES: u8 = 0x03;

/// Printer attributes group delimiter.
pub const TAG_PRINTER_ATTRIBUTES: u8 = 0x04;

/// successful-ok.
pub const STATUS_OK: u16 = 0x0000;

/// Builder for a binary IPP response.
pub struct IppResponseBuilder {
    buf: Vec<u8>,
}

impl IppResponseBuilder {
    /// Start a response with the given status code and echoed request-id.
    pub fn new(status_code: u16, request_id: u32) -> Self {
        let mut buf = Vec::with_capacity(512);
        buf.push(IPP_VERSION_MAJOR);
        buf.push(IPP_VERSION_MINOR);
        buf.extend_from_slice(&status_code.to_be_bytes());
        buf.extend_from_slice(&request_id.to_be_bytes());
        Self { buf }
    }

    /// Start a new attribute group.
    pub fn begin_group(&mut self, delimiter: u8) -> &mut Self {
        self.buf.push(delimiter);
        self
    }

    /// The operation attributes every response carries.
    pub fn operation_attributes(&mut self, status_message: &str) -> &mut Self {
        let mut op = AttributeStore::new();
        op.add_string("attributes-charset", ValueTag::Charset, "utf-8")
            .add_string("attributes-natural-language", ValueTag::NaturalLanguage, "en")
            .add_string("status-message", ValueTag::Text, status_message);
        self.begin_group(TAG_OPERATION_ATTRIBUTES).attributes(&op)
    }

    /// Append every attribute of `store` to the current group.
    pub fn attributes(&mut self, store: &AttributeStore) -> &mut Self {
        store.encode(&mut self.buf);
        self
    }

    /// Write end-of-attributes and return the bytes.
    pub fn build(mut self) -> Vec<u8> {
        self.buf.push(TAG_END_OF_ATTRIBUTES);
        self.buf
    }
}

/// A complete successful Get-Printer-Attributes response for `printer_attrs`.
pub fn printer_attributes_response(request_id: u32, printer_attrs: &AttributeStore) -> Vec<u8> {
    let mut resp = IppResponseBuilder::new(STATUS_OK, request_id);
    resp.operation_attributes("successful-ok")
        .begin_group(TAG_PRINTER_ATTRIBUTES)
        .attributes(printer_attrs);
    resp.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_trailer() {
        let bytes = IppResponseBuilder::new(STATUS_OK, 0x0102_0304).build();
        assert_eq!(bytes, vec![0x01, 0x01, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x03]);
    }

    #[test]
    fn printer_group_follows_operation_group() {
        let mut attrs = AttributeStore::new();
        attrs.add_string("printer-name", ValueTag::Name, "front-desk");

        let bytes = printer_attributes_response(7, &attrs);
        assert_eq!(&bytes[4..8], &7u32.to_be_bytes());
        assert_eq!(bytes[8], TAG_OPERATION_ATTRIBUTES);
        assert_eq!(*bytes.last().unwrap(), TAG_END_OF_ATTRIBUTES);

        let printer_group = bytes
            .iter()
            .position(|&b| b == TAG_PRINTER_ATTRIBUTES)
            .unwrap();
        assert_eq!(&bytes[printer_group + 1..bytes.len() - 1], attrs.to_bytes().as_slice());
    }

    #[test]
    fn operation_attributes_carry_charset() {
        let mut resp = IppResponseBuilder::new(STATUS_OK, 1);
        resp.operation_attributes("successful-ok");
        let bytes = resp.build();

        // tag, then "attributes-charset" with a two-byte length prefix.
        assert_eq!(bytes[9], 0x47);
        assert_eq!(&bytes[10..12], &18u16.to_be_bytes());
        assert_eq!(&bytes[12..30], b"attributes-charset");
    }
}
