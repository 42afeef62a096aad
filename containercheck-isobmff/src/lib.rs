// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ISO Base Media File Format (MP4/MOV/M4V/3GP) structural inspection.
//!
//! This crate parses just enough of an ISOBMFF file's box tree and sample tables to
//! cross-check its internal consistency, without decoding any compressed essence.

pub mod atoms;
pub mod framemap;
pub mod nal;
pub mod validator;

use containercheck_core::registry::{Depth, Inspector};
use containercheck_core::diagnostic::ContainerReport;

/// The `ftyp`/`moov`/`mdat`/`free`/`skip`/`wide` four-character codes a well-formed
/// ISOBMFF file's top level is built from; used only for the magic-byte probe, not
/// for parsing.
const KNOWN_TOP_LEVEL_BOXES: &[[u8; 4]] =
    &[*b"ftyp", *b"moov", *b"mdat", *b"free", *b"skip", *b"wide", *b"moof", *b"styp"];

/// Inspects ISO Base Media File Format containers: MP4, MOV, M4V, and 3GP.
#[derive(Debug, Default)]
pub struct IsobmffInspector;

impl IsobmffInspector {
    pub fn new() -> Self {
        IsobmffInspector
    }
}

impl Inspector for IsobmffInspector {
    fn supported_extensions(&self) -> &'static [&'static str] {
        &["mp4", "mov", "m4v", "3gp"]
    }

    fn can_inspect(&self, data: &[u8]) -> bool {
        if data.len() < 8 {
            return false;
        }
        KNOWN_TOP_LEVEL_BOXES.iter().any(|four_cc| &data[4..8] == four_cc)
    }

    fn inspect(&self, data: &[u8], depth: Depth) -> ContainerReport {
        validator::validate(data, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_expected_extensions() {
        let inspector = IsobmffInspector::new();
        assert_eq!(inspector.supported_extensions(), &["mp4", "mov", "m4v", "3gp"]);
    }

    #[test]
    fn probes_ftyp_magic() {
        let mut data = 16u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"isom");
        data.extend_from_slice(&[0u8; 4]);

        assert!(IsobmffInspector::new().can_inspect(&data));
    }

    #[test]
    fn rejects_short_and_unrecognized_input() {
        let inspector = IsobmffInspector::new();
        assert!(!inspector.can_inspect(b"short"));
        assert!(!inspector.can_inspect(&[0u8; 16]));
    }
}
