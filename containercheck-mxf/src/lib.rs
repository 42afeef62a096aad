// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material eXchange Format (MXF OP1a/OPAtom) structural inspection.
//!
//! This crate walks the partition chain and KLV metadata of an MXF file to cross-check
//! its internal consistency, without decoding any compressed essence.

pub mod ber;
pub mod klv;
pub mod partition;
pub mod rip;
pub mod validator;

use containercheck_core::diagnostic::ContainerReport;
use containercheck_core::registry::{Depth, Inspector};

use crate::partition::PARTITION_PACK_PREFIX;

/// Inspects Material eXchange Format containers.
#[derive(Debug, Default)]
pub struct MxfInspector;

impl MxfInspector {
    pub fn new() -> Self {
        MxfInspector
    }
}

impl Inspector for MxfInspector {
    fn supported_extensions(&self) -> &'static [&'static str] {
        &["mxf"]
    }

    fn can_inspect(&self, data: &[u8]) -> bool {
        data.len() >= 13 && data[0..13] == PARTITION_PACK_PREFIX
    }

    fn inspect(&self, data: &[u8], depth: Depth) -> ContainerReport {
        validator::validate(data, depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advertises_mxf_extension() {
        assert_eq!(MxfInspector::new().supported_extensions(), &["mxf"]);
    }

    #[test]
    fn probes_partition_pack_key_prefix() {
        let mut data = PARTITION_PACK_PREFIX.to_vec();
        data.extend_from_slice(&[0x04, 0x04, 0x00]);
        assert!(MxfInspector::new().can_inspect(&data));
    }

    #[test]
    fn rejects_short_and_unrecognized_input() {
        let inspector = MxfInspector::new();
        assert!(!inspector.can_inspect(b"short"));
        assert!(!inspector.can_inspect(&[0u8; 20]));
    }
}
