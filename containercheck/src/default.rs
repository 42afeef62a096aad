// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pre-populated defaults, analogous to a media framework's `default::get_probe`: a
//! single call wires up every inspector this crate ships so a host does not have to
//! enumerate them by hand.

use containercheck_core::registry::Registry;
use containercheck_isobmff::IsobmffInspector;
use containercheck_mxf::MxfInspector;

/// Returns a [`Registry`] with the ISOBMFF and MXF inspectors registered.
pub fn get_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(IsobmffInspector::new()));
    registry.register(Box::new(MxfInspector::new()));
    registry
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use containercheck_core::registry::Depth;

    #[test]
    fn registry_routes_isobmff_by_magic() {
        let registry = get_registry();
        let mut data = 16u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(b"isom");

        let report = registry.inspect(Path::new("unknown"), &data, Depth::Standard);
        assert!(report.is_some());
    }

    #[test]
    fn registry_returns_none_for_unrecognized_input() {
        let registry = get_registry();
        assert!(registry.inspect(Path::new("unknown"), &[0u8; 32], Depth::Standard).is_none());
    }
}
