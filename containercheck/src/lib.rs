// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # containercheck
//!
//! The container-inspection core of a media-integrity analyzer: format-aware,
//! jump-based parsers that walk the structural scaffolding of ISO Base Media File
//! Format (MP4/MOV/M4V/3GP) and Material eXchange Format (MXF OP1a/OPAtom) containers,
//! emitting a graded [`ContainerReport`][containercheck_core::diagnostic::ContainerReport]
//! without ever decoding compressed essence.
//!
//! # Usage
//!
//! 1. Instantiate a [`Registry`][containercheck_core::registry::Registry], or use
//!    [`default::get_registry`] for one pre-populated with every inspector this crate
//!    ships.
//! 2. Memory-map the file under inspection with
//!    [`MappedInput`][containercheck_core::io::MappedInput], or otherwise obtain a
//!    `&[u8]` view of its bytes.
//! 3. Call [`Registry::inspect`][containercheck_core::registry::Registry::inspect]
//!    with the file's path, bytes, and a [`Depth`][containercheck_core::registry::Depth].
//! 4. Inspect the returned `ContainerReport`, or hand it to
//!    [`adapter::adapt`][containercheck_core::adapter::adapt] to translate it into the
//!    host analyzer's generic issue vocabulary.

pub mod default;

pub use containercheck_core::adapter;
pub use containercheck_core::diagnostic;
pub use containercheck_core::errors;
pub use containercheck_core::io;
pub use containercheck_core::registry;

pub use containercheck_isobmff::IsobmffInspector;
pub use containercheck_mxf::MxfInspector;

/// Extension-point allocation ceilings for the registered inspectors. The core's
/// hard-coded defaults (documented per table/entry in each parser) already satisfy
/// the safety requirement on their own; this struct exists only so a host that knows
/// its own worst-case file shapes can tighten or loosen them without forking a parser.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Maximum entries materialized from any single sample-table (`stco`/`co64`,
    /// `stsc`, `stsz`, `stts`, `ctts`, `stss`) or MXF RIP parse.
    pub max_table_entries: u64,
    /// Maximum ISOBMFF box-tree recursion depth.
    pub max_box_depth: u32,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            max_table_entries: containercheck_isobmff::atoms::MAX_TABLE_ENTRIES,
            max_box_depth: containercheck_isobmff::atoms::DEFAULT_MAX_DEPTH,
        }
    }
}
