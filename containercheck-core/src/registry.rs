// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The inspector registry: extension-then-magic-byte routing to a format inspector.
//!
//! The registry is initialized once with a list of inspectors and never mutates
//! during inspection; every `inspect` call is a pure function of the registry's
//! (fixed) inspector list, the file bytes, and the requested depth.

use std::path::Path;

use crate::diagnostic::ContainerReport;

/// Controls how much of the file an inspection examines, per the frame-selection
/// policy used by the NAL walker and analogous cross-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    Quick,
    #[default]
    Standard,
    Thorough,
}

/// The capability set a format inspector must implement: advertised extensions, a
/// cheap magic-byte probe, and the full inspection entry point.
pub trait Inspector: Send + Sync {
    /// Lowercased extensions (without the leading dot) this inspector generally
    /// handles, e.g. `["mp4", "mov", "m4v", "3gp"]`.
    fn supported_extensions(&self) -> &'static [&'static str];

    /// A cheap probe that may read at most the first 16 bytes of `data`. Must not
    /// panic or read past `data`'s end regardless of `data`'s length.
    fn can_inspect(&self, data: &[u8]) -> bool;

    /// Performs a full inspection of `data` at the requested `depth`.
    fn inspect(&self, data: &[u8], depth: Depth) -> ContainerReport;
}

/// Holds a fixed list of inspectors and routes a file to the first one that claims
/// it: first by extension, then by magic-byte probe over inspectors whose extension
/// list did not match (or when no extension is available at all).
#[derive(Default)]
pub struct Registry {
    inspectors: Vec<Box<dyn Inspector>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry { inspectors: Vec::new() }
    }

    pub fn register(&mut self, inspector: Box<dyn Inspector>) {
        self.inspectors.push(inspector);
    }

    /// Routes `path`/`data` to an inspector and runs a full inspection, or returns
    /// `None` if no registered inspector claims the file.
    pub fn inspect(&self, path: &Path, data: &[u8], depth: Depth) -> Option<ContainerReport> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        if let Some(ext) = extension.as_deref() {
            if let Some(inspector) =
                self.inspectors.iter().find(|i| i.supported_extensions().contains(&ext))
            {
                log::debug!("routed {:?} to inspector by extension '{}'", path, ext);
                return Some(inspector.inspect(data, depth));
            }
        }

        let inspector = self.inspectors.iter().find(|i| i.can_inspect(data))?;
        log::debug!("routed {:?} to inspector by magic-byte probe", path);
        Some(inspector.inspect(data, depth))
    }
}
