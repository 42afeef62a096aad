// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared primitives for `containercheck` format inspectors: a bounded byte reader, the
//! diagnostic vocabulary every inspector reports through, the inspector registry, and
//! the adapter that exports diagnostics to the host analyzer's generic issue model.
//!
//! An inspection is a pure function from `(file bytes, depth)` to a [`diagnostic::ContainerReport`].
//! There is no shared mutable state between inspections and nothing here performs I/O
//! beyond the initial, optional memory-map in [`io::MappedInput`].

pub mod adapter;
pub mod diagnostic;
pub mod errors;
pub mod io;
pub mod registry;
