// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The common diagnostic vocabulary shared by every inspector: `Diagnostic`,
//! `ContainerReport`, and `ContainerMetadata`. Severity, category, and remediation are
//! closed enumerations; dispatch on them is always by pattern matching.

use std::sync::atomic::{AtomicU64, Ordering};

/// A tagged top-level container family. `MpegTs` is a registered extension point only;
/// no inspector in this workspace claims it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    Isobmff,
    Mxf,
    MpegTs,
    Unknown,
}

/// The kind of structure a diagnostic pertains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    BoxStructure,
    TruncatedAtom,
    MissingAtom,
    SampleTable,
    SyncSampleTable,
    CompositionTime,
    EditList,
    NalStructure,
    IndexTable,
    PartitionStructure,
    EssenceDescriptor,
    ContinuityCounter,
    ProgramTable,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A remediation hint distinguishing a lossless stream-copy fix from one that requires
/// destroying and regenerating essence data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    None,
    Remux,
    Reencode,
}

/// A single, immutable finding. Every field besides `id` is supplied by the validator
/// that raised the diagnostic; `id` is assigned by [`Diagnostic::new`] from a
/// process-local monotonic counter purely to give each instance a stable identity
/// within one run — it has no meaning across runs or processes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    id: u64,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub detail: String,
    pub offset: Option<u64>,
    pub remediation: Remediation,
    pub player_note: Option<String>,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl Diagnostic {
    pub fn new(
        category: Category,
        severity: Severity,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Diagnostic {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            category,
            severity,
            title: title.into(),
            detail: detail.into(),
            offset: None,
            remediation: Remediation::None,
            player_note: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_remediation(mut self, remediation: Remediation) -> Self {
        self.remediation = remediation;
        self
    }

    pub fn with_player_note(mut self, note: impl Into<String>) -> Self {
        self.player_note = Some(note.into());
        self
    }

    pub fn info(category: Category, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Diagnostic::new(category, Severity::Info, title, detail)
    }

    pub fn warning(
        category: Category,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Diagnostic::new(category, Severity::Warning, title, detail)
    }

    pub fn error(category: Category, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Diagnostic::new(category, Severity::Error, title, detail)
    }
}

/// A per-track edit list summary carried in [`ContainerMetadata`].
#[derive(Debug, Clone, Default)]
pub struct TrackEditList {
    pub track_id: u32,
    pub entry_count: usize,
}

/// A coarse box-tree summary: one entry per top-level box.
#[derive(Debug, Clone)]
pub struct BoxSummary {
    pub four_cc: [u8; 4],
    pub offset: u64,
    pub size: u64,
}

/// The structured metadata summary accompanying a [`ContainerReport`]. Every field is
/// optional: an MXF report never populates `box_tree`, and an ISOBMFF report never
/// populates the MXF-only fields.
#[derive(Debug, Clone, Default)]
pub struct ContainerMetadata {
    pub box_tree: Option<Vec<BoxSummary>>,
    pub edit_lists: Vec<TrackEditList>,
    pub keyframe_counts: Vec<(u32, usize)>,
    pub mxf_partition_labels: Vec<String>,
    pub mxf_operational_pattern: Option<String>,
}

/// The result of inspecting one file: a container type tag, an ordered diagnostic
/// list, and a metadata summary. Produced once per inspection and never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct ContainerReport {
    pub container_type: ContainerType,
    pub diagnostics: Vec<Diagnostic>,
    pub metadata: ContainerMetadata,
}

impl ContainerReport {
    pub fn new(container_type: ContainerType) -> Self {
        ContainerReport {
            container_type,
            diagnostics: Vec::new(),
            metadata: ContainerMetadata::default(),
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Warning)
    }

    /// True when every diagnostic in the report is fixable by a lossless remux (i.e.
    /// none require re-encoding essence).
    pub fn is_remux_fixable(&self) -> bool {
        self.diagnostics
            .iter()
            .all(|d| matches!(d.remediation, Remediation::None | Remediation::Remux))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remux_fixable_is_false_when_any_diagnostic_needs_reencode() {
        let mut report = ContainerReport::new(ContainerType::Isobmff);
        report.push(Diagnostic::warning(Category::BoxStructure, "a", "b"));
        assert!(report.is_remux_fixable());

        report.push(
            Diagnostic::error(Category::SampleTable, "c", "d")
                .with_remediation(Remediation::Reencode),
        );
        assert!(!report.is_remux_fixable());
    }

    #[test]
    fn diagnostic_ids_are_unique_and_monotonic() {
        let a = Diagnostic::info(Category::Other, "a", "b");
        let b = Diagnostic::info(Category::Other, "c", "d");
        assert!(b.id() > a.id());
    }
}
