// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The external adapter: translates each [`Diagnostic`] into the analyzer's generic
//! [`MediaIssue`] vocabulary and correlates container warnings with downstream decode
//! failures on the same file.

use crate::diagnostic::{Category, ContainerReport, Diagnostic, Remediation, Severity};

/// The generic issue vocabulary consumed by the analyzer outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueType {
    DecodeError,
    TimestampGap,
    Truncation,
    MissingTrack,
    CorruptHeader,
    UnsupportedCodec,
    ContainerStructure,
    ContainerMetadata,
    Other,
}

/// A single downstream decode failure report, supplied by the decode engine the core
/// does not itself invoke. Used only for the escalation rule below.
#[derive(Debug, Clone, Copy)]
pub struct DecodeFailure {
    pub severity: Severity,
}

/// A generic issue as seen by the analyzer, produced from exactly one [`Diagnostic`].
#[derive(Debug, Clone)]
pub struct MediaIssue {
    pub issue_type: IssueType,
    pub severity: Severity,
    pub timestamp: Option<u64>,
    pub frame_number: Option<u64>,
    pub description: String,
    source_diagnostic_id: u64,
}

impl MediaIssue {
    pub fn source_diagnostic_id(&self) -> u64 {
        self.source_diagnostic_id
    }
}

/// Maps a diagnostic category to the generic issue type, per the fixed category→
/// issue-type map: structural categories map to `ContainerStructure`, metadata
/// categories map to `ContainerMetadata`, everything else maps to `Other`.
fn issue_type_for(category: Category) -> IssueType {
    match category {
        Category::BoxStructure
        | Category::TruncatedAtom
        | Category::MissingAtom
        | Category::PartitionStructure
        | Category::NalStructure => IssueType::ContainerStructure,

        Category::SampleTable
        | Category::SyncSampleTable
        | Category::CompositionTime
        | Category::EditList
        | Category::IndexTable
        | Category::EssenceDescriptor
        | Category::ContinuityCounter
        | Category::ProgramTable => IssueType::ContainerMetadata,

        Category::Other => IssueType::Other,
    }
}

fn describe(diagnostic: &Diagnostic) -> String {
    let mut description = format!("{}: {}", diagnostic.title, diagnostic.detail);

    match diagnostic.remediation {
        Remediation::None => {}
        Remediation::Remux => description.push_str(" [remediation: remux]"),
        Remediation::Reencode => description.push_str(" [remediation: reencode]"),
    }

    if let Some(note) = &diagnostic.player_note {
        description.push_str(&format!(" [player note: {}]", note));
    }

    description
}

const ESCALATION_SUFFIX: &str = " This is the likely cause of the decode failure below.";

/// Translates every diagnostic in `report` into a [`MediaIssue`], in order, applying
/// decode-failure correlation when `decode_failure` is given: a `containerMetadata`
/// warning is escalated to an error and annotated, on the theory that it is the most
/// likely structural explanation for a decode failure the container pass itself
/// cannot see.
pub fn adapt(report: &ContainerReport, decode_failure: Option<&DecodeFailure>) -> Vec<MediaIssue> {
    report
        .diagnostics
        .iter()
        .map(|diagnostic| {
            let issue_type = issue_type_for(diagnostic.category);
            let mut severity = diagnostic.severity;
            let mut description = describe(diagnostic);

            let should_escalate = matches!(
                (decode_failure, issue_type, severity),
                (Some(failure), IssueType::ContainerMetadata, Severity::Warning)
                    if failure.severity == Severity::Error
            );

            if should_escalate {
                severity = Severity::Error;
                description.push_str(ESCALATION_SUFFIX);
            }

            MediaIssue {
                issue_type,
                severity,
                timestamp: None,
                frame_number: None,
                description,
                source_diagnostic_id: diagnostic.id(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::ContainerType;

    #[test]
    fn escalates_metadata_warning_when_decode_failed() {
        let mut report = ContainerReport::new(ContainerType::Isobmff);
        report.push(Diagnostic::warning(Category::EditList, "Edit List Oddity", "detail"));

        let issues = adapt(&report, Some(&DecodeFailure { severity: Severity::Error }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].description.ends_with("This is the likely cause of the decode failure below."));
    }

    #[test]
    fn leaves_structural_categories_unescalated() {
        let mut report = ContainerReport::new(ContainerType::Isobmff);
        report.push(Diagnostic::warning(Category::BoxStructure, "Odd Box", "detail"));

        let issues = adapt(&report, Some(&DecodeFailure { severity: Severity::Error }));
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].issue_type, IssueType::ContainerStructure);
    }

    #[test]
    fn no_decode_failure_means_no_escalation() {
        let mut report = ContainerReport::new(ContainerType::Isobmff);
        report.push(Diagnostic::warning(Category::SampleTable, "Odd Table", "detail"));

        let issues = adapt(&report, None);
        assert_eq!(issues[0].severity, Severity::Warning);
    }
}
