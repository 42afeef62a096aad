// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MXF validator (C12): discovers the partition chain by walking Partition Pack
//! keys, decodes the Random Index Pack, and runs the fixed sequence of cross-checks
//! described in the component design.

use std::collections::BTreeSet;

use containercheck_core::diagnostic::{
    Category, ContainerReport, ContainerType, Diagnostic, Remediation,
};
use containercheck_core::registry::Depth;

use crate::klv::{KlvIterator, MIN_KLV_SIZE};
use crate::partition::{
    essence_container_codec_name, operational_pattern_name, read_partition_pack,
    PartitionKind, PartitionPack, PartitionStatus, INDEX_TABLE_SEGMENT_PREFIX, PARTITION_PACK_PREFIX,
};
use crate::rip::read_rip;

/// Files below this size are not expected to carry a RIP; its absence is unremarkable.
const RIP_EXPECTED_ABOVE_SIZE: u64 = 1024 * 1024;

/// Runs every MXF cross-check over `data` at the requested `depth` and returns the
/// accumulated report. `depth` does not currently change which checks run (MXF has no
/// sampled-essence analysis analogous to the NAL walker); it is accepted for interface
/// symmetry with the ISOBMFF inspector.
pub fn validate(data: &[u8], _depth: Depth) -> ContainerReport {
    let mut report = ContainerReport::new(ContainerType::Mxf);
    let file_len = data.len() as u64;

    let partitions = discover_partitions(data);

    report.metadata.mxf_partition_labels =
        partitions.iter().map(|p| format!("{:?}/{:?}@{}", p.kind, p.status, p.file_offset)).collect();
    report.metadata.mxf_operational_pattern = partitions
        .first()
        .map(|p| operational_pattern_name(&p.operational_pattern));

    check_partition_structure(&partitions, &mut report);
    check_partition_offsets(&partitions, &mut report);
    check_kag_alignment(&partitions, &mut report);
    check_op_conformance(&partitions, &mut report);
    check_index_tables(data, &partitions, &mut report);

    let rip = read_rip(data);
    check_rip(rip.as_ref(), &partitions, file_len, &mut report);

    check_truncation(&partitions, file_len, &mut report);
    check_klv_integrity(data, &partitions, &mut report);
    check_essence_consistency(&partitions, &mut report);
    check_codec_identification(&partitions, &mut report);

    report
}

/// Discovers every Partition Pack in the file: offset 0 always, plus every offset the
/// Random Index Pack declares when one is present. When no RIP is present, the chain
/// is instead reconstructed with a linear scan: from each partition's metadata+index
/// end (`klv_value_end + headerByteCount + indexByteCount`), the next Partition Pack
/// key is located by scanning forward through the body/essence bytes, and the scan
/// continues from there. This is what lets a RIP-less multi-partition file still
/// surface its Body and Footer partitions (and everything downstream that depends on
/// seeing them) instead of being silently reduced to just the Header.
fn discover_partitions(data: &[u8]) -> Vec<PartitionPack> {
    let mut offsets = BTreeSet::new();
    offsets.insert(0u64);

    if let Some(rip) = read_rip(data) {
        for entry in &rip.entries {
            offsets.insert(entry.byte_offset);
        }
    }
    else {
        scan_partition_chain(data, &mut offsets);
    }

    let mut partitions = Vec::new();
    for &offset in &offsets {
        let Some(slice) = data.get(offset as usize..) else { continue };
        if let Some(pack) = read_partition_pack(slice, offset) {
            partitions.push(pack);
        }
    }

    partitions.sort_by_key(|p| p.file_offset);
    partitions
}

/// Follows the partition chain forward from offset 0 by repeatedly locating the next
/// Partition Pack key after each partition's declared metadata+index area, inserting
/// every offset found into `offsets`. Halts once a partition's declared area doesn't
/// advance the scan position, or no further Partition Pack key can be found.
fn scan_partition_chain(data: &[u8], offsets: &mut BTreeSet<u64>) {
    let mut offset = 0u64;

    loop {
        let Some(slice) = data.get(offset as usize..) else { break };
        let Some(pack) = read_partition_pack(slice, offset) else { break };

        let search_start = pack
            .klv_value_end
            .saturating_add(pack.header_byte_count)
            .saturating_add(pack.index_byte_count);

        if search_start <= offset || search_start >= data.len() as u64 {
            break;
        }

        match find_next_partition_pack_offset(data, search_start) {
            Some(next) => {
                offsets.insert(next);
                offset = next;
            }
            None => break,
        }
    }
}

/// Searches `data[start..]` for the next occurrence of the 13-byte Partition Pack
/// key prefix, returning its absolute file offset. Used as the RIP-less fallback for
/// locating a partition boundary within essence data that carries no index of its
/// own.
fn find_next_partition_pack_offset(data: &[u8], start: u64) -> Option<u64> {
    let region = data.get(start as usize..)?;
    let relative = region
        .windows(PARTITION_PACK_PREFIX.len())
        .position(|window| window == PARTITION_PACK_PREFIX.as_slice())?;
    Some(start + relative as u64)
}

fn check_partition_structure(partitions: &[PartitionPack], report: &mut ContainerReport) {
    let Some(header) = partitions.iter().find(|p| p.file_offset == 0) else {
        report.push(
            Diagnostic::error(
                Category::PartitionStructure,
                "Missing Header Partition",
                "No Partition Pack was found at offset 0.",
            )
            .with_remediation(Remediation::Remux),
        );
        return;
    };

    if header.kind != PartitionKind::Header {
        report.push(Diagnostic::warning(
            Category::PartitionStructure,
            "Partition At Offset 0 Is Not A Header",
            "The Partition Pack at offset 0 does not declare itself as a Header partition.",
        ));
    }

    let footer = partitions.iter().find(|p| p.kind == PartitionKind::Footer);

    if footer.is_none() {
        if header.status.is_complete() && header.status == PartitionStatus::ClosedComplete {
            report.push(
                Diagnostic::error(
                    Category::PartitionStructure,
                    "Missing Footer Partition",
                    "The header declares the file ClosedComplete, but no Footer partition is present.",
                )
                .with_remediation(Remediation::Remux),
            );
        }
        else {
            report.push(Diagnostic::warning(
                Category::PartitionStructure,
                "Missing Footer Partition",
                "No Footer partition is present; the file may be incomplete or still being written.",
            ));
        }
    }

    let distinct_footer_offsets: BTreeSet<u64> =
        partitions.iter().map(|p| p.footer_partition).filter(|&v| v != 0).collect();
    if distinct_footer_offsets.len() > 1 {
        report.push(Diagnostic::warning(
            Category::PartitionStructure,
            "Disagreeing Footer Partition Offsets",
            format!(
                "Partitions declare {} different footerPartition values; they should all agree.",
                distinct_footer_offsets.len()
            ),
        ));
    }

    report.push(match header.status {
        PartitionStatus::ClosedComplete => Diagnostic::info(
            Category::PartitionStructure,
            "Header Status",
            "Header partition status is ClosedComplete.",
        ),
        PartitionStatus::Unknown => Diagnostic::warning(
            Category::PartitionStructure,
            "Header Status",
            "Header partition status byte is not a recognized value.",
        ),
        other => Diagnostic::info(
            Category::PartitionStructure,
            "Header Status",
            format!("Header partition status is {:?}.", other),
        ),
    });

    for pair in partitions.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.previous_partition != prev.file_offset {
            report.push(
                Diagnostic::error(
                    Category::PartitionStructure,
                    "Broken Partition Chain",
                    format!(
                        "Partition at offset {} declares previousPartition {} but the prior partition is at {}.",
                        next.file_offset, next.previous_partition, prev.file_offset
                    ),
                )
                .with_offset(next.file_offset)
                .with_remediation(Remediation::Remux),
            );
        }
    }
}

/// Every partition pack declares its own absolute offset (`thisPartition`). A
/// well-formed file's value always agrees with where the pack was actually found;
/// disagreement means something rewrote or relocated the partition without updating
/// its self-description.
fn check_partition_offsets(partitions: &[PartitionPack], report: &mut ContainerReport) {
    for partition in partitions {
        if partition.this_partition != partition.file_offset {
            report.push(
                Diagnostic::warning(
                    Category::PartitionStructure,
                    "Partition Offset Mismatch",
                    format!(
                        "Partition found at offset {} declares thisPartition {}.",
                        partition.file_offset, partition.this_partition
                    ),
                )
                .with_offset(partition.file_offset),
            );
        }
    }
}

fn check_kag_alignment(partitions: &[PartitionPack], report: &mut ContainerReport) {
    for partition in partitions {
        if partition.kag_size > 1 && partition.file_offset % u64::from(partition.kag_size) != 0 {
            report.push(
                Diagnostic::info(
                    Category::PartitionStructure,
                    "Partition Not KAG-Aligned",
                    format!(
                        "Partition at offset {} is not a multiple of the declared KAG size {}.",
                        partition.file_offset, partition.kag_size
                    ),
                )
                .with_offset(partition.file_offset),
            );
        }
    }
}

fn check_op_conformance(partitions: &[PartitionPack], report: &mut ContainerReport) {
    let Some(header) = partitions.iter().find(|p| p.kind == PartitionKind::Header) else { return };

    let op_name = operational_pattern_name(&header.operational_pattern);
    if op_name != "OP1a" {
        if op_name == "Unknown Operational Pattern" {
            report.push(Diagnostic::warning(
                Category::PartitionStructure,
                "Unknown Operational Pattern",
                "The header's operational-pattern UL bytes 12-13 do not match a recognized item/package complexity pair.",
            ));
        }
        else {
            report.push(Diagnostic::info(
                Category::PartitionStructure,
                "Non-OP1a Operational Pattern",
                format!("This file declares {}, not the common OP1a profile.", op_name),
            ));
        }
    }

    let distinct_body_sids: BTreeSet<u32> =
        partitions.iter().map(|p| p.body_sid).filter(|&sid| sid != 0).collect();
    if distinct_body_sids.len() > 1 {
        report.push(Diagnostic::warning(
            Category::EssenceDescriptor,
            "Multiple Essence Streams",
            format!("Partitions declare {} distinct bodySID values.", distinct_body_sids.len()),
        ));
    }

    if header.essence_container_uls.is_empty() {
        report.push(Diagnostic::warning(
            Category::EssenceDescriptor,
            "No Essence Container ULs Declared",
            "The header partition declares zero essence-container ULs.",
        ));
    }
}

fn check_index_tables(data: &[u8], partitions: &[PartitionPack], report: &mut ContainerReport) {
    let declared_index_bytes: u64 = partitions.iter().map(|p| p.index_byte_count).sum();

    let mut found_index_segment = false;
    for partition in partitions {
        let index_start = (partition.klv_value_end + partition.header_byte_count) as usize;
        let index_end = index_start.saturating_add(partition.index_byte_count as usize).min(data.len());
        if let Some(region) = data.get(index_start.min(data.len())..index_end) {
            if region.len() >= 14 && region[0..14] == INDEX_TABLE_SEGMENT_PREFIX {
                found_index_segment = true;
            }
        }
    }

    if declared_index_bytes > 0 && !found_index_segment {
        report.push(Diagnostic::warning(
            Category::IndexTable,
            "Index Bytes Declared But No Segments Found",
            "Partitions declare a nonzero indexByteCount, but no Index Table Segment key was located there.",
        ));
    }

    let has_essence = partitions.iter().any(|p| p.body_sid != 0);
    if has_essence && declared_index_bytes == 0 {
        report.push(Diagnostic::info(
            Category::IndexTable,
            "No Index Table",
            "Essence is present but no index table is declared; random access requires a linear scan.",
        ));
    }
}

fn check_rip(
    rip: Option<&crate::rip::RandomIndexPack>,
    partitions: &[PartitionPack],
    file_len: u64,
    report: &mut ContainerReport,
) {
    let Some(rip) = rip else {
        if file_len > RIP_EXPECTED_ABOVE_SIZE {
            report.push(Diagnostic::info(
                Category::IndexTable,
                "Missing Random Index Pack",
                "No Random Index Pack was found at the end of this file.",
            ));
        }
        return;
    };

    let partition_offsets: BTreeSet<u64> = partitions.iter().map(|p| p.file_offset).collect();

    for entry in &rip.entries {
        if entry.byte_offset >= file_len {
            report.push(
                Diagnostic::error(
                    Category::IndexTable,
                    "RIP Entry Beyond EOF",
                    format!("RIP entry declares byteOffset {} but the file is only {} bytes.", entry.byte_offset, file_len),
                )
                .with_remediation(Remediation::Remux),
            );
            continue;
        }

        if !partition_offsets.contains(&entry.byte_offset) {
            report.push(
                Diagnostic::warning(
                    Category::IndexTable,
                    "RIP Entry Without Partition Key",
                    format!("RIP entry at offset {} does not correspond to a decoded partition pack.", entry.byte_offset),
                )
                .with_offset(entry.byte_offset),
            );
        }
    }
}

fn check_truncation(partitions: &[PartitionPack], file_len: u64, report: &mut ContainerReport) {
    for partition in partitions {
        if partition.footer_partition >= file_len && partition.footer_partition != 0 {
            report.push(
                Diagnostic::error(
                    Category::TruncatedAtom,
                    "Declared Footer Offset Beyond File",
                    format!("Partition at offset {} declares footerPartition {} but the file is only {} bytes.", partition.file_offset, partition.footer_partition, file_len),
                )
                .with_offset(partition.file_offset)
                .with_remediation(Remediation::Remux),
            );
        }

        let declared_end =
            partition.klv_value_end.saturating_add(partition.header_byte_count).saturating_add(partition.index_byte_count);
        if declared_end > file_len {
            report.push(
                Diagnostic::error(
                    Category::TruncatedAtom,
                    "Partition Metadata Exceeds File",
                    format!("Partition at offset {} declares a metadata+index end of {} but the file is only {} bytes.", partition.file_offset, declared_end, file_len),
                )
                .with_offset(partition.file_offset)
                .with_remediation(Remediation::Remux),
            );
        }
    }
}

fn check_klv_integrity(data: &[u8], partitions: &[PartitionPack], report: &mut ContainerReport) {
    for partition in partitions {
        let area_start = partition.klv_value_end;
        let area_end = area_start
            .saturating_add(partition.header_byte_count)
            .saturating_add(partition.index_byte_count)
            .min(data.len() as u64);

        if area_end <= area_start || (area_end - area_start) < MIN_KLV_SIZE as u64 {
            continue;
        }

        let region = &data[area_start as usize..area_end as usize];
        let mut iter = KlvIterator::new(region, area_start);
        while iter.next().is_some() {}

        if iter.halted_on_malformed() {
            report.push(
                Diagnostic::warning(
                    Category::PartitionStructure,
                    "KLV Value Exceeds Metadata Area",
                    format!("A KLV within partition {}'s metadata/index area declares a value extending past that area.", partition.file_offset),
                )
                .with_offset(partition.file_offset),
            );
        }
    }
}

fn check_essence_consistency(partitions: &[PartitionPack], report: &mut ContainerReport) {
    let Some(header) = partitions.iter().find(|p| p.kind == PartitionKind::Header) else { return };

    let header_set: BTreeSet<[u8; 16]> = header.essence_container_uls.iter().copied().collect();

    for partition in partitions.iter().filter(|p| p.kind == PartitionKind::Body) {
        if partition.essence_container_uls.is_empty() {
            continue;
        }

        let body_set: BTreeSet<[u8; 16]> = partition.essence_container_uls.iter().copied().collect();
        if body_set != header_set {
            report.push(
                Diagnostic::warning(
                    Category::EssenceDescriptor,
                    "Essence Container UL Mismatch",
                    format!(
                        "Body partition at offset {} declares {} essence-container UL(s) vs. {} in the header.",
                        partition.file_offset, body_set.len(), header_set.len()
                    ),
                )
                .with_offset(partition.file_offset),
            );
        }
    }
}

fn check_codec_identification(partitions: &[PartitionPack], report: &mut ContainerReport) {
    let Some(header) = partitions.iter().find(|p| p.kind == PartitionKind::Header) else { return };

    if header.essence_container_uls.is_empty() {
        return;
    }

    let names: Vec<String> = header
        .essence_container_uls
        .iter()
        .map(|ul| essence_container_codec_name(ul).unwrap_or_else(|| "Unidentified Essence".to_string()))
        .collect();

    report.push(Diagnostic::info(
        Category::EssenceDescriptor,
        "Declared Essence",
        format!("Header declares essence container(s): {}.", names.join(", ")),
    ));
}
