// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ISOBMFF validator (C8): runs the fixed sequence of cross-checks described in
//! the component design over a parsed box tree, merging every validator's diagnostics
//! in deterministic, ascending-byte-offset order within each check.

use containercheck_core::diagnostic::{
    BoxSummary, Category, ContainerReport, ContainerType, Diagnostic, Remediation, TrackEditList,
};
use containercheck_core::registry::Depth;

use crate::atoms::edts::EdtsAtom;
use crate::atoms::hdlr::HdlrAtom;
use crate::atoms::mdhd::MdhdAtom;
use crate::atoms::stbl::StblAtom;
use crate::atoms::stsd::CodecType;
use crate::atoms::{parse_box_tree, AtomHeader, AtomIterator, BoxNode, DEFAULT_MAX_DEPTH};
use crate::framemap::build_frame_map;
use crate::nal::{select_frames, walk_frame_nals};

/// A file larger than this requires the 64-bit chunk-offset table (`co64`).
const FOUR_GIB: u64 = 4 * 1024 * 1024 * 1024;

/// Runs every ISOBMFF cross-check over `data` at the requested `depth` and returns
/// the accumulated report. `data` is the entire file.
pub fn validate(data: &[u8], depth: Depth) -> ContainerReport {
    let mut report = ContainerReport::new(ContainerType::Isobmff);
    let file_len = data.len() as u64;

    let top_level: Vec<AtomHeader> = AtomIterator::new(data, 0).map(|(h, _)| h).collect();

    check_top_level_order(&top_level, &mut report);
    check_required_boxes(&top_level, &mut report);
    check_truncation(&top_level, file_len, &mut report);
    check_malformed_and_overlapping(&top_level, &mut report);
    check_streaming_layout(&top_level, &mut report);

    report.metadata.box_tree = Some(
        top_level
            .iter()
            .map(|h| BoxSummary { four_cc: h.four_cc, offset: h.offset, size: h.total_size })
            .collect(),
    );

    let moov = top_level.iter().find(|h| &h.four_cc == b"moov" && !h.malformed_size && !h.truncated);
    let mdat = top_level.iter().find(|h| &h.four_cc == b"mdat");

    if let Some(moov) = moov {
        let moov_data = region(data, moov);
        let moov_children = parse_box_tree(moov_data, moov.data_offset(), DEFAULT_MAX_DEPTH);

        for node in &moov_children {
            if &node.header.four_cc == b"trak" {
                validate_track(node, mdat, data, depth, &mut report);
            }
        }
    }

    report
}

/// Slices `data` to the bytes a header actually claims, clamped to what is really
/// available so a malformed or truncated header can never yield an out-of-range slice.
fn region<'a>(data: &'a [u8], header: &AtomHeader) -> &'a [u8] {
    let start = (header.data_offset() as usize).min(data.len());
    let declared_end = header.offset.saturating_add(header.total_size) as usize;
    let end = declared_end.min(data.len()).max(start);
    &data[start..end]
}

fn check_top_level_order(top_level: &[AtomHeader], report: &mut ContainerReport) {
    match top_level.first() {
        Some(first) if &first.four_cc == b"ftyp" => {}
        _ => {
            report.push(Diagnostic::info(
                Category::BoxStructure,
                "Missing Leading ftyp",
                "The file does not begin with an `ftyp` box; many players still accept this, \
                 but it is non-conformant.",
            ));
        }
    }
}

fn check_required_boxes(top_level: &[AtomHeader], report: &mut ContainerReport) {
    let has_moov = top_level.iter().any(|h| &h.four_cc == b"moov");
    let has_mdat = top_level.iter().any(|h| &h.four_cc == b"mdat");

    if !has_moov {
        report.push(
            Diagnostic::error(Category::MissingAtom, "Missing moov Box", "No `moov` box was found at the top level; the file has no track metadata to inspect.")
                .with_remediation(Remediation::Reencode),
        );
    }

    if has_moov && !has_mdat {
        report.push(Diagnostic::warning(
            Category::MissingAtom,
            "Missing mdat Box",
            "No `mdat` box was found; the file may be fragmented (essence delivered via `moof`).",
        ));
    }
}

fn check_truncation(top_level: &[AtomHeader], file_len: u64, report: &mut ContainerReport) {
    let declared_total: u64 =
        top_level.iter().map(|h| h.total_size).fold(0u64, |acc, size| acc.saturating_add(size));

    if declared_total > file_len {
        report.push(
            Diagnostic::error(
                Category::TruncatedAtom,
                "File Truncated",
                format!(
                    "Top-level boxes declare {} bytes but the file is only {} bytes.",
                    declared_total, file_len
                ),
            )
            .with_remediation(Remediation::Remux),
        );
    }
}

fn check_malformed_and_overlapping(top_level: &[AtomHeader], report: &mut ContainerReport) {
    for header in top_level {
        if header.malformed_size {
            report.push(
                Diagnostic::error(
                    Category::BoxStructure,
                    "Invalid Box Size",
                    format!("Box `{}` at offset {} declares a size below the minimum legal header size.", header.four_cc_str(), header.offset),
                )
                .with_offset(header.offset),
            );
        }

        if header.truncated {
            report.push(
                Diagnostic::error(
                    Category::TruncatedAtom,
                    "Truncated Box",
                    format!("Box `{}` at offset {} declares an end past the available data.", header.four_cc_str(), header.offset),
                )
                .with_offset(header.offset)
                .with_remediation(Remediation::Remux),
            );
        }
    }

    for pair in top_level.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let a_end = a.offset.saturating_add(a.total_size);
        if a_end > b.offset {
            report.push(
                Diagnostic::error(
                    Category::BoxStructure,
                    "Overlapping Boxes",
                    format!(
                        "Box `{}` at offset {} (ending at {}) overlaps the following box `{}` at offset {}.",
                        a.four_cc_str(), a.offset, a_end, b.four_cc_str(), b.offset
                    ),
                )
                .with_offset(a.offset),
            );
        }
    }
}

fn check_streaming_layout(top_level: &[AtomHeader], report: &mut ContainerReport) {
    let moov_offset = top_level.iter().find(|h| &h.four_cc == b"moov").map(|h| h.offset);
    let mdat_offset = top_level.iter().find(|h| &h.four_cc == b"mdat").map(|h| h.offset);

    if let (Some(moov_offset), Some(mdat_offset)) = (moov_offset, mdat_offset) {
        if moov_offset > mdat_offset {
            report.push(
                Diagnostic::info(
                    Category::BoxStructure,
                    "moov After mdat",
                    "`moov` follows `mdat`; the file is not optimized for progressive/streaming playback.",
                )
                .with_offset(moov_offset)
                .with_remediation(Remediation::Remux),
            );
        }
    }
}

fn validate_track(
    trak: &BoxNode,
    mdat: Option<&AtomHeader>,
    data: &[u8],
    depth: Depth,
    report: &mut ContainerReport,
) {
    let file_len = data.len() as u64;
    let Some(mdia) = trak.find_child(b"mdia") else { return };
    let Some(hdlr_node) = mdia.find_child(b"hdlr") else { return };
    let hdlr = HdlrAtom::read(&hdlr_node.payload);

    if !hdlr.is_video() {
        return;
    }

    let mdhd = mdia.find_child(b"mdhd").map(|n| MdhdAtom::read(&n.payload)).unwrap_or_default();
    let timescale = u64::from(mdhd.timescale.max(1));

    let Some(minf) = mdia.find_child(b"minf") else { return };
    let Some(stbl_node) = minf.find_child(b"stbl") else { return };
    let stbl = StblAtom::read(stbl_node);

    let total_chunks = stbl.total_chunks();

    report.metadata.keyframe_counts.push((
        0,
        stbl.stss.as_ref().map(|s| s.sync_samples.len()).unwrap_or(0),
    ));

    if let Some(edts_node) = trak.find_child(b"edts") {
        let edts = EdtsAtom::read(edts_node);
        if let Some(elst) = &edts.elst {
            report.metadata.edit_lists.push(TrackEditList { track_id: 0, entry_count: elst.entries.len() });
            validate_edit_list(elst, &stbl, report);
        }
    }

    check_chunk_offsets(&stbl, total_chunks, mdat, file_len, report);
    check_sample_counts(&stbl, timescale, report);

    if let Some(stsd) = &stbl.stsd {
        if let Some(config) = &stsd.codec_config {
            check_codec_config(config, report);

            if depth != Depth::Quick {
                run_nal_walk(&stbl, config, data, depth, report);
            }
        }
    }
}

fn check_chunk_offsets(
    stbl: &StblAtom,
    total_chunks: u64,
    mdat: Option<&AtomHeader>,
    file_len: u64,
    report: &mut ContainerReport,
) {
    if stbl.stco.is_some() && stbl.co64.is_none() && file_len > FOUR_GIB {
        report.push(
            Diagnostic::error(
                Category::SampleTable,
                "32-bit Chunk Offsets on >4GB File",
                "This track uses a 32-bit `stco` chunk-offset table but the file exceeds 4 GiB; offsets will wrap and point to the wrong data.",
            )
            .with_remediation(Remediation::Remux),
        );
    }

    let mut last_offset: Option<u64> = None;
    let mut non_monotonic = false;

    for chunk_index in 0..total_chunks {
        let Some(offset) = stbl.chunk_offset(chunk_index) else { break };

        if let Some(last) = last_offset {
            if offset <= last {
                non_monotonic = true;
            }
        }
        last_offset = Some(offset);

        if let Some(mdat) = mdat {
            let mdat_start = mdat.data_offset();
            let mdat_end = mdat.offset.saturating_add(mdat.total_size);

            if offset < mdat_start || offset >= mdat_end {
                report.push(
                    Diagnostic::error(
                        Category::SampleTable,
                        "Chunk Offset Outside mdat",
                        format!("Chunk {} offset {} lies outside the `mdat` payload [{}, {}).", chunk_index, offset, mdat_start, mdat_end),
                    )
                    .with_offset(offset),
                );
            }
            else {
                let mdat_len = mdat_end.saturating_sub(mdat_start);
                let threshold = mdat_end.saturating_sub(mdat_len / 100);
                if offset >= threshold {
                    report.push(
                        Diagnostic::warning(
                            Category::SampleTable,
                            "Chunk Offset Near End of mdat",
                            format!("Chunk {} offset {} falls within the last 1% of the `mdat` payload.", chunk_index, offset),
                        )
                        .with_offset(offset),
                    );
                }
            }
        }
    }

    if non_monotonic {
        report.push(Diagnostic::warning(
            Category::SampleTable,
            "Non-Monotonic Chunk Offsets",
            "Chunk offsets do not strictly increase; this track's data is not laid out contiguously.",
        ));
    }

    if let Some(stss) = &stbl.stss {
        let total_samples = stbl.stsz.as_ref().map(|s| u64::from(s.sample_count)).unwrap_or(0);

        for &one_based in &stss.sync_samples {
            if one_based < 1 || u64::from(one_based) > total_samples {
                report.push(Diagnostic::error(
                    Category::SyncSampleTable,
                    "Sync Sample Index Out Of Range",
                    format!("Sync-sample index {} is outside the valid range [1, {}].", one_based, total_samples),
                ));
                break;
            }
        }

        if total_samples > 0 && !stss.is_keyframe(0) {
            report.push(Diagnostic::warning(
                Category::SyncSampleTable,
                "First Sample Not A Sync Sample",
                "Sample 1 is not listed in the sync-sample table; most players expect playback to start on a keyframe.",
            ));
        }
    }

    if let Some(stsz) = &stbl.stsz {
        if let crate::atoms::stsz::SampleSize::Variable(sizes) = &stsz.sizes {
            if sizes.iter().any(|&s| s == 0) {
                report.push(Diagnostic::warning(
                    Category::SampleTable,
                    "Zero-Size Sample",
                    "At least one sample in this track declares a size of zero bytes.",
                ));
            }
        }

        if let Some(mdat) = mdat {
            let mdat_len = mdat.data_len();
            if stsz.total_bytes() > mdat_len {
                report.push(
                    Diagnostic::error(
                        Category::SampleTable,
                        "Declared Sample Bytes Exceed mdat",
                        format!("Sample table declares {} total bytes, but `mdat` only holds {}.", stsz.total_bytes(), mdat_len),
                    )
                    .with_remediation(Remediation::Remux),
                );
            }
        }
    }
}

fn check_sample_counts(stbl: &StblAtom, timescale: u64, report: &mut ContainerReport) {
    let Some(stts) = &stbl.stts else { return };

    for entry in &stts.entries {
        if entry.sample_delta == 0 && entry.sample_count > 0 {
            report.push(Diagnostic::warning(
                Category::SampleTable,
                "Zero-Duration Samples",
                format!("{} sample(s) declare a zero decode-time delta.", entry.sample_count),
            ));
        }

        if u64::from(entry.sample_delta) > timescale.saturating_mul(10) {
            report.push(Diagnostic::warning(
                Category::SampleTable,
                "Abnormal Sample Duration",
                format!("A run of {} sample(s) declares a delta of {}, more than 10x the track timescale.", entry.sample_count, entry.sample_delta),
            ));
        }
    }

    if let Some(stsz) = &stbl.stsz {
        let stts_total = stts.total_samples();
        let stsz_total = u64::from(stsz.sample_count);

        if stts_total != stsz_total {
            report.push(
                Diagnostic::error(
                    Category::SampleTable,
                    "Sample Count Mismatch (stts vs stsz)",
                    format!("`stts` declares {} samples but `stsz` declares {}.", stts_total, stsz_total),
                )
                .with_remediation(Remediation::Reencode),
            );
        }
    }

    if let Some(ctts) = &stbl.ctts {
        let ctts_total = ctts.total_samples();
        let stts_total = stts.total_samples();

        if ctts_total != stts_total {
            report.push(Diagnostic::warning(
                Category::CompositionTime,
                "Composition Time Sample Count Mismatch",
                format!("`ctts` covers {} samples but `stts` covers {}.", ctts_total, stts_total),
            ));
        }

        for entry in &ctts.entries {
            if i64::from(entry.sample_offset).unsigned_abs() > timescale.saturating_mul(5) {
                report.push(Diagnostic::warning(
                    Category::CompositionTime,
                    "Abnormal Composition Time Offset",
                    format!("A composition-time offset of {} exceeds 5x the track timescale.", entry.sample_offset),
                ));
                break;
            }
        }
    }
}

fn validate_edit_list(
    elst: &crate::atoms::elst::ElstAtom,
    stbl: &StblAtom,
    report: &mut ContainerReport,
) {
    let Some(stts) = &stbl.stts else { return };
    let track_duration = stts.total_duration();

    for entry in &elst.entries {
        if entry.media_time < 0 {
            continue; // an empty edit; nothing to check against the media timeline
        }

        let media_time = entry.media_time as u64;

        if media_time > track_duration {
            report.push(
                Diagnostic::error(
                    Category::EditList,
                    "Edit List Exceeds Track Duration",
                    format!("Edit list media_time {} exceeds the computed track duration of {}.", media_time, track_duration),
                )
                .with_remediation(Remediation::Remux),
            );
            continue;
        }

        let keyframe_dts: Vec<u64> = match &stbl.stss {
            Some(stss) => stss
                .sync_samples
                .iter()
                .filter_map(|&one_based| one_based.checked_sub(1))
                .filter_map(|idx| stts.dts_of(u64::from(idx)))
                .collect(),
            None => (0..stts.total_samples()).filter_map(|i| stts.dts_of(i)).collect(),
        };

        let has_preceding_keyframe = keyframe_dts.iter().any(|&dts| dts <= media_time);
        let has_exact_match = keyframe_dts.iter().any(|&dts| dts == media_time);

        if !has_preceding_keyframe {
            report.push(
                Diagnostic::error(
                    Category::EditList,
                    "Edit List References Missing Keyframe",
                    format!("Edit list media_time {} has no keyframe at or before it.", media_time),
                )
                .with_remediation(Remediation::Remux),
            );
        }
        else if !has_exact_match {
            report.push(Diagnostic::warning(
                Category::EditList,
                "Edit List Not Aligned To Keyframe",
                format!("Edit list media_time {} does not land exactly on a keyframe's decode time.", media_time),
            ));
        }
    }
}

fn check_codec_config(config: &crate::atoms::stsd::CodecConfig, report: &mut ContainerReport) {
    match config.codec_type {
        CodecType::H264 => {
            if let Some(avcc) = &config.avcc {
                if avcc.truncated {
                    report.push(Diagnostic::error(Category::NalStructure, "Truncated avcC", "The `avcC` configuration record ends before its declared parameter sets could be read."));
                    return;
                }
                if !avcc.has_sps() {
                    report.push(
                        Diagnostic::error(Category::NalStructure, "Missing SPS", "`avcC` declares no Sequence Parameter Sets.")
                            .with_remediation(Remediation::Reencode),
                    );
                }
                if !avcc.has_pps() {
                    report.push(
                        Diagnostic::error(Category::NalStructure, "Missing PPS", "`avcC` declares no Picture Parameter Sets.")
                            .with_remediation(Remediation::Reencode),
                    );
                }
            }
        }
        CodecType::H265 => {
            if let Some(hvcc) = &config.hvcc {
                if hvcc.truncated {
                    report.push(Diagnostic::error(Category::NalStructure, "Truncated hvcC", "The `hvcC` configuration record ends before its declared NAL arrays could be read."));
                    return;
                }
                if !hvcc.has_vps() {
                    report.push(
                        Diagnostic::error(Category::NalStructure, "Missing VPS", "`hvcC` declares no Video Parameter Set.")
                            .with_remediation(Remediation::Reencode),
                    );
                }
                if !hvcc.has_sps() {
                    report.push(
                        Diagnostic::error(Category::NalStructure, "Missing SPS", "`hvcC` declares no Sequence Parameter Set.")
                            .with_remediation(Remediation::Reencode),
                    );
                }
                if !hvcc.has_pps() {
                    report.push(
                        Diagnostic::error(Category::NalStructure, "Missing PPS", "`hvcC` declares no Picture Parameter Set.")
                            .with_remediation(Remediation::Reencode),
                    );
                }
            }
        }
        CodecType::Other => {}
    }
}

/// Samples frames per the depth policy and validates their NAL-unit structure,
/// re-slicing `data` (the whole file) at each frame's absolute offset. A frame
/// whose declared range runs past the end of the file is walked against whatever
/// bytes actually remain, never past `data`'s end.
fn run_nal_walk(
    stbl: &StblAtom,
    config: &crate::atoms::stsd::CodecConfig,
    data: &[u8],
    depth: Depth,
    report: &mut ContainerReport,
) {
    if config.codec_type == CodecType::Other {
        return;
    }

    let frames = build_frame_map(stbl);
    if frames.is_empty() {
        return;
    }

    let selected = select_frames(depth, frames.len(), stbl.stss.as_ref());

    let mut overflow_count = 0usize;
    let mut first_overflow_offset: Option<u64> = None;
    let mut size_mismatch_count = 0usize;
    let mut missing_idr_keyframe_count = 0usize;
    let mut first_frame_missing_idr = false;

    for &index in &selected {
        let frame = frames[index];
        let start = (frame.offset as usize).min(data.len());
        let end =
            (frame.offset.saturating_add(u64::from(frame.size)) as usize).min(data.len()).max(start);
        let frame_data = &data[start..end];

        let result = walk_frame_nals(frame_data, frame.offset, config.nal_length_size, config.codec_type);

        if let Some(offset) = result.overflow_offset {
            overflow_count += 1;
            first_overflow_offset.get_or_insert(offset);
        }

        if result.size_mismatch {
            size_mismatch_count += 1;
        }

        let is_keyframe = stbl.stss.as_ref().map(|s| s.is_keyframe(index as u64)).unwrap_or(true);
        if is_keyframe && !result.has_idr {
            missing_idr_keyframe_count += 1;
        }

        if index == 0 && !result.has_idr {
            first_frame_missing_idr = true;
        }
    }

    if overflow_count > 0 {
        let mut diagnostic = Diagnostic::error(
            Category::NalStructure,
            "NAL Length Overflow",
            format!("{} sampled frame(s) contained a NAL unit whose declared length ran past the end of the frame.", overflow_count),
        );
        if let Some(offset) = first_overflow_offset {
            diagnostic = diagnostic.with_offset(offset);
        }
        report.push(diagnostic);
    }

    if size_mismatch_count > 0 {
        report.push(Diagnostic::warning(
            Category::NalStructure,
            "Frame Size Mismatch",
            format!("{} sampled frame(s) had 4 or more residual bytes after their last NAL unit.", size_mismatch_count),
        ));
    }

    if missing_idr_keyframe_count > 0 {
        report.push(Diagnostic::warning(
            Category::NalStructure,
            "Keyframe Missing IDR",
            format!("{} sampled keyframe(s) (per `stss`) contained no IDR-typed NAL unit.", missing_idr_keyframe_count),
        ));
    }

    if first_frame_missing_idr {
        report.push(Diagnostic::warning(
            Category::NalStructure,
            "First Frame Not IDR",
            "Sample 1 of this track does not contain an IDR NAL unit.",
        ));
    }
}
