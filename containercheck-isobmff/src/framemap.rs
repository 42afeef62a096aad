// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The frame map builder (C6): resolves a per-sample `(file-offset, size)` list by
//! zipping `stco`/`co64` with `stsc` and `stsz`, per the component design's chunk-walk
//! algorithm.

use crate::atoms::stbl::StblAtom;
use crate::atoms::MAX_TABLE_ENTRIES;

#[derive(Debug, Clone, Copy)]
pub struct FrameEntry {
    pub offset: u64,
    pub size: u32,
}

/// Builds the per-sample frame map for one video track's sample table. Returns an
/// empty map if any of the tables this depends on (`stsz`, `stsc`, and a chunk-offset
/// table) is absent — callers must treat that as "cannot cross-validate", not as a
/// zero-sample track.
pub fn build_frame_map(stbl: &StblAtom) -> Vec<FrameEntry> {
    let (Some(stsz), Some(stsc)) = (&stbl.stsz, &stbl.stsc) else {
        return Vec::new();
    };

    let total_chunks = stbl.total_chunks();
    if total_chunks == 0 || stsc.entries.is_empty() {
        return Vec::new();
    }

    let total_samples = u64::from(stsz.sample_count);
    let mut frames = Vec::new();
    let mut sample_index: u64 = 0;

    'chunks: for chunk_index in 0..total_chunks {
        if sample_index >= total_samples || frames.len() as u64 >= MAX_TABLE_ENTRIES {
            break;
        }

        let chunk_number = (chunk_index + 1) as u32;
        let Some(entry) = stsc.entry_for_chunk(chunk_number) else { break };
        let Some(base_offset) = stbl.chunk_offset(chunk_index) else { break };

        let mut running_offset = base_offset;

        for _ in 0..entry.samples_per_chunk {
            if sample_index >= total_samples || frames.len() as u64 >= MAX_TABLE_ENTRIES {
                break 'chunks;
            }

            let size = stsz.size_of(sample_index as usize).unwrap_or(0);
            frames.push(FrameEntry { offset: running_offset, size });
            running_offset = running_offset.saturating_add(u64::from(size));
            sample_index += 1;
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::parse_box_tree;
    use crate::atoms::stbl::StblAtom;

    fn wrap(four_cc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut v = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        v.extend_from_slice(four_cc);
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn zips_chunk_stsc_and_stsz_into_per_sample_offsets() {
        let mut stco_payload = vec![0, 0, 0, 0];
        stco_payload.extend_from_slice(&2u32.to_be_bytes());
        stco_payload.extend_from_slice(&1000u32.to_be_bytes());
        stco_payload.extend_from_slice(&1200u32.to_be_bytes());

        let mut stsc_payload = vec![0, 0, 0, 0];
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());
        stsc_payload.extend_from_slice(&2u32.to_be_bytes());
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());

        let mut stsz_payload = vec![0, 0, 0, 0];
        stsz_payload.extend_from_slice(&0u32.to_be_bytes());
        stsz_payload.extend_from_slice(&4u32.to_be_bytes());
        for size in [100u32, 50, 80, 40] {
            stsz_payload.extend_from_slice(&size.to_be_bytes());
        }

        let mut stbl_box = wrap(b"stco", &stco_payload);
        stbl_box.extend(wrap(b"stsc", &stsc_payload));
        stbl_box.extend(wrap(b"stsz", &stsz_payload));
        let stbl_box = wrap(b"stbl", &stbl_box);

        let tree = parse_box_tree(&stbl_box, 0, 6);
        let stbl = StblAtom::read(&tree[0]);
        let frames = build_frame_map(&stbl);

        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].offset, 1000);
        assert_eq!(frames[1].offset, 1100);
        assert_eq!(frames[2].offset, 1200);
        assert_eq!(frames[3].offset, 1280);
    }

    #[test]
    fn missing_sample_tables_yield_empty_map() {
        let tree = parse_box_tree(&wrap(b"stbl", &[]), 0, 6);
        let stbl = StblAtom::read(&tree[0]);
        assert!(build_frame_map(&stbl).is_empty());
    }
}
