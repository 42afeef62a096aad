// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// One run of samples sharing the same composition-time offset.
#[derive(Debug, Clone, Copy)]
pub struct CompositionOffsetEntry {
    pub sample_count: u32,
    /// Version 0 stores this as unsigned; version 1 allows negative offsets. Both are
    /// widened to `i32` here since the validator only ever compares the magnitude
    /// against a timescale-relative bound.
    pub sample_offset: i32,
}

/// Composition-time-to-sample table (`ctts`), giving the presentation-time offset
/// (PTS - DTS) for B-frame reordering.
#[derive(Debug, Default)]
pub struct CttsAtom {
    pub entries: Vec<CompositionOffsetEntry>,
    pub declared_entry_count: u32,
}

impl CttsAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let (_version, _flags) = {
            let raw = reader.read_u32be();
            ((raw >> 24) as u8, raw & 0x00FF_FFFF)
        };
        let entry_count = reader.read_u32be();

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            if entries.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 8 {
                break;
            }
            let sample_count = reader.read_u32be();
            let sample_offset = reader.read_u32be() as i32;
            entries.push(CompositionOffsetEntry { sample_count, sample_offset });
        }

        CttsAtom { entries, declared_entry_count: entry_count }
    }

    pub fn total_samples(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.sample_count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_signed_offsets() {
        let mut data = vec![0, 0, 0, 1]; // version 1
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&(-512i32).to_be_bytes().map(|b| b));

        let atom = CttsAtom::read(&data);
        assert_eq!(atom.total_samples(), 2);
        assert_eq!(atom.entries[0].sample_offset, -512);
    }
}
