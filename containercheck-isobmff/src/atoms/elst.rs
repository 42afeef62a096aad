// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// One edit-list segment.
#[derive(Debug, Clone, Copy)]
pub struct ElstEntry {
    pub segment_duration: u64,
    /// -1 marks an "empty edit" (a gap with no corresponding media).
    pub media_time: i64,
    pub media_rate_int: i16,
    pub media_rate_frac: i16,
}

/// Edit list (`elst`): maps the track's presentation timeline onto its media timeline,
/// allowing leading gaps and trimmed segments.
#[derive(Debug, Default)]
pub struct ElstAtom {
    pub entries: Vec<ElstEntry>,
    pub declared_entry_count: u32,
}

impl ElstAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let raw = reader.read_u32be();
        let version = (raw >> 24) as u8;
        let entry_count = reader.read_u32be();

        let entry_len: u64 = if version == 0 { 12 } else { 20 };

        let mut entries = Vec::new();
        for _ in 0..entry_count {
            if entries.len() as u64 >= MAX_TABLE_ENTRIES || (reader.remaining() as u64) < entry_len
            {
                break;
            }

            let (segment_duration, media_time) = match version {
                0 => (u64::from(reader.read_u32be()), i64::from(reader.read_u32be() as i32)),
                1 => (reader.read_u64be(), reader.read_u64be() as i64),
                _ => break,
            };

            let media_rate_int = reader.read_u16be() as i16;
            let media_rate_frac = reader.read_u16be() as i16;

            entries.push(ElstEntry { segment_duration, media_time, media_rate_int, media_rate_frac });
        }

        ElstAtom { entries, declared_entry_count: entry_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_version_0_entries() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&90000u32.to_be_bytes());
        data.extend_from_slice(&(-1i32).to_be_bytes());
        data.extend_from_slice(&1i16.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());

        let elst = ElstAtom::read(&data);
        assert_eq!(elst.entries.len(), 1);
        assert_eq!(elst.entries[0].segment_duration, 90000);
        assert_eq!(elst.entries[0].media_time, -1);
    }

    #[test]
    fn reads_version_1_entries() {
        let mut data = vec![0, 0, 0, 1];
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&180000u64.to_be_bytes());
        data.extend_from_slice(&500u64.to_be_bytes());
        data.extend_from_slice(&1i16.to_be_bytes());
        data.extend_from_slice(&0i16.to_be_bytes());

        let elst = ElstAtom::read(&data);
        assert_eq!(elst.entries[0].segment_duration, 180000);
        assert_eq!(elst.entries[0].media_time, 500);
    }
}
