// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// Chunk offset table, 32-bit variant (`stco`).
#[derive(Debug, Default)]
pub struct StcoAtom {
    pub chunk_offsets: Vec<u32>,
    /// `entry_count` as declared, which may exceed `chunk_offsets.len()` if the
    /// declared count exceeded [`MAX_TABLE_ENTRIES`] or ran past the payload.
    pub declared_entry_count: u32,
}

impl StcoAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let entry_count = reader.read_u32be();

        let capacity = (u64::from(entry_count)).min(MAX_TABLE_ENTRIES) as usize;
        let mut chunk_offsets = Vec::with_capacity(capacity.min(reader.remaining() / 4 + 1));

        for _ in 0..entry_count {
            if chunk_offsets.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 4 {
                break;
            }
            chunk_offsets.push(reader.read_u32be());
        }

        StcoAtom { chunk_offsets, declared_entry_count: entry_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_chunk_offsets() {
        let mut data = vec![0, 0, 0, 0]; // version/flags
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&100u32.to_be_bytes());
        data.extend_from_slice(&4096u32.to_be_bytes());

        let atom = StcoAtom::read(&data);
        assert_eq!(atom.chunk_offsets, vec![100, 4096]);
    }

    #[test]
    fn stops_at_truncated_payload() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&5u32.to_be_bytes());
        data.extend_from_slice(&100u32.to_be_bytes());
        // Only one entry actually present despite entry_count = 5.

        let atom = StcoAtom::read(&data);
        assert_eq!(atom.chunk_offsets, vec![100]);
        assert_eq!(atom.declared_entry_count, 5);
    }
}
