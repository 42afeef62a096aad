// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// Chunk offset table, 64-bit variant (`co64`), required for files larger than 4 GiB.
#[derive(Debug, Default)]
pub struct Co64Atom {
    pub chunk_offsets: Vec<u64>,
    pub declared_entry_count: u32,
}

impl Co64Atom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let entry_count = reader.read_u32be();

        let mut chunk_offsets = Vec::new();

        for _ in 0..entry_count {
            if chunk_offsets.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 8 {
                break;
            }
            chunk_offsets.push(reader.read_u64be());
        }

        Co64Atom { chunk_offsets, declared_entry_count: entry_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_64bit_chunk_offsets() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&5_000_000_000u64.to_be_bytes());

        let atom = Co64Atom::read(&data);
        assert_eq!(atom.chunk_offsets, vec![5_000_000_000]);
    }
}
