// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// Sync-sample table (`stss`): the 1-based indices of every keyframe (sync sample).
/// Its absence means every sample is a sync sample.
#[derive(Debug, Default)]
pub struct StssAtom {
    pub sync_samples: Vec<u32>,
    pub declared_entry_count: u32,
}

impl StssAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let entry_count = reader.read_u32be();

        let mut sync_samples = Vec::new();
        for _ in 0..entry_count {
            if sync_samples.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 4 {
                break;
            }
            sync_samples.push(reader.read_u32be());
        }

        StssAtom { sync_samples, declared_entry_count: entry_count }
    }

    /// `sample_index` is 0-based; `stss` entries are 1-based.
    pub fn is_keyframe(&self, sample_index: u64) -> bool {
        let one_based = sample_index + 1;
        self.sync_samples.iter().any(|&idx| u64::from(idx) == one_based)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_based_sync_sample_indices() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&1u32.to_be_bytes());
        data.extend_from_slice(&31u32.to_be_bytes());

        let atom = StssAtom::read(&data);
        assert!(atom.is_keyframe(0));
        assert!(!atom.is_keyframe(1));
        assert!(atom.is_keyframe(30));
    }
}
