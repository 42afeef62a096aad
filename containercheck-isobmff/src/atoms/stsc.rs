// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// One run-length entry of the sample-to-chunk table: starting at `first_chunk`
/// (1-based), every chunk has `samples_per_chunk` samples until the next entry's
/// `first_chunk`.
#[derive(Debug, Clone, Copy)]
pub struct StscEntry {
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_index: u32,
    /// 0-based index of the first sample belonging to `first_chunk`, filled in by
    /// [`StscAtom::resolve`] once the total chunk count is known.
    pub first_sample: u64,
}

#[derive(Debug, Default)]
pub struct StscAtom {
    pub entries: Vec<StscEntry>,
    pub declared_entry_count: u32,
    /// True once `first_chunk` was observed to be non-monotonic across entries.
    pub non_monotonic: bool,
}

impl StscAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let entry_count = reader.read_u32be();

        let mut entries = Vec::new();
        let mut non_monotonic = false;
        let mut last_first_chunk = 0u32;

        for i in 0..entry_count {
            if entries.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 12 {
                break;
            }

            let first_chunk = reader.read_u32be();
            let samples_per_chunk = reader.read_u32be();
            let sample_description_index = reader.read_u32be();

            if i > 0 && first_chunk <= last_first_chunk {
                non_monotonic = true;
            }
            last_first_chunk = first_chunk;

            entries.push(StscEntry {
                first_chunk,
                samples_per_chunk,
                sample_description_index,
                first_sample: 0,
            });
        }

        StscAtom { entries, declared_entry_count: entry_count, non_monotonic }
    }

    /// Fills in each entry's `first_sample` given the total number of chunks (from
    /// `stco`/`co64`). `first_chunk` is 1-based; the last entry's run continues until
    /// `total_chunks`.
    pub fn resolve(&mut self, total_chunks: u64) {
        let mut cumulative_samples = 0u64;

        for i in 0..self.entries.len() {
            self.entries[i].first_sample = cumulative_samples;

            let run_chunks = if i + 1 < self.entries.len() {
                u64::from(self.entries[i + 1].first_chunk).saturating_sub(u64::from(self.entries[i].first_chunk))
            }
            else {
                total_chunks.saturating_sub(u64::from(self.entries[i].first_chunk) - 1)
            };

            cumulative_samples =
                cumulative_samples.saturating_add(run_chunks.saturating_mul(u64::from(self.entries[i].samples_per_chunk)));
        }
    }

    /// Finds the entry governing 1-based `chunk_index` by walking entries in reverse
    /// for the last one whose `first_chunk <= chunk_index`.
    pub fn entry_for_chunk(&self, chunk_index: u32) -> Option<&StscEntry> {
        self.entries.iter().rev().find(|e| e.first_chunk <= chunk_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(bytes: &mut Vec<u8>, first_chunk: u32, spc: u32, sdi: u32) {
        bytes.extend_from_slice(&first_chunk.to_be_bytes());
        bytes.extend_from_slice(&spc.to_be_bytes());
        bytes.extend_from_slice(&sdi.to_be_bytes());
    }

    #[test]
    fn resolves_first_sample_per_run() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&2u32.to_be_bytes());
        entry(&mut data, 1, 4, 1);
        entry(&mut data, 3, 2, 1);

        let mut atom = StscAtom::read(&data);
        assert!(!atom.non_monotonic);
        atom.resolve(10); // 10 total chunks: chunk 1-2 have 4 samples each, chunks 3-10 have 2 each

        assert_eq!(atom.entries[0].first_sample, 0);
        assert_eq!(atom.entries[1].first_sample, 8);
    }

    #[test]
    fn detects_non_monotonic_first_chunk() {
        let mut data = vec![0, 0, 0, 0];
        data.extend_from_slice(&2u32.to_be_bytes());
        entry(&mut data, 5, 1, 1);
        entry(&mut data, 3, 1, 1);

        let atom = StscAtom::read(&data);
        assert!(atom.non_monotonic);
    }
}
