// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

use crate::atoms::MAX_TABLE_ENTRIES;

/// Sample size table. A non-zero `uniform_size` field means every sample has that
/// size and no per-sample table follows; this workspace keeps that as a flag rather
/// than materializing a repeated array, since both representations satisfy the
/// count/byte-total invariants this parser's callers check.
#[derive(Debug, Clone)]
pub enum SampleSize {
    Constant(u32),
    Variable(Vec<u32>),
}

#[derive(Debug)]
pub struct StszAtom {
    pub sample_count: u32,
    pub sizes: SampleSize,
}

impl StszAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let uniform_size = reader.read_u32be();
        let sample_count = reader.read_u32be();

        let sizes = if uniform_size != 0 {
            SampleSize::Constant(uniform_size)
        }
        else {
            let mut sizes = Vec::new();
            for _ in 0..sample_count {
                if sizes.len() as u64 >= MAX_TABLE_ENTRIES || reader.remaining() < 4 {
                    break;
                }
                sizes.push(reader.read_u32be());
            }
            SampleSize::Variable(sizes)
        };

        StszAtom { sample_count, sizes }
    }

    /// Total byte count implied by the declared sample count and size table, per the
    /// invariant "declared sample bytes (uniform size × count, or sum of per-sample
    /// sizes)".
    pub fn total_bytes(&self) -> u64 {
        match &self.sizes {
            SampleSize::Constant(size) => u64::from(*size) * u64::from(self.sample_count),
            SampleSize::Variable(sizes) => sizes.iter().map(|s| u64::from(*s)).sum(),
        }
    }

    pub fn size_of(&self, sample_index: usize) -> Option<u32> {
        match &self.sizes {
            SampleSize::Constant(size) => {
                if (sample_index as u64) < u64::from(self.sample_count) {
                    Some(*size)
                }
                else {
                    None
                }
            }
            SampleSize::Variable(sizes) => sizes.get(sample_index).copied(),
        }
    }

    /// Number of sizes actually present, which is `sample_count` for the constant
    /// case but may be less than `sample_count` for a truncated variable table.
    pub fn present_count(&self) -> usize {
        match &self.sizes {
            SampleSize::Constant(_) => self.sample_count as usize,
            SampleSize::Variable(sizes) => sizes.len(),
        }
    }
}
