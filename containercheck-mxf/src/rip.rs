// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MXF Random Index Pack parser (C11): decodes the tail-of-file index of
//! partition offsets.

use containercheck_core::io::{u32be_at, u64be_at};

use crate::ber::decode_ber_length;
use crate::partition::RIP_KEY;

/// A RIP is rejected below this total length: smaller than a key, a one-byte BER
/// length, and the trailing 4-byte total-length field combined could never hold even
/// zero entries legally (16 + 1 + 4 = 21, but the smallest the spec treats as sane is
/// 33, matching a single entry's worth of slack for longer BER forms).
const MIN_RIP_TOTAL_LENGTH: u64 = 33;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RipEntry {
    pub body_sid: u32,
    pub byte_offset: u64,
}

#[derive(Debug, Clone)]
pub struct RandomIndexPack {
    pub offset: u64,
    pub total_length: u64,
    pub entries: Vec<RipEntry>,
}

/// Attempts to decode the Random Index Pack from the tail of `data`. Returns `None`
/// if the file is too small to hold a RIP, the trailing total-length field points
/// somewhere impossible, or the key at the computed offset does not match.
pub fn read_rip(data: &[u8]) -> Option<RandomIndexPack> {
    let file_len = data.len() as u64;
    if file_len < 4 {
        return None;
    }

    let total_length = u32be_at(data, data.len() - 4) as u64;
    if total_length < MIN_RIP_TOTAL_LENGTH || total_length > file_len {
        return None;
    }

    let offset = file_len - total_length;
    let rip_data = &data[offset as usize..];

    if rip_data.len() < 16 || rip_data[0..16] != RIP_KEY {
        return None;
    }

    let (declared_len, ber_len) = decode_ber_length(&rip_data[16..])?;
    let value_start = 16 + ber_len;

    if declared_len < 4 {
        return None;
    }

    let entries_len = declared_len - 4;
    if entries_len % 12 != 0 {
        return None;
    }

    let entry_count = (entries_len / 12) as usize;
    let mut entries = Vec::with_capacity(entry_count.min(1_000_000));

    for i in 0..entry_count {
        let entry_start = value_start + i * 12;
        let Some(entry) = rip_data.get(entry_start..entry_start + 12) else { break };

        entries.push(RipEntry {
            body_sid: u32be_at(entry, 0),
            byte_offset: u64be_at(entry, 4),
        });
    }

    Some(RandomIndexPack { offset, total_length, entries })
}
