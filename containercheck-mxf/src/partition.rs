// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The MXF partition decoder (C10): recognizes Partition Pack keys, decodes the fixed
//! value layout, derives the Operational Pattern name, and identifies essence-container
//! codec ULs for the informational summary the validator emits.

use containercheck_core::io::{u16be_at, u32be_at, u64be_at};

use crate::ber::decode_ber_length;

/// The 13-byte SMPTE prefix shared by every Partition Pack key; bytes 13 and 14 (kind,
/// status) vary.
pub const PARTITION_PACK_PREFIX: [u8; 13] =
    [0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01];

/// The fixed 16-byte Random Index Pack key.
pub const RIP_KEY: [u8; 16] = [
    0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x11, 0x01, 0x00,
];

/// The first 14 bytes shared by every Index Table Segment key.
pub const INDEX_TABLE_SEGMENT_PREFIX: [u8; 14] =
    [0x06, 0x0e, 0x2b, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Header,
    Body,
    Footer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStatus {
    OpenIncomplete,
    ClosedIncomplete,
    OpenComplete,
    ClosedComplete,
    Unknown,
}

impl PartitionStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, PartitionStatus::OpenComplete | PartitionStatus::ClosedComplete)
    }
}

/// A decoded Partition Pack: the fixed fields the validator cross-checks, plus the
/// declared essence-container UL batch.
#[derive(Debug, Clone)]
pub struct PartitionPack {
    pub kind: PartitionKind,
    pub status: PartitionStatus,
    pub file_offset: u64,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_sid: u32,
    pub kag_size: u32,
    pub operational_pattern: [u8; 16],
    pub essence_container_uls: Vec<[u8; 16]>,
    /// Absolute offset one past the end of this partition pack's KLV value; metadata
    /// and index data for the partition begin here.
    pub klv_value_end: u64,
}

/// Offsets within the partition pack's KLV *value* (after the 16-byte key and the BER
/// length), per the fixed layout the component design specifies.
mod value_offset {
    pub const KAG_SIZE: usize = 4;
    pub const THIS_PARTITION: usize = 8;
    pub const PREVIOUS_PARTITION: usize = 16;
    pub const FOOTER_PARTITION: usize = 24;
    pub const HEADER_BYTE_COUNT: usize = 32;
    pub const INDEX_BYTE_COUNT: usize = 40;
    pub const INDEX_SID: usize = 48;
    pub const BODY_SID: usize = 60;
    pub const OPERATIONAL_PATTERN: usize = 64;
    pub const BATCH: usize = 80;
}

/// Attempts to decode a Partition Pack at `data[0..]` (absolute file offset
/// `file_offset`). Returns `None` if the key does not match the prefix, or if the
/// value is too short to hold the fixed prologue through the operational pattern.
pub fn read_partition_pack(data: &[u8], file_offset: u64) -> Option<PartitionPack> {
    if data.len() < 16 {
        return None;
    }

    if data[0..13] != PARTITION_PACK_PREFIX {
        return None;
    }

    let kind = classify_kind(data[13]).unwrap_or(PartitionKind::Unknown);
    let status = classify_status(data[14]);

    let (value_len, ber_len) = decode_ber_length(&data[16..])?;
    let value_start = 16 + ber_len;
    let value = data.get(value_start..)?;

    if (value.len() as u64) < (value_offset::OPERATIONAL_PATTERN + 16) as u64 {
        return None;
    }

    let kag_size = u32be_at(value, value_offset::KAG_SIZE);
    let this_partition = u64be_at(value, value_offset::THIS_PARTITION);
    let previous_partition = u64be_at(value, value_offset::PREVIOUS_PARTITION);
    let footer_partition = u64be_at(value, value_offset::FOOTER_PARTITION);
    let header_byte_count = u64be_at(value, value_offset::HEADER_BYTE_COUNT);
    let index_byte_count = u64be_at(value, value_offset::INDEX_BYTE_COUNT);
    let index_sid = u32be_at(value, value_offset::INDEX_SID);
    let body_sid = u32be_at(value, value_offset::BODY_SID);

    let mut operational_pattern = [0u8; 16];
    if let Some(op) = value.get(value_offset::OPERATIONAL_PATTERN..value_offset::OPERATIONAL_PATTERN + 16) {
        operational_pattern.copy_from_slice(op);
    }

    let essence_container_uls = read_essence_container_batch(value);

    let klv_value_end = value_start as u64 + value_len;

    Some(PartitionPack {
        kind,
        status,
        file_offset,
        this_partition,
        previous_partition,
        footer_partition,
        header_byte_count,
        index_byte_count,
        index_sid,
        body_sid,
        kag_size,
        operational_pattern,
        essence_container_uls,
        klv_value_end,
    })
}

fn classify_kind(byte13: u8) -> Option<PartitionKind> {
    match byte13 {
        0x02 => Some(PartitionKind::Header),
        0x03 => Some(PartitionKind::Body),
        0x04 => Some(PartitionKind::Footer),
        _ => None,
    }
}

fn classify_status(byte14: u8) -> PartitionStatus {
    match byte14 {
        0x01 => PartitionStatus::OpenIncomplete,
        0x02 => PartitionStatus::ClosedIncomplete,
        0x03 => PartitionStatus::OpenComplete,
        0x04 => PartitionStatus::ClosedComplete,
        _ => PartitionStatus::Unknown,
    }
}

/// Reads the essence-container UL batch at offset `BATCH` within a partition pack's
/// value: a 4-byte batch count, a 4-byte item length (must equal 16), then
/// `batch_count` 16-byte ULs. An item length other than 16, or a batch that runs past
/// the available data, yields no ULs rather than misreading the tail as more entries.
fn read_essence_container_batch(value: &[u8]) -> Vec<[u8; 16]> {
    let batch_count = u32be_at(value, value_offset::BATCH) as usize;
    let item_length = u32be_at(value, value_offset::BATCH + 4);

    if item_length != 16 || batch_count == 0 {
        return Vec::new();
    }

    let entries_start = value_offset::BATCH + 8;
    let mut out = Vec::with_capacity(batch_count.min(4096));

    for i in 0..batch_count {
        let start = entries_start + i * 16;
        match value.get(start..start + 16) {
            Some(ul) => out.push(ul.try_into().expect("slice of len 16")),
            None => break,
        }
    }

    out
}

/// Derives the Operational Pattern name from an operational-pattern UL's bytes 12-13:
/// item complexity (byte 12) and package complexity (byte 13).
pub fn operational_pattern_name(ul: &[u8; 16]) -> String {
    let item = match ul[12] {
        0x01 => "1",
        0x02 => "2",
        0x03 => "3",
        0x10 => "Atom",
        _ => return "Unknown Operational Pattern".to_string(),
    };

    let package = match ul[13] {
        0x01 => "a",
        0x02 => "b",
        0x03 => "c",
        _ => return "Unknown Operational Pattern".to_string(),
    };

    format!("OP{}{}", item, package)
}

/// A lookup of essence-container UL codec bytes (byte 13 of a UL matching the
/// `06 0E 2B 34 04 01 01 .. 0D 01 03 01 02 ..` essence-container family) to a
/// human-readable label, purely informational.
const ESSENCE_CONTAINER_FAMILY_PREFIX: [u8; 4] = [0x06, 0x0e, 0x2b, 0x34];

pub fn essence_container_codec_name(ul: &[u8; 16]) -> Option<String> {
    if ul[0..4] != ESSENCE_CONTAINER_FAMILY_PREFIX || ul[4] != 0x04 {
        return None;
    }

    let name = match ul[13] {
        0x01 => "D-10",
        0x02 => "MPEG-2 Video",
        0x05 => "MPEG-2 LongGOP",
        0x06 => "AES3/PCM",
        0x07 => "JPEG 2000",
        0x10 => "AVC",
        0x17 => "VC-3",
        0x20 => "VC-1",
        0x1e => "AVC-Intra",
        0x21 => "HEVC",
        0x04 => "ProRes",
        0x0f => "FFV1",
        other => return Some(format!("Essence 0x{:02x}", other)),
    };

    Some(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_partition_value(op: [u8; 16], batch: &[[u8; 16]]) -> Vec<u8> {
        let mut v = vec![0u8; value_offset::BATCH + 8];
        v[value_offset::KAG_SIZE..value_offset::KAG_SIZE + 4].copy_from_slice(&1u32.to_be_bytes());
        v[value_offset::THIS_PARTITION..value_offset::THIS_PARTITION + 8]
            .copy_from_slice(&0u64.to_be_bytes());
        v[value_offset::OPERATIONAL_PATTERN..value_offset::OPERATIONAL_PATTERN + 16].copy_from_slice(&op);
        v[value_offset::BATCH..value_offset::BATCH + 4]
            .copy_from_slice(&(batch.len() as u32).to_be_bytes());
        v[value_offset::BATCH + 4..value_offset::BATCH + 8].copy_from_slice(&16u32.to_be_bytes());
        for ul in batch {
            v.extend_from_slice(ul);
        }
        v
    }

    fn op1a_ul() -> [u8; 16] {
        let mut ul = [0u8; 16];
        ul[12] = 0x01;
        ul[13] = 0x01;
        ul
    }

    #[test]
    fn decodes_header_closed_complete() {
        let value = build_partition_value(op1a_ul(), &[]);
        let mut data = PARTITION_PACK_PREFIX.to_vec();
        data.push(0x02); // Header
        data.push(0x04); // ClosedComplete
        data.push(value.len() as u8); // short-form BER length
        data.extend_from_slice(&value);

        let pack = read_partition_pack(&data, 0).expect("decodes");
        assert_eq!(pack.kind, PartitionKind::Header);
        assert_eq!(pack.status, PartitionStatus::ClosedComplete);
        assert_eq!(operational_pattern_name(&pack.operational_pattern), "OP1a");
    }

    #[test]
    fn reads_essence_container_batch() {
        let mut ul = [0u8; 16];
        ul[0..4].copy_from_slice(&ESSENCE_CONTAINER_FAMILY_PREFIX);
        ul[4] = 0x04;
        ul[13] = 0x10; // AVC

        let value = build_partition_value(op1a_ul(), &[ul]);
        let mut data = PARTITION_PACK_PREFIX.to_vec();
        data.push(0x02);
        data.push(0x04);
        data.push(value.len() as u8);
        data.extend_from_slice(&value);

        let pack = read_partition_pack(&data, 0).expect("decodes");
        assert_eq!(pack.essence_container_uls.len(), 1);
        assert_eq!(essence_container_codec_name(&pack.essence_container_uls[0]), Some("AVC".to_string()));
    }

    #[test]
    fn rejects_non_matching_key() {
        let data = [0u8; 32];
        assert!(read_partition_pack(&data, 0).is_none());
    }

    #[test]
    fn unrecognized_operational_pattern_bytes_yield_unknown_name() {
        let mut ul = [0u8; 16];
        ul[12] = 0xaa;
        ul[13] = 0xbb;
        assert_eq!(operational_pattern_name(&ul), "Unknown Operational Pattern");
    }

    /// A status byte with stray high bits set (e.g. `0x14`) must not be accepted as
    /// the low-nibble-equivalent valid status; only the four exact values are legal.
    #[test]
    fn malformed_status_byte_is_unknown_not_masked_to_a_valid_status() {
        let value = build_partition_value(op1a_ul(), &[]);
        let mut data = PARTITION_PACK_PREFIX.to_vec();
        data.push(0x02); // Header
        data.push(0x14); // would mask to 0x04 (ClosedComplete) if status were masked
        data.push(value.len() as u8);
        data.extend_from_slice(&value);

        let pack = read_partition_pack(&data, 0).expect("decodes");
        assert_eq!(pack.status, PartitionStatus::Unknown);
    }
}
