// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::{u32be_at, ByteReader};

use crate::atoms::avcc::AvcCAtom;
use crate::atoms::hvcc::HvcCAtom;
use crate::atoms::{AtomIterator, BoxNode, HEADER_SIZE};

/// The 70 bytes of fixed fields (reserved, data-reference index, and the QuickTime
/// video-sample-entry header) following a video sample entry's own 8-byte box header,
/// before any codec-configuration children (`avcC`/`hvcC`) can appear.
const VIDEO_SAMPLE_ENTRY_FIXED_FIELDS: u64 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
    H264,
    H265,
    Other,
}

/// The codec configuration found in a video track's first sample entry: enough to
/// drive the parameter-set presence diagnostics and the NAL walker's length-prefix
/// width, not a full decodable parameter set.
#[derive(Debug)]
pub struct CodecConfig {
    pub codec_type: CodecType,
    pub nal_length_size: u8,
    pub avcc: Option<AvcCAtom>,
    pub hvcc: Option<HvcCAtom>,
}

/// Sample description (`stsd`): a list of per-codec sample entries. Only the first
/// entry is decoded — every cross-check this crate runs operates on a track's primary
/// codec configuration, matching the component design's "within its first sample
/// entry" scope.
#[derive(Debug, Default)]
pub struct StsdAtom {
    pub declared_entry_count: u32,
    pub codec_config: Option<CodecConfig>,
}

impl StsdAtom {
    pub fn read(node: &BoxNode) -> Self {
        let payload = &node.payload;
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        let declared_entry_count = reader.read_u32be();

        if declared_entry_count == 0 || reader.remaining() < HEADER_SIZE as usize {
            return StsdAtom { declared_entry_count, codec_config: None };
        }

        let entry_data = &payload[reader.pos()..];
        let entry_base_offset = node.header.data_offset() + reader.pos() as u64;
        let codec_config = Self::read_first_entry(entry_data, entry_base_offset);

        StsdAtom { declared_entry_count, codec_config }
    }

    fn read_first_entry(entry_data: &[u8], base_offset: u64) -> Option<CodecConfig> {
        if (entry_data.len() as u64) < HEADER_SIZE {
            return None;
        }

        // The sample entry's own 4-byte size bounds this entry within `entry_data`,
        // which otherwise spans every remaining entry in the `stsd` payload; without
        // this, a second+ entry's children would be scanned as if they belonged to
        // the first.
        let declared_entry_size = u64::from(u32be_at(entry_data, 0));
        let entry_end = if declared_entry_size == 0 || declared_entry_size > entry_data.len() as u64 {
            entry_data.len()
        }
        else {
            declared_entry_size as usize
        };
        let entry_data = &entry_data[..entry_end];

        let four_cc: [u8; 4] = entry_data[4..8].try_into().ok()?;
        let fixed_end = (HEADER_SIZE + VIDEO_SAMPLE_ENTRY_FIXED_FIELDS) as usize;

        if entry_data.len() < fixed_end {
            return None;
        }

        let children_data = &entry_data[fixed_end..];
        let children_offset = base_offset + fixed_end as u64;

        let mut avcc = None;
        let mut hvcc = None;

        for (header, payload) in AtomIterator::new(children_data, children_offset) {
            match &header.four_cc {
                b"avcC" => avcc = Some(AvcCAtom::read(payload)),
                b"hvcC" => hvcc = Some(HvcCAtom::read(payload)),
                _ => {}
            }
        }

        let codec_type = match &four_cc {
            b"avc1" | b"avc3" => CodecType::H264,
            b"hvc1" | b"hev1" => CodecType::H265,
            _ => CodecType::Other,
        };

        let nal_length_size = match (&avcc, &hvcc) {
            (Some(a), _) => a.nal_length_size,
            (None, Some(h)) => h.nal_length_size,
            (None, None) => 4,
        };

        Some(CodecConfig { codec_type, nal_length_size, avcc, hvcc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::parse_box_tree;

    fn wrap(four_cc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut v = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        v.extend_from_slice(four_cc);
        v.extend_from_slice(payload);
        v
    }

    fn avc_sample_entry() -> Vec<u8> {
        let mut avcc_payload = vec![1, 0x64, 0x00, 0x1f, 0xff]; // lengthSizeMinusOne = 3
        avcc_payload.push(0xe1); // numSPS = 1
        avcc_payload.extend_from_slice(&3u16.to_be_bytes());
        avcc_payload.extend_from_slice(&[0x67, 0x64, 0x00]);
        avcc_payload.push(1); // numPPS
        avcc_payload.extend_from_slice(&2u16.to_be_bytes());
        avcc_payload.extend_from_slice(&[0x68, 0xee]);

        let mut entry = vec![0u8; VIDEO_SAMPLE_ENTRY_FIXED_FIELDS as usize];
        entry.extend(wrap(b"avcC", &avcc_payload));
        wrap(b"avc1", &entry)
    }

    #[test]
    fn locates_avcc_in_first_sample_entry() {
        let mut stsd_payload = vec![0, 0, 0, 0]; // version/flags
        stsd_payload.extend_from_slice(&1u32.to_be_bytes()); // entry_count
        stsd_payload.extend(avc_sample_entry());

        let stsd_box = wrap(b"stsd", &stsd_payload);
        let tree = parse_box_tree(&stsd_box, 0, 6);
        let stsd = StsdAtom::read(&tree[0]);

        let config = stsd.codec_config.expect("codec config");
        assert_eq!(config.codec_type, CodecType::H264);
        assert_eq!(config.nal_length_size, 4);
        assert!(config.avcc.unwrap().has_sps());
    }

    /// A second sample entry whose own child happens to look like an `avcC`/`hvcC`
    /// box must never be attributed to the first entry's codec config.
    #[test]
    fn second_sample_entry_is_not_scanned_for_first_entrys_codec_config() {
        let mut stsd_payload = vec![0, 0, 0, 0]; // version/flags
        stsd_payload.extend_from_slice(&2u32.to_be_bytes()); // entry_count = 2
        stsd_payload.extend(avc_sample_entry());

        // A bogus second entry with no avcC/hvcC child and a stray "avcC"-looking box
        // that would be misread as the first entry's child if entry-size bounding
        // were missing.
        let mut bogus_avcc_payload = vec![1, 0, 0, 0, 0xe0];
        bogus_avcc_payload.push(0); // numSPS = 0
        bogus_avcc_payload.push(0); // numPPS = 0
        let mut second_entry = vec![0u8; VIDEO_SAMPLE_ENTRY_FIXED_FIELDS as usize];
        second_entry.extend(wrap(b"avcC", &bogus_avcc_payload));
        stsd_payload.extend(wrap(b"avc1", &second_entry));

        let stsd_box = wrap(b"stsd", &stsd_payload);
        let tree = parse_box_tree(&stsd_box, 0, 6);
        let stsd = StsdAtom::read(&tree[0]);

        let config = stsd.codec_config.expect("codec config from first entry");
        // The first entry's own avcC (1 SPS, 1 PPS) must be what's reported, not the
        // second entry's empty one.
        assert!(config.avcc.unwrap().has_sps());
    }

    #[test]
    fn empty_stsd_has_no_codec_config() {
        let mut stsd_payload = vec![0, 0, 0, 0];
        stsd_payload.extend_from_slice(&0u32.to_be_bytes());
        let stsd_box = wrap(b"stsd", &stsd_payload);
        let tree = parse_box_tree(&stsd_box, 0, 6);
        let stsd = StsdAtom::read(&tree[0]);
        assert!(stsd.codec_config.is_none());
    }
}
