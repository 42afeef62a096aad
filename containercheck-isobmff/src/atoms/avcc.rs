// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

/// AVC decoder configuration record (`avcC`), ISO/IEC 14496-15 section 5.3.3.1.
///
/// This only needs to surface the facts the validator turns into diagnostics —
/// whether parameter sets are present, the NAL length-prefix size, and whether the
/// record itself was truncated — not the full codec parameter set a decoder would need.
#[derive(Debug)]
pub struct AvcCAtom {
    pub configuration_version: u8,
    pub profile_indication: u8,
    pub level_indication: u8,
    pub nal_length_size: u8,
    pub sps_count: usize,
    pub pps_count: usize,
    pub truncated: bool,
}

impl AvcCAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);

        if payload.len() < 6 {
            return AvcCAtom {
                configuration_version: 0,
                profile_indication: 0,
                level_indication: 0,
                nal_length_size: 0,
                sps_count: 0,
                pps_count: 0,
                truncated: true,
            };
        }

        let configuration_version = reader.read_u8();
        let profile_indication = reader.read_u8();
        let _profile_compatibility = reader.read_u8();
        let level_indication = reader.read_u8();

        let length_size_byte = reader.read_u8();
        let nal_length_size = (length_size_byte & 0x03) + 1;

        let num_sps_byte = reader.read_u8();
        let num_sps = (num_sps_byte & 0x1f) as usize;

        let mut sps_count = 0;
        let mut truncated = false;

        for _ in 0..num_sps {
            if reader.remaining() < 2 {
                truncated = true;
                break;
            }
            let len = reader.read_u16be() as usize;
            if reader.remaining() < len {
                truncated = true;
                break;
            }
            reader.skip(len);
            sps_count += 1;
        }

        let mut pps_count = 0;
        if !truncated {
            if reader.remaining() < 1 {
                truncated = true;
            }
            else {
                let num_pps = reader.read_u8() as usize;
                for _ in 0..num_pps {
                    if reader.remaining() < 2 {
                        truncated = true;
                        break;
                    }
                    let len = reader.read_u16be() as usize;
                    if reader.remaining() < len {
                        truncated = true;
                        break;
                    }
                    reader.skip(len);
                    pps_count += 1;
                }
            }
        }

        AvcCAtom {
            configuration_version,
            profile_indication,
            level_indication,
            nal_length_size,
            sps_count,
            pps_count,
            truncated,
        }
    }

    pub fn has_sps(&self) -> bool {
        self.sps_count > 0
    }

    pub fn has_pps(&self) -> bool {
        self.pps_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> Vec<u8> {
        let mut data = vec![1, 0x64, 0x00, 0x1f, 0xff]; // version, profile, compat, level, lengthSizeMinusOne=3
        data.push(0xe1); // reserved bits | numSPS=1
        data.extend_from_slice(&3u16.to_be_bytes());
        data.extend_from_slice(&[0x67, 0x64, 0x00]);
        data.push(1); // numPPS
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0x68, 0xee]);
        data
    }

    #[test]
    fn reads_parameter_set_counts() {
        let avcc = AvcCAtom::read(&sample_record());
        assert_eq!(avcc.nal_length_size, 4);
        assert!(avcc.has_sps());
        assert!(avcc.has_pps());
        assert!(!avcc.truncated);
    }

    #[test]
    fn detects_truncation_mid_sps() {
        let mut data = vec![1, 0x64, 0x00, 0x1f, 0xff, 0xe1];
        data.extend_from_slice(&200u16.to_be_bytes()); // declares far more than present

        let avcc = AvcCAtom::read(&data);
        assert!(avcc.truncated);
    }

    #[test]
    fn too_short_record_is_truncated() {
        let avcc = AvcCAtom::read(&[1, 0x64]);
        assert!(avcc.truncated);
        assert!(!avcc.has_sps());
    }

    /// A payload of exactly 6 bytes (configurationVersion through numSPS, no SPS/PPS
    /// entries) fully contains every field the length-truncation guard checks and
    /// must not be reported as truncated.
    #[test]
    fn exactly_six_byte_payload_with_zero_sps_is_not_truncated() {
        let avcc = AvcCAtom::read(&[1, 0x64, 0x00, 0x1f, 0xff, 0x00]);
        assert!(!avcc.truncated);
        assert!(!avcc.has_sps());
    }
}
