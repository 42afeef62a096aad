// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

const NAL_TYPE_VPS: u8 = 32;
const NAL_TYPE_SPS: u8 = 33;
const NAL_TYPE_PPS: u8 = 34;

/// HEVC decoder configuration record (`hvcC`), ISO/IEC 14496-15 section 8.3.3.1.
///
/// Parameter sets are stored as a sequence of NAL-unit-type-tagged arrays rather than
/// avcC's flat SPS/PPS lists, so this walks `numOfArrays` arrays and tallies VPS/SPS/PPS
/// presence by NAL unit type.
#[derive(Debug)]
pub struct HvcCAtom {
    pub configuration_version: u8,
    pub general_profile_idc: u8,
    pub general_level_idc: u8,
    pub nal_length_size: u8,
    pub vps_count: usize,
    pub sps_count: usize,
    pub pps_count: usize,
    pub truncated: bool,
}

impl HvcCAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);

        // Fixed header through lengthSizeMinusOne is 22 bytes, plus 1 byte numOfArrays.
        if payload.len() < 23 {
            return HvcCAtom {
                configuration_version: 0,
                general_profile_idc: 0,
                general_level_idc: 0,
                nal_length_size: 0,
                vps_count: 0,
                sps_count: 0,
                pps_count: 0,
                truncated: true,
            };
        }

        let configuration_version = reader.read_u8();
        let profile_byte = reader.read_u8();
        let general_profile_idc = profile_byte & 0x1f;
        reader.skip(4); // general_profile_compatibility_flags
        reader.skip(6); // general_constraint_indicator_flags
        let general_level_idc = reader.read_u8();
        reader.skip(2); // min_spatial_segmentation_idc (+ reserved)
        reader.skip(1); // parallelismType (+ reserved)
        reader.skip(1); // chromaFormat (+ reserved)
        reader.skip(1); // bitDepthLumaMinus8 (+ reserved)
        reader.skip(1); // bitDepthChromaMinus8 (+ reserved)
        reader.skip(2); // avgFrameRate
        let misc_byte = reader.read_u8();
        let nal_length_size = (misc_byte & 0x03) + 1;

        let num_arrays = reader.read_u8();

        let mut vps_count = 0;
        let mut sps_count = 0;
        let mut pps_count = 0;
        let mut truncated = false;

        'arrays: for _ in 0..num_arrays {
            if reader.remaining() < 3 {
                truncated = true;
                break;
            }
            let array_header = reader.read_u8();
            let nal_unit_type = array_header & 0x3f;
            let num_nalus = reader.read_u16be();

            for _ in 0..num_nalus {
                if reader.remaining() < 2 {
                    truncated = true;
                    break 'arrays;
                }
                let len = reader.read_u16be() as usize;
                if reader.remaining() < len {
                    truncated = true;
                    break 'arrays;
                }
                reader.skip(len);

                match nal_unit_type {
                    t if t == NAL_TYPE_VPS => vps_count += 1,
                    t if t == NAL_TYPE_SPS => sps_count += 1,
                    t if t == NAL_TYPE_PPS => pps_count += 1,
                    _ => {}
                }
            }
        }

        HvcCAtom {
            configuration_version,
            general_profile_idc,
            general_level_idc,
            nal_length_size,
            vps_count,
            sps_count,
            pps_count,
            truncated,
        }
    }

    pub fn has_vps(&self) -> bool {
        self.vps_count > 0
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

    fn fixed_header() -> Vec<u8> {
        let mut data = vec![1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x5a];
        data.extend_from_slice(&[0, 0]); // min_spatial_segmentation_idc
        data.push(0); // parallelismType
        data.push(0); // chromaFormat
        data.push(0); // bitDepthLumaMinus8
        data.push(0); // bitDepthChromaMinus8
        data.extend_from_slice(&[0, 0]); // avgFrameRate
        data.push(0xfc | 0x03); // constantFrameRate/numTemporalLayers/temporalIdNested/lengthSizeMinusOne=3
        data
    }

    #[test]
    fn reads_parameter_set_arrays() {
        let mut data = fixed_header();
        data.push(3); // numOfArrays

        for nal_type in [32u8, 33, 34] {
            data.push(nal_type); // array_completeness=0, reserved=0
            data.extend_from_slice(&1u16.to_be_bytes()); // numNalus
            data.extend_from_slice(&2u16.to_be_bytes()); // nalUnitLength
            data.extend_from_slice(&[0xaa, 0xbb]);
        }

        let hvcc = HvcCAtom::read(&data);
        assert_eq!(hvcc.nal_length_size, 4);
        assert!(hvcc.has_vps());
        assert!(hvcc.has_sps());
        assert!(hvcc.has_pps());
        assert!(!hvcc.truncated);
    }

    #[test]
    fn missing_vps_array_is_detected() {
        let mut data = fixed_header();
        data.push(1);
        data.push(33); // SPS only
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0xaa, 0xbb]);

        let hvcc = HvcCAtom::read(&data);
        assert!(!hvcc.has_vps());
        assert!(hvcc.has_sps());
    }

    #[test]
    fn too_short_record_is_truncated() {
        let hvcc = HvcCAtom::read(&[1, 2, 3]);
        assert!(hvcc.truncated);
    }
}
