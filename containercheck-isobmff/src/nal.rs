// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The NAL walker (C7): samples selected frames and validates H.264/HEVC NAL
//! length-prefix structure and IDR presence, per the depth-based frame-selection
//! policy in the component design.

use std::collections::BTreeSet;

use containercheck_core::registry::Depth;

use crate::atoms::stsd::CodecType;
use crate::atoms::stss::StssAtom;

/// Selects the 0-based sample indices to walk for `depth`, out of `total_frames`
/// frames, consulting `stss` for keyframe indices where the policy calls for it.
pub fn select_frames(depth: Depth, total_frames: usize, stss: Option<&StssAtom>) -> Vec<usize> {
    if total_frames == 0 {
        return Vec::new();
    }

    match depth {
        Depth::Quick => Vec::new(),

        Depth::Standard => {
            let mut selected = BTreeSet::new();

            for i in 0..total_frames.min(5) {
                selected.insert(i);
            }

            if let Some(stss) = stss {
                for &one_based in stss.sync_samples.iter().take(50) {
                    if one_based >= 1 {
                        let idx = (one_based - 1) as usize;
                        if idx < total_frames {
                            selected.insert(idx);
                        }
                    }
                }
            }

            let step = (total_frames / 50).max(1);
            let mut i = 0;
            while i < total_frames {
                selected.insert(i);
                i += step;
            }

            selected.into_iter().take(200).collect()
        }

        Depth::Thorough => {
            let mut selected = BTreeSet::new();

            if let Some(stss) = stss {
                for &one_based in &stss.sync_samples {
                    if one_based >= 1 {
                        let idx = (one_based - 1) as usize;
                        if idx < total_frames {
                            selected.insert(idx);
                        }
                    }
                }
            }

            let mut i = 0;
            while i < total_frames {
                selected.insert(i);
                i += 10;
            }

            selected.into_iter().collect()
        }
    }
}

fn is_h264_idr(nal_header_byte: u8) -> bool {
    (nal_header_byte & 0x1f) == 5
}

/// HEVC's NAL unit type occupies bits 1-6 of the first NAL header byte.
fn is_h265_idr(nal_header_byte: u8) -> bool {
    let nal_unit_type = (nal_header_byte >> 1) & 0x3f;
    (16..=21).contains(&nal_unit_type)
}

fn read_length_prefix(data: &[u8], length_size: u8) -> Option<u64> {
    match length_size {
        1 => data.first().map(|&b| u64::from(b)),
        2 => data.get(0..2).map(|b| u64::from(u16::from_be_bytes([b[0], b[1]]))),
        4 => data.get(0..4).map(|b| u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))),
        _ => None,
    }
}

/// The outcome of walking one frame's NAL units.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameNalResult {
    pub has_idr: bool,
    /// The file offset of the length-prefix field of the first NAL whose declared
    /// length overflowed the frame; `None` if no overflow occurred.
    pub overflow_offset: Option<u64>,
    pub size_mismatch: bool,
}

/// Walks the NAL units within `frame_data` (already bounded to the file's actual
/// extent, which may be shorter than the sample's declared size if the file is
/// truncated), reading `nal_length_size`-byte big-endian length prefixes.
///
/// `frame_file_offset` is the absolute file offset of `frame_data[0]`, used only to
/// localize a diagnosed overflow.
pub fn walk_frame_nals(
    frame_data: &[u8],
    frame_file_offset: u64,
    nal_length_size: u8,
    codec_type: CodecType,
) -> FrameNalResult {
    let mut result = FrameNalResult::default();
    let frame_end = frame_data.len();
    let length_size = nal_length_size as usize;
    let mut cursor = 0usize;

    while cursor + length_size <= frame_end {
        let Some(nal_length) = read_length_prefix(&frame_data[cursor..], nal_length_size) else {
            break;
        };
        let nal_start = cursor + length_size;

        if nal_length == 0 || nal_start as u64 + nal_length > frame_end as u64 {
            result.overflow_offset.get_or_insert(frame_file_offset + cursor as u64);
            break;
        }

        if let Some(&header_byte) = frame_data.get(nal_start) {
            let is_idr = match codec_type {
                CodecType::H264 => is_h264_idr(header_byte),
                CodecType::H265 => is_h265_idr(header_byte),
                CodecType::Other => false,
            };
            if is_idr {
                result.has_idr = true;
            }
        }

        cursor = nal_start + nal_length as usize;
    }

    if result.overflow_offset.is_none() {
        let residual = frame_end.saturating_sub(cursor);
        if residual >= 4 {
            result.size_mismatch = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stss_with(indices: &[u32]) -> StssAtom {
        StssAtom { sync_samples: indices.to_vec(), declared_entry_count: indices.len() as u32 }
    }

    #[test]
    fn quick_depth_selects_nothing() {
        assert!(select_frames(Depth::Quick, 1000, None).is_empty());
    }

    #[test]
    fn standard_depth_caps_at_200() {
        let stss = stss_with(&(1..=500).collect::<Vec<_>>());
        let selected = select_frames(Depth::Standard, 10_000, Some(&stss));
        assert!(selected.len() <= 200);
        assert!(selected.contains(&0));
    }

    #[test]
    fn thorough_depth_includes_every_tenth_frame_and_all_keyframes() {
        let stss = stss_with(&[501]); // 1-based -> index 500
        let selected = select_frames(Depth::Thorough, 1000, Some(&stss));
        assert!(selected.contains(&0));
        assert!(selected.contains(&10));
        assert!(selected.contains(&500));
    }

    #[test]
    fn detects_idr_and_overflow() {
        let mut data = 4u32.to_be_bytes().to_vec(); // NAL length 4
        data.extend_from_slice(&[0x65, 0, 0, 0]); // H264 IDR slice NAL (type 5)

        let result = walk_frame_nals(&data, 1000, 4, CodecType::H264);
        assert!(result.has_idr);
        assert!(result.overflow_offset.is_none());
    }

    #[test]
    fn overflowing_length_halts_and_localizes() {
        let data = 9999u32.to_be_bytes().to_vec(); // declares far more than present

        let result = walk_frame_nals(&data, 2000, 4, CodecType::H264);
        assert_eq!(result.overflow_offset, Some(2000));
        assert!(!result.has_idr);
    }

    #[test]
    fn residual_bytes_flagged_as_size_mismatch() {
        let mut data = 2u32.to_be_bytes().to_vec();
        data.extend_from_slice(&[0x65, 0x00]);
        data.extend_from_slice(&[0, 0, 0, 0, 0]); // 5 residual bytes

        let result = walk_frame_nals(&data, 0, 4, CodecType::H264);
        assert!(result.size_mismatch);
    }

    #[test]
    fn hevc_idr_types_use_shifted_nal_unit_type() {
        let mut data = 2u32.to_be_bytes().to_vec();
        data.extend_from_slice(&[(19 << 1) as u8, 0x00]); // IDR_W_RADL = 19

        let result = walk_frame_nals(&data, 0, 4, CodecType::H265);
        assert!(result.has_idr);
    }
}
