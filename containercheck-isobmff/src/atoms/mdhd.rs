// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;

fn parse_language(code: u16) -> String {
    // An ISO-639-2/T packed language code outside of these bounds is not valid.
    if !(0x400..=0x7fff).contains(&code) {
        String::new()
    }
    else {
        let chars =
            [((code >> 10) & 0x1f) as u8 + 0x60, ((code >> 5) & 0x1f) as u8 + 0x60, (code & 0x1f) as u8 + 0x60];

        String::from_utf8_lossy(&chars).to_string()
    }
}

/// Media header (`mdhd`): per-track timescale, duration, and language.
#[derive(Debug, Default)]
pub struct MdhdAtom {
    pub ctime: u64,
    pub mtime: u64,
    pub timescale: u32,
    pub duration: u64,
    pub language: String,
    /// Set when the payload was too short to hold the version's fixed fields.
    pub malformed: bool,
}

impl MdhdAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let raw = reader.read_u32be();
        let version = (raw >> 24) as u8;

        let expected_len: usize = if version == 0 { 24 } else { 36 };
        if payload.len() < expected_len {
            return MdhdAtom { malformed: true, ..Default::default() };
        }

        let mut mdhd = MdhdAtom::default();

        match version {
            0 => {
                mdhd.ctime = u64::from(reader.read_u32be());
                mdhd.mtime = u64::from(reader.read_u32be());
                mdhd.timescale = reader.read_u32be();
                mdhd.duration = match reader.read_u32be() {
                    u32::MAX => u64::MAX,
                    duration => u64::from(duration),
                };
            }
            1 => {
                mdhd.ctime = reader.read_u64be();
                mdhd.mtime = reader.read_u64be();
                mdhd.timescale = reader.read_u32be();
                mdhd.duration = reader.read_u64be();
            }
            _ => {
                mdhd.malformed = true;
                return mdhd;
            }
        }

        mdhd.language = parse_language(reader.read_u16be());
        mdhd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_version_0() {
        let mut data = vec![0, 0, 0, 0]; // version 0
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&0u32.to_be_bytes());
        data.extend_from_slice(&30000u32.to_be_bytes());
        data.extend_from_slice(&90000u32.to_be_bytes());
        data.extend_from_slice(&0x15c7u16.to_be_bytes()); // "eng"
        data.extend_from_slice(&0u16.to_be_bytes());

        let mdhd = MdhdAtom::read(&data);
        assert_eq!(mdhd.timescale, 30000);
        assert_eq!(mdhd.duration, 90000);
        assert_eq!(mdhd.language, "eng");
        assert!(!mdhd.malformed);
    }

    #[test]
    fn too_short_is_malformed() {
        let mdhd = MdhdAtom::read(&[0, 0, 0, 0]);
        assert!(mdhd.malformed);
    }
}
