// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use containercheck_core::io::ByteReader;
use log::warn;

/// Track handler type, identifying what kind of media a `trak` carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerType {
    Video,
    Sound,
    Subtitle,
    Metadata,
    Text,
    Other([u8; 4]),
}

/// Handler reference (`hdlr`).
#[derive(Debug)]
pub struct HdlrAtom {
    pub handler_type: HandlerType,
    pub name: String,
}

impl HdlrAtom {
    pub fn read(payload: &[u8]) -> Self {
        let mut reader = ByteReader::new(payload);
        let _version_flags = reader.read_u32be();
        // Always 0 for MP4; for QuickTime this holds the component type, which is
        // not used for handler-type identification.
        let _component_type = reader.read_u32be();

        let handler_type = match &reader.read_array::<4>() {
            b"vide" => HandlerType::Video,
            b"soun" => HandlerType::Sound,
            b"meta" => HandlerType::Metadata,
            b"subt" => HandlerType::Subtitle,
            b"text" => HandlerType::Text,
            other => {
                warn!("unknown handler type {:?}", String::from_utf8_lossy(other));
                HandlerType::Other(*other)
            }
        };

        reader.skip(12); // reserved

        let name_bytes = reader.read_bytes(reader.remaining());
        let name = String::from_utf8_lossy(name_bytes).trim_end_matches('\0').to_string();

        HdlrAtom { handler_type, name }
    }

    pub fn is_video(&self) -> bool {
        self.handler_type == HandlerType::Video
    }
}
