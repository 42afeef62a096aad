// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::atoms::co64::Co64Atom;
use crate::atoms::ctts::CttsAtom;
use crate::atoms::stco::StcoAtom;
use crate::atoms::stsc::StscAtom;
use crate::atoms::stsd::StsdAtom;
use crate::atoms::stss::StssAtom;
use crate::atoms::stsz::StszAtom;
use crate::atoms::stts::SttsAtom;
use crate::atoms::BoxNode;

/// Sample table (`stbl`): every timing, size, location and sync-point table for one
/// track, gathered for cross-checking. Unlike a player, which only needs `ctts`/`stss`
/// for video tracks, this reads both unconditionally whenever present so the validator
/// can apply the video-specific checks itself.
#[derive(Debug)]
pub struct StblAtom {
    pub stsd: Option<StsdAtom>,
    pub stts: Option<SttsAtom>,
    pub stsc: Option<StscAtom>,
    pub stsz: Option<StszAtom>,
    pub stco: Option<StcoAtom>,
    pub co64: Option<Co64Atom>,
    pub ctts: Option<CttsAtom>,
    pub stss: Option<StssAtom>,
}

impl StblAtom {
    pub fn read(node: &BoxNode) -> Self {
        let stsd = node.find_child(b"stsd").map(StsdAtom::read);
        let stts = node.find_child(b"stts").map(|c| SttsAtom::read(&c.payload));
        let stsc = node.find_child(b"stsc").map(|c| StscAtom::read(&c.payload));
        let stsz = node.find_child(b"stsz").map(|c| StszAtom::read(&c.payload));
        let stco = node.find_child(b"stco").map(|c| StcoAtom::read(&c.payload));
        let co64 = node.find_child(b"co64").map(|c| Co64Atom::read(&c.payload));
        let ctts = node.find_child(b"ctts").map(|c| CttsAtom::read(&c.payload));
        let stss = node.find_child(b"stss").map(|c| StssAtom::read(&c.payload));

        let mut stsc = stsc;
        if let Some(stsc) = stsc.as_mut() {
            let total_chunks = match (&stco, &co64) {
                (Some(stco), _) => stco.chunk_offsets.len() as u64,
                (None, Some(co64)) => co64.chunk_offsets.len() as u64,
                (None, None) => 0,
            };
            stsc.resolve(total_chunks);
        }

        StblAtom { stsd, stts, stsc, stsz, stco, co64, ctts, stss }
    }

    pub fn total_chunks(&self) -> u64 {
        match (&self.stco, &self.co64) {
            (Some(stco), _) => stco.chunk_offsets.len() as u64,
            (None, Some(co64)) => co64.chunk_offsets.len() as u64,
            (None, None) => 0,
        }
    }

    pub fn chunk_offset(&self, chunk_index: u64) -> Option<u64> {
        match (&self.stco, &self.co64) {
            (Some(stco), _) => stco.chunk_offsets.get(chunk_index as usize).map(|&v| u64::from(v)),
            (None, Some(co64)) => co64.chunk_offsets.get(chunk_index as usize).copied(),
            (None, None) => None,
        }
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

    #[test]
    fn resolves_chunk_offsets_through_stsc() {
        let mut stco_payload = vec![0, 0, 0, 0];
        stco_payload.extend_from_slice(&2u32.to_be_bytes());
        stco_payload.extend_from_slice(&100u32.to_be_bytes());
        stco_payload.extend_from_slice(&200u32.to_be_bytes());

        let mut stsc_payload = vec![0, 0, 0, 0];
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());
        stsc_payload.extend_from_slice(&1u32.to_be_bytes());

        let mut stbl_box = wrap(b"stco", &stco_payload);
        stbl_box.extend(wrap(b"stsc", &stsc_payload));
        let stbl_box = wrap(b"stbl", &stbl_box);

        let tree = parse_box_tree(&stbl_box, 0, 6);
        let stbl = StblAtom::read(&tree[0]);

        assert_eq!(stbl.total_chunks(), 2);
        assert_eq!(stbl.chunk_offset(0), Some(100));
        assert_eq!(stbl.chunk_offset(1), Some(200));
        assert_eq!(stbl.stsc.unwrap().entries[0].first_sample, 0);
    }

    #[test]
    fn captures_ctts_and_stss_unlike_a_player() {
        let mut ctts_payload = vec![0, 0, 0, 0];
        ctts_payload.extend_from_slice(&1u32.to_be_bytes());
        ctts_payload.extend_from_slice(&1u32.to_be_bytes());
        ctts_payload.extend_from_slice(&0u32.to_be_bytes());

        let mut stss_payload = vec![0, 0, 0, 0];
        stss_payload.extend_from_slice(&1u32.to_be_bytes());
        stss_payload.extend_from_slice(&1u32.to_be_bytes());

        let mut stbl_box = wrap(b"ctts", &ctts_payload);
        stbl_box.extend(wrap(b"stss", &stss_payload));
        let stbl_box = wrap(b"stbl", &stbl_box);

        let tree = parse_box_tree(&stbl_box, 0, 6);
        let stbl = StblAtom::read(&tree[0]);

        assert!(stbl.ctts.is_some());
        assert!(stbl.stss.is_some());
    }
}
