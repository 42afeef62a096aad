// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::atoms::elst::ElstAtom;
use crate::atoms::BoxNode;

/// Edits container (`edts`): wraps an optional edit list.
#[derive(Debug, Default)]
pub struct EdtsAtom {
    pub elst: Option<ElstAtom>,
}

impl EdtsAtom {
    pub fn read(node: &BoxNode) -> Self {
        let elst = node.find_child(b"elst").map(|child| ElstAtom::read(&child.payload));
        EdtsAtom { elst }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::parse_box_tree;

    #[test]
    fn reads_nested_edit_list() {
        let mut elst_payload = vec![0, 0, 0, 0];
        elst_payload.extend_from_slice(&1u32.to_be_bytes());
        elst_payload.extend_from_slice(&90000u32.to_be_bytes());
        elst_payload.extend_from_slice(&(-1i32).to_be_bytes());
        elst_payload.extend_from_slice(&1i16.to_be_bytes());
        elst_payload.extend_from_slice(&0i16.to_be_bytes());

        let mut elst_box = (8 + elst_payload.len() as u32).to_be_bytes().to_vec();
        elst_box.extend_from_slice(b"elst");
        elst_box.extend_from_slice(&elst_payload);

        let mut edts_box = (8 + elst_box.len() as u32).to_be_bytes().to_vec();
        edts_box.extend_from_slice(b"edts");
        edts_box.extend_from_slice(&elst_box);

        let nodes = parse_box_tree(&edts_box, 0, 6);
        let edts = EdtsAtom::read(&nodes[0]);
        assert!(edts.elst.is_some());
        assert_eq!(edts.elst.unwrap().entries.len(), 1);
    }
}
