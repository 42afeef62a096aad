// containercheck
// Copyright (c) 2026 The containercheck Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BER length decoding (C2), per SMPTE ST 379-2.
//!
//! A length is either short form (the first byte directly, when < 0x80) or long form
//! (the first byte's low 7 bits give a byte count N, followed by N big-endian bytes).
//! Only `1 <= N <= 8` is legal; a decoder that sees `N == 0` or `N > 8` must reject the
//! length rather than guess a value, since the caller has no way to recover which KLV
//! boundary is correct once `N` is untrustworthy.

/// Decodes a BER length starting at `data[0]`. Returns `(length, bytes_consumed)`, or
/// `None` if `data` is too short to hold the declared form, or the long form's byte
/// count is `0` or greater than `8`.
pub fn decode_ber_length(data: &[u8]) -> Option<(u64, usize)> {
    let first = *data.first()?;

    if first < 0x80 {
        return Some((u64::from(first), 1));
    }

    let num_bytes = (first & 0x7f) as usize;
    if num_bytes == 0 || num_bytes > 8 {
        return None;
    }

    let length_bytes = data.get(1..1 + num_bytes)?;
    let mut buf = [0u8; 8];
    buf[8 - num_bytes..].copy_from_slice(length_bytes);

    Some((u64::from_be_bytes(buf), 1 + num_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_short_form() {
        assert_eq!(decode_ber_length(&[0x10]), Some((16, 1)));
    }

    #[test]
    fn decodes_long_form() {
        let data = [0x84, 0x00, 0x00, 0x01, 0x00];
        assert_eq!(decode_ber_length(&data), Some((256, 5)));
    }

    #[test]
    fn rejects_zero_byte_count() {
        assert_eq!(decode_ber_length(&[0x80]), None);
    }

    #[test]
    fn rejects_byte_count_over_eight() {
        let mut data = vec![0x89];
        data.extend_from_slice(&[0u8; 9]);
        assert_eq!(decode_ber_length(&data), None);
    }

    #[test]
    fn rejects_truncated_long_form() {
        assert_eq!(decode_ber_length(&[0x84, 0x00, 0x01]), None);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(decode_ber_length(&[]), None);
    }
}
