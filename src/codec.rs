//! Frame Codec: padding, FCS, and preamble/SFD framing (SPEC_FULL.md 1, 6).
//!
//! The simulation core treats byte-level serialization as an external
//! collaborator's concern; this module is the default implementation used
//! by the bundled test harness and by hosts that have no reason to supply
//! their own.

use crate::constants::{FCS_BYTES, MIN_ETHERNET_FRAME_BYTES, PREAMBLE_BYTES, SFD_BYTES};
use crate::frame::Frame;

/// Pads `payload_len` (the frame's data length, header included) up to the
/// minimum MAC frame length, returning the padding byte count.
#[must_use]
pub fn padding_bytes(data_length: u32) -> u32 {
    MIN_ETHERNET_FRAME_BYTES.saturating_sub(data_length)
}

/// Total on-wire length of `frame` in bytes, including FCS but excluding
/// preamble/SFD, after padding is applied.
#[must_use]
pub fn padded_frame_length(frame: &Frame) -> u32 {
    let data_length = frame.data_length_bytes();
    let padded = data_length.max(MIN_ETHERNET_FRAME_BYTES);
    padded + FCS_BYTES
}

/// Total on-wire length in bytes including preamble and SFD.
#[must_use]
pub fn on_wire_length(frame: &Frame) -> u32 {
    PREAMBLE_BYTES + SFD_BYTES + padded_frame_length(frame)
}

/// CRC-32 (IEEE 802.3 polynomial) over header + payload, used as the FCS.
#[must_use]
pub fn compute_fcs(frame: &Frame) -> u32 {
    let mut bytes = Vec::with_capacity(frame.payload.len() + 14);
    bytes.extend_from_slice(&frame.dest);
    bytes.extend_from_slice(&frame.src);
    bytes.extend_from_slice(&frame.ethertype.to_be_bytes());
    bytes.extend_from_slice(&frame.payload);
    crc32(&bytes)
}

/// Verifies that `frame.bit_error` is unset and recomputing the FCS would
/// succeed; truncated/aborted frames are expected to have `bit_error` set
/// by the Tx/Rx engine rather than by this function.
#[must_use]
pub fn verify(frame: &Frame) -> bool {
    !frame.bit_error && frame.data_length_bytes() <= crate::constants::MAX_ETHERNET_FRAME_BYTES
}

fn crc32(data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = 0xFFFF_FFFFu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (POLY & mask);
        }
    }
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_brings_short_frame_to_minimum() {
        let f = Frame::new([0; 6], 0x0800, vec![0u8; 4]);
        assert_eq!(padding_bytes(f.data_length_bytes()), MIN_ETHERNET_FRAME_BYTES - 18);
    }

    #[test]
    fn padded_length_never_below_minimum_with_fcs() {
        let f = Frame::new([0; 6], 0x0800, vec![]);
        assert_eq!(padded_frame_length(&f), 64);
    }

    #[test]
    fn padded_length_grows_with_payload() {
        let f = Frame::new([0; 6], 0x0800, vec![0u8; 1000]);
        assert_eq!(padded_frame_length(&f), 1000 + 14 + 4);
    }

    #[test]
    fn fcs_is_deterministic() {
        let f = Frame::new([1; 6], 0x0800, vec![9, 9, 9]);
        assert_eq!(compute_fcs(&f), compute_fcs(&f));
    }

    #[test]
    fn fcs_changes_with_payload() {
        let a = Frame::new([1; 6], 0x0800, vec![1]);
        let b = Frame::new([1; 6], 0x0800, vec![2]);
        assert_ne!(compute_fcs(&a), compute_fcs(&b));
    }

    #[test]
    fn verify_rejects_bit_error_frames() {
        let mut f = Frame::new([0; 6], 0x0800, vec![0u8; 46]);
        assert!(verify(&f));
        f.bit_error = true;
        assert!(!verify(&f));
    }
}
