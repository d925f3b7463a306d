//! Protocol and simulation constants shared by the MAC core.
//!
//! Values come from IEEE 802.3 and from the channel descriptors in
//! `SPEC_FULL.md` section 6.

// =============================================================================
// Frame sizing
// =============================================================================

/// Bytes of preamble (alternating `0x55`) preceding every frame on the wire.
pub const PREAMBLE_BYTES: u32 = 7;

/// Start-of-frame delimiter byte count (`0xD5`).
pub const SFD_BYTES: u32 = 1;

/// Bytes appended to a signal under collision to form the jam sequence.
pub const JAM_SIGNAL_BYTES: u32 = 4;

/// Minimum MAC frame length in bytes, excluding the 4-byte FCS.
pub const MIN_ETHERNET_FRAME_BYTES: u32 = 60;

/// Minimum MAC frame length in bytes, including the 4-byte FCS.
pub const MIN_ETHERNET_FRAME_BYTES_WITH_FCS: u32 = 64;

/// Maximum untagged MAC frame length in bytes, including the 4-byte FCS.
pub const MAX_ETHERNET_FRAME_BYTES: u32 = 1518;

/// FCS length in bytes.
pub const FCS_BYTES: u32 = 4;

/// Length in bits of the interframe gap.
pub const INTERFRAME_GAP_BITS: u32 = 96;

// =============================================================================
// PAUSE flow control (IEEE 802.3x)
// =============================================================================

/// One PAUSE time unit, in bit-times.
pub const PAUSE_UNIT_BITS: u32 = 512;

/// EtherType identifying a MAC control frame (carries PAUSE).
pub const ETHERTYPE_FLOW_CONTROL: u16 = 0x8808;

/// MAC control opcode for PAUSE.
pub const PAUSE_OPCODE: u16 = 0x0001;

// =============================================================================
// Collision / backoff (IEEE 802.3 4.2.3.2.5, binary exponential backoff)
// =============================================================================

/// Maximum number of transmission attempts (1 initial + 15 retries) before a
/// frame is dropped with [`crate::error::DropReason::RetryLimitReached`].
pub const MAX_ATTEMPTS: u8 = 16;

/// Backoff count at which the slot range stops growing (range caps at 1024).
pub const BACKOFF_RANGE_LIMIT: u8 = 10;

/// Largest backoff slot range, reached once `backoff_count >= BACKOFF_RANGE_LIMIT`.
pub const MAX_BACKOFF_SLOTS: u32 = 1024;

// =============================================================================
// Destination / addressing
// =============================================================================

/// A 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// The broadcast MAC address.
pub const BROADCAST_ADDRESS: MacAddress = [0xFF; 6];

/// The unspecified (all-zero) MAC address, used as a "fill in my address" sentinel.
pub const UNSPECIFIED_ADDRESS: MacAddress = [0x00; 6];
