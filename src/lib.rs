//! Ethernet MAC Simulation Core
//!
//! A discrete-event simulation core of an IEEE 802.3 Ethernet Media Access
//! Control sublayer: half-duplex CSMA/CD with binary exponential backoff and
//! optional frame bursting, full-duplex operation, and IEEE 802.3x PAUSE
//! flow control.
//!
//! This crate models the MAC sublayer only. The clock/event scheduler, the
//! physical medium, byte-level serialization policy, and upper-layer packet
//! generation are external collaborators the MAC core is generic over (see
//! [`clock`], [`ports`], and the bundled default [`codec`]).
//!
//! # Architecture
//!
//! - **MAC core** ([`mac`]): the Tx/Rx state machines, Collision Arbiter,
//!   and PAUSE Handler
//! - **Data model** ([`frame`], [`signal`]): frames, their wire envelopes,
//!   and the tagged sum over signal kinds
//! - **Configuration** ([`config`]): duplex mode, channel descriptors (rate
//!   classes), and per-instance builder options
//! - **Collaborator contracts** ([`clock`], [`ports`]): the virtual clock,
//!   timer scheduler, physical out-gate, and upper-layer push interface
//!
//! ## Standard Compliance
//!
//! - **IEEE 802.3**: frame sizes, interframe gap, CSMA/CD collision
//!   detection and binary exponential backoff, frame bursting
//! - **IEEE 802.3x**: PAUSE flow control
//!
//! # Example
//!
//! ```ignore
//! use ethermac_sim::config::MacConfig;
//! use ethermac_sim::frame::Frame;
//! use ethermac_sim::mac::Mac;
//! use ethermac_sim::testing::{ChannelHarness};
//!
//! let mut harness = ChannelHarness::new(
//!     MacConfig::new().with_local_address([2, 0, 0, 0, 0, 1]),
//!     MacConfig::new().with_local_address([2, 0, 0, 0, 0, 2]),
//!     100,
//! );
//! harness.submit_a(Frame::new([2, 0, 0, 0, 0, 2], 0x0800, vec![0xAB; 46]));
//! harness.run_to_quiescence();
//! assert_eq!(harness.upper_b().delivered().len(), 1);
//! ```

pub mod clock;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod mac;
pub mod ports;
pub mod queue;
pub mod rng;
pub mod signal;
pub mod stats;

#[cfg(test)]
pub mod testing;

pub use config::{ChannelDescriptor, Duplex, MacConfig};
pub use error::{ConfigError, DropReason, Error, ModelError, Result};
pub use frame::Frame;
pub use mac::{Mac, MacStateSnapshot, RxState, TxState};
pub use signal::{Signal, SignalKind, WireEvent};
