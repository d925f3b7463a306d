//! Configuration types for the MAC simulation core.
//!
//! Follows the builder pattern used throughout this crate's lineage:
//! `const fn` constructors, `#[must_use] with_*` methods, and a sensible
//! `Default`.

use crate::constants::{MacAddress, UNSPECIFIED_ADDRESS};
use crate::error::{ConfigError, ConfigResult};

/// Duplex mode of a MAC instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Duplex {
    /// Half-duplex: CSMA/CD with collision detection and binary exponential
    /// backoff applies.
    #[default]
    Half,
    /// Full-duplex: no collisions, no backoff.
    Full,
}

/// A rate-class channel descriptor (SPEC_FULL.md section 6).
///
/// Supplies the slot time, minimum on-wire frame sizes, and (for half-duplex
/// gigabit) frame bursting budgets used by the Tx Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDescriptor {
    /// Line rate in bits per second.
    bitrate_bps: u64,
    /// Slot time in bits, used to scale the backoff range.
    slot_time_bits: u32,
    /// Minimum on-wire frame length in bytes outside a burst (half-duplex).
    half_duplex_frame_min_bytes: u32,
    /// Minimum on-wire frame length in bytes while inside a burst.
    frame_in_burst_min_bytes: u32,
    /// Whether this rate class supports half-duplex operation at all.
    half_duplex_supported: bool,
    /// Whether frame bursting is available on this rate class.
    bursting_supported: bool,
    /// Maximum bytes sent within one burst.
    max_bytes_in_burst: u32,
    /// Maximum propagation delay before a cable-length fatal error fires.
    max_propagation_delay_ns: u64,
}

impl ChannelDescriptor {
    /// 10 Mb/s, half-duplex capable, no bursting.
    #[must_use]
    pub const fn ethernet_10m() -> Self {
        Self {
            bitrate_bps: 10_000_000,
            slot_time_bits: 512,
            half_duplex_frame_min_bytes: 64,
            frame_in_burst_min_bytes: 64,
            half_duplex_supported: true,
            bursting_supported: false,
            max_bytes_in_burst: 0,
            max_propagation_delay_ns: 25_600,
        }
    }

    /// 100 Mb/s, half-duplex capable, no bursting.
    #[must_use]
    pub const fn ethernet_100m() -> Self {
        Self {
            bitrate_bps: 100_000_000,
            slot_time_bits: 512,
            half_duplex_frame_min_bytes: 64,
            frame_in_burst_min_bytes: 64,
            half_duplex_supported: true,
            bursting_supported: false,
            max_bytes_in_burst: 0,
            max_propagation_delay_ns: 2_560,
        }
    }

    /// 1 Gb/s half-duplex, with carrier extension and frame bursting.
    #[must_use]
    pub const fn ethernet_1g_half_duplex() -> Self {
        Self {
            bitrate_bps: 1_000_000_000,
            slot_time_bits: 4096,
            half_duplex_frame_min_bytes: 520,
            frame_in_burst_min_bytes: 64,
            half_duplex_supported: true,
            bursting_supported: true,
            max_bytes_in_burst: 8192,
            max_propagation_delay_ns: 4_096,
        }
    }

    /// 10 Gb/s and above: full-duplex only.
    #[must_use]
    pub const fn ethernet_10g_full_duplex_only() -> Self {
        Self {
            bitrate_bps: 10_000_000_000,
            slot_time_bits: 512,
            half_duplex_frame_min_bytes: 64,
            frame_in_burst_min_bytes: 64,
            half_duplex_supported: false,
            bursting_supported: false,
            max_bytes_in_burst: 0,
            max_propagation_delay_ns: 2_560,
        }
    }

    /// Validates this descriptor against the requested duplex mode.
    pub fn validate_for(&self, duplex: Duplex) -> ConfigResult<()> {
        if duplex == Duplex::Half && !self.half_duplex_supported {
            return Err(ConfigError::HalfDuplexNotSupported);
        }
        if self.bitrate_bps == 0 || self.slot_time_bits == 0 {
            return Err(ConfigError::InvalidChannelParameter);
        }
        Ok(())
    }

    /// Line rate in bits per second.
    #[must_use]
    pub const fn bitrate_bps(&self) -> u64 {
        self.bitrate_bps
    }

    /// Slot time in bits.
    #[must_use]
    pub const fn slot_time_bits(&self) -> u32 {
        self.slot_time_bits
    }

    /// Minimum on-wire frame length in bytes, given whether a burst is active.
    #[must_use]
    pub const fn min_frame_bytes(&self, in_burst: bool) -> u32 {
        if in_burst {
            self.frame_in_burst_min_bytes
        } else {
            self.half_duplex_frame_min_bytes
        }
    }

    /// Whether frame bursting is available on this descriptor.
    #[must_use]
    pub const fn bursting_supported(&self) -> bool {
        self.bursting_supported
    }

    /// Maximum bytes sent within one burst.
    #[must_use]
    pub const fn max_bytes_in_burst(&self) -> u32 {
        self.max_bytes_in_burst
    }

    /// Maximum propagation delay, in nanoseconds, before a fatal cable-length
    /// error fires.
    #[must_use]
    pub const fn max_propagation_delay_ns(&self) -> u64 {
        self.max_propagation_delay_ns
    }
}

/// Configuration for a single MAC instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacConfig {
    duplex: Duplex,
    channel: ChannelDescriptor,
    local_address: MacAddress,
    promiscuous: bool,
    bursting_enabled: bool,
    rng_seed: u64,
}

impl Default for MacConfig {
    fn default() -> Self {
        Self {
            duplex: Duplex::Half,
            channel: ChannelDescriptor::ethernet_100m(),
            local_address: UNSPECIFIED_ADDRESS,
            promiscuous: false,
            bursting_enabled: false,
            rng_seed: 0,
        }
    }
}

impl MacConfig {
    /// Starts a new configuration from [`Default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duplex mode.
    #[must_use]
    pub const fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = duplex;
        self
    }

    /// Sets the channel descriptor (rate class).
    #[must_use]
    pub const fn with_channel(mut self, channel: ChannelDescriptor) -> Self {
        self.channel = channel;
        self
    }

    /// Sets the local MAC address.
    #[must_use]
    pub const fn with_local_address(mut self, address: MacAddress) -> Self {
        self.local_address = address;
        self
    }

    /// Enables or disables promiscuous reception.
    #[must_use]
    pub const fn with_promiscuous(mut self, promiscuous: bool) -> Self {
        self.promiscuous = promiscuous;
        self
    }

    /// Enables or disables half-duplex frame bursting.
    #[must_use]
    pub const fn with_bursting_enabled(mut self, enabled: bool) -> Self {
        self.bursting_enabled = enabled;
        self
    }

    /// Sets the seed for the per-instance backoff PRNG.
    #[must_use]
    pub const fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Validates the configuration, e.g. rejecting half-duplex on a
    /// full-duplex-only channel descriptor.
    pub fn validate(&self) -> ConfigResult<()> {
        self.channel.validate_for(self.duplex)?;
        if self.bursting_enabled && !self.channel.bursting_supported() {
            return Err(ConfigError::BurstingNotSupported);
        }
        Ok(())
    }

    /// Duplex mode.
    #[must_use]
    pub const fn duplex(&self) -> Duplex {
        self.duplex
    }

    /// Channel descriptor.
    #[must_use]
    pub const fn channel(&self) -> ChannelDescriptor {
        self.channel
    }

    /// Local MAC address.
    #[must_use]
    pub const fn local_address(&self) -> MacAddress {
        self.local_address
    }

    /// Whether promiscuous reception is enabled.
    #[must_use]
    pub const fn promiscuous(&self) -> bool {
        self.promiscuous
    }

    /// Whether half-duplex frame bursting is enabled.
    #[must_use]
    pub const fn bursting_enabled(&self) -> bool {
        self.bursting_enabled
    }

    /// Seed for the per-instance backoff PRNG.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }
}
