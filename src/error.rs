//! Error types for the MAC simulation core.
//!
//! Errors are organized by domain, per `SPEC_FULL.md` section 7:
//! - [`ConfigError`]: invalid [`crate::config::MacConfig`] / channel descriptor construction
//! - [`ModelError`]: fatal, simulation-halting conditions (misconfigured scenarios)
//! - [`DropReason`]: recoverable conditions under which a frame is discarded
//!
//! The unified [`Error`] enum composes `ConfigError` and `ModelError` via
//! `From`, for callers that want to handle both domains under one type. No
//! single [`crate::mac::Mac`] method returns `Error` directly:
//! [`crate::mac::Mac::new`] returns [`ConfigResult`], while the running
//! entry points (`submit`, `on_timer`, `on_wire_event`, `on_link_change`)
//! return [`ModelResult`]. `DropReason` is not wrapped by `Error`: a drop is
//! expected control flow, not a failure of the simulation itself, so it is
//! carried on a `PacketDropped` event instead of returned as an `Err`.

// =============================================================================
// Configuration errors
// =============================================================================

/// Errors raised while building a [`crate::config::MacConfig`] or
/// [`crate::config::ChannelDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A half-duplex configuration was requested on a rate class that is
    /// full-duplex only (e.g. 10 Gb/s and above).
    HalfDuplexNotSupported,
    /// A burst configuration was supplied for a rate class or duplex mode
    /// that does not support frame bursting.
    BurstingNotSupported,
    /// A zero bitrate, slot time, or burst budget was supplied.
    InvalidChannelParameter,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::HalfDuplexNotSupported => {
                "half-duplex is not supported on this channel descriptor"
            }
            ConfigError::BurstingNotSupported => "frame bursting is not supported here",
            ConfigError::InvalidChannelParameter => "invalid channel parameter",
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// Model errors (fatal, per SPEC_FULL.md 7)
// =============================================================================

/// Fatal, simulation-halting conditions: the scenario driving the MAC is
/// internally inconsistent. These are never panicked; the host simulation
/// engine decides how to surface them (abort the run, report the offending
/// scenario, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    /// A signal claimed a duplex mode that does not match ours.
    DuplexMismatch,
    /// Measured propagation delay exceeded the channel's configured maximum
    /// (the cable is effectively too long for the rate class).
    ExcessivePropagationDelay,
    /// An upper-layer packet named our own address as its destination.
    SelfAddressedPacket,
    /// An upper-layer packet exceeded [`crate::constants::MAX_ETHERNET_FRAME_BYTES`].
    FrameTooLong,
    /// A timer fired while the MAC was not in a state that expected it.
    UnexpectedTimerExpiry,
    /// A reception update/end referenced an identity different from the one
    /// already active (mixed reception is not supported).
    MixedReception,
    /// A transmission completed with no retained signal to finish.
    MissingTxSignal,
}

impl core::fmt::Display for ModelError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ModelError {
    /// Returns a human-readable description of the error.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ModelError::DuplexMismatch => "peer duplex mode does not match ours",
            ModelError::ExcessivePropagationDelay => "propagation delay exceeds channel maximum",
            ModelError::SelfAddressedPacket => "packet addressed to our own MAC",
            ModelError::FrameTooLong => "frame exceeds maximum Ethernet frame length",
            ModelError::UnexpectedTimerExpiry => "timer fired in an unexpected state",
            ModelError::MixedReception => "mixed reception: conflicting signal identity",
            ModelError::MissingTxSignal => "end of transmission with no retained signal",
        }
    }
}

impl std::error::Error for ModelError {}

// =============================================================================
// Drop reasons (recoverable, per SPEC_FULL.md 7)
// =============================================================================

/// Why a packet was discarded rather than delivered. Not an [`Error`]: this
/// is expected control flow, carried on a `PacketDropped` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The interface was disconnected at submission or reception time.
    InterfaceDown,
    /// The frame was discarded after [`crate::constants::MAX_ATTEMPTS`]
    /// collisions on the same frame.
    RetryLimitReached,
    /// The frame's bit-error flag was set, its CRC did not verify, or its
    /// length was out of bounds.
    IncorrectlyReceived,
    /// The destination address did not match ours and promiscuous mode is
    /// off.
    NotAddressedToUs,
}

impl core::fmt::Display for DropReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DropReason {
    /// Returns a human-readable description of the drop reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DropReason::InterfaceDown => "interface down",
            DropReason::RetryLimitReached => "retry limit reached",
            DropReason::IncorrectlyReceived => "incorrectly received",
            DropReason::NotAddressedToUs => "not addressed to us",
        }
    }
}

// =============================================================================
// Unified error
// =============================================================================

/// Unified error type returned by fallible [`crate::mac::Mac`] entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A configuration error, see [`ConfigError`].
    Config(ConfigError),
    /// A fatal model error, see [`ModelError`].
    Model(ModelError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "configuration error: {e}"),
            Error::Model(e) => write!(f, "model error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<ModelError> for Error {
    fn from(e: ModelError) -> Self {
        Error::Model(e)
    }
}

/// Result alias for configuration construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for fatal model errors.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result alias for the unified error type.
pub type Result<T> = core::result::Result<T, Error>;
