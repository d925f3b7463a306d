//! Wire signals: the envelope a [`crate::frame::Frame`] travels in
//! (SPEC_FULL.md section 3, "Polymorphism over signal kinds").

use crate::frame::Frame;

/// Monotonic identity for a signal, used to correlate start/update/end
/// events for the same transmission. `0` is reserved and never issued by
/// [`SignalIdGenerator`].
pub type SignalId = u64;

/// Tagged sum over the kinds of thing that can appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    /// A frame carrying upper-layer or PAUSE data.
    Data(Frame),
    /// A jam sequence appended to an aborted transmission.
    Jam,
    /// A filler signal sent during the interframe gap while bursting, to
    /// keep the half-duplex channel busy between burst frames.
    FilledIfg,
    /// A fragment left behind by a signal that does not reach completion
    /// (preamble/SFD framing is out of scope for this core; modeled here
    /// only for completeness of the tagged sum, see SPEC_FULL.md 9).
    Fragment,
}

/// A signal in flight on the simulated wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    /// Correlates start/update/end events for one transmission.
    pub id: SignalId,
    /// What is being sent.
    pub kind: SignalKind,
    /// Duration of the signal in nanoseconds, as currently scheduled.
    pub duration_ns: u64,
    /// Line rate claimed by the sender, in bits per second.
    pub bitrate_bps: u64,
    /// Duplex mode claimed by the sender.
    pub full_duplex: bool,
    /// Set once the signal has been damaged (collision, missed start).
    pub bit_error: bool,
    /// Simulation time this signal started, in nanoseconds.
    pub sending_time_ns: u64,
}

impl Signal {
    /// Total length of this signal in bits, derived from duration and rate.
    #[must_use]
    pub fn length_bits(&self) -> u64 {
        (self.duration_ns as u128 * self.bitrate_bps as u128 / 1_000_000_000) as u64
    }
}

/// One event emitted on the physical out-gate (SPEC_FULL.md section 6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    /// A new signal begins.
    Start(Signal),
    /// An in-progress signal is modified (duration/length change, e.g. a
    /// jam append or a burst-continuation truncation).
    Update(Signal),
    /// A signal completes or is finally aborted.
    Finish(Signal),
}

/// Issues unique, increasing [`SignalId`]s for one MAC instance.
#[derive(Debug, Default)]
pub struct SignalIdGenerator {
    next: SignalId,
}

impl SignalIdGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Issues the next identity.
    pub fn next_id(&mut self) -> SignalId {
        let id = self.next;
        self.next += 1;
        id
    }
}
