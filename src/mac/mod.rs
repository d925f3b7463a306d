//! The MAC core: two coupled state machines driven by timers, upper-layer
//! submissions, and physical-layer signal events (SPEC_FULL.md sections 3-4).
//!
//! - [`tx`]: Tx Engine (IFG, transmit, jam, backoff, pause, burst filler)
//! - [`rx`]: Rx Engine, Signal Adapter, and Collision Arbiter
//! - [`pause`]: 802.3x PAUSE application and pending-pause bookkeeping
//!
//! # Example
//!
//! ```ignore
//! use ethermac_sim::config::MacConfig;
//! use ethermac_sim::mac::Mac;
//!
//! let mut mac = Mac::new(MacConfig::default(), clock, phy, upper, rng)?;
//! mac.submit(frame)?;
//! ```

mod pause;
mod rx;
mod tx;

use rand_chacha::ChaCha20Rng;

use crate::clock::{Clock, TimerKind};
use crate::config::MacConfig;
use crate::constants::MacAddress;
use crate::error::{ConfigResult, ModelResult};
use crate::frame::Frame;
use crate::ports::{PhysicalPort, UpperLayer};
use crate::rng::RngCore;
use crate::signal::{Signal, SignalId, SignalIdGenerator, WireEvent};
use crate::stats::Statistics;
use crate::queue::TxQueue;

/// Transmit-side state (SPEC_FULL.md section 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxState {
    /// No frame owned, nothing scheduled.
    #[default]
    Idle,
    /// Silently waiting out the interframe gap (not bursting).
    WaitIfg,
    /// Actively sending a filled-IFG burst filler.
    SendIfg,
    /// Actively sending a frame or jam-extended frame.
    Transmitting,
    /// Sending the appended jam sequence after a detected collision.
    Jamming,
    /// Waiting out a backoff period chosen after a collision.
    Backoff,
    /// Honoring a received PAUSE request.
    Pause,
}

/// Receive-side state (SPEC_FULL.md section 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RxState {
    /// No reception in progress.
    #[default]
    RxIdle,
    /// A reception is in progress with no conflicting transmission.
    Receiving,
    /// A reception overlaps our own transmission; channel is jammed.
    RxCollision,
    /// The link just reconnected mid-reception; this signal is being
    /// drained but will not be delivered.
    RxReconnect,
}

/// A point-in-time dump of MAC state, for diagnostics and tests
/// (SPEC_FULL.md section 10, supplemented `printState()` behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacStateSnapshot {
    /// Current Tx state.
    pub tx_state: TxState,
    /// Current Rx state.
    pub rx_state: RxState,
    /// Collisions suffered by the frame currently being sent.
    pub backoff_count: u8,
    /// Frames sent so far in the current burst.
    pub frames_in_burst: u32,
    /// Bytes sent so far in the current burst.
    pub bytes_in_burst: u32,
    /// Whether the link is connected.
    pub connected: bool,
}

/// One MAC instance. Owns its four collaborators, generic so tests can
/// supply deterministic stand-ins (see [`crate::testing`]).
pub struct Mac<C, P, U, R> {
    config: MacConfig,
    clock: C,
    phy: P,
    upper: U,
    rng: R,

    tx_state: TxState,
    rx_state: RxState,

    queue: TxQueue,
    current_tx_frame: Option<Frame>,
    current_tx_signal: Option<Signal>,
    id_gen: SignalIdGenerator,

    backoff_count: u8,
    frames_in_burst: u32,
    bytes_in_burst: u32,
    last_tx_finish_time_ns: Option<u64>,

    pending_pause_units: u16,

    active_reception: Option<(SignalId, u64)>,
    channel_busy_since_ns: Option<u64>,

    connected: bool,

    stats: Statistics,
}

impl<C, P, U, R> Mac<C, P, U, R>
where
    C: Clock,
    P: PhysicalPort,
    U: UpperLayer,
    R: RngCore,
{
    /// Builds a new MAC instance owning its collaborators. The link starts
    /// connected.
    ///
    /// Rejects a `config` that cannot be honored at all, e.g. half-duplex
    /// requested on a full-duplex-only channel descriptor
    /// ([`MacConfig::validate`]).
    pub fn new(config: MacConfig, clock: C, phy: P, upper: U, rng: R) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            phy,
            upper,
            rng,
            tx_state: TxState::Idle,
            rx_state: RxState::RxIdle,
            queue: TxQueue::new(),
            current_tx_frame: None,
            current_tx_signal: None,
            id_gen: SignalIdGenerator::new(),
            backoff_count: 0,
            frames_in_burst: 0,
            bytes_in_burst: 0,
            last_tx_finish_time_ns: None,
            pending_pause_units: 0,
            active_reception: None,
            channel_busy_since_ns: None,
            connected: true,
            stats: Statistics::default(),
        })
    }

    /// This instance's configured local address.
    #[must_use]
    pub fn local_address(&self) -> MacAddress {
        self.config.local_address()
    }

    /// Read-only access to the running statistics.
    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Shared access to the bound clock, e.g. for a host driving loop to
    /// check for due timers.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the bound clock.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Shared access to the bound physical port, e.g. for a test to inspect
    /// recorded emissions.
    pub fn phy(&self) -> &P {
        &self.phy
    }

    /// Mutable access to the bound physical port, e.g. for a harness to
    /// drain newly-emitted events.
    pub fn phy_mut(&mut self) -> &mut P {
        &mut self.phy
    }

    /// Shared access to the bound upper layer, e.g. for a test to inspect
    /// delivered frames.
    pub fn upper(&self) -> &U {
        &self.upper
    }

    /// A diagnostic snapshot of current state (SPEC_FULL.md section 10).
    #[must_use]
    pub fn debug_state(&self) -> MacStateSnapshot {
        MacStateSnapshot {
            tx_state: self.tx_state,
            rx_state: self.rx_state,
            backoff_count: self.backoff_count,
            frames_in_burst: self.frames_in_burst,
            bytes_in_burst: self.bytes_in_burst,
            connected: self.connected,
        }
    }

    /// Toggles the link. On disconnect, all timers are cancelled, burst
    /// counters clear, and any in-flight reception is abandoned
    /// (SPEC_FULL.md section 3, invariant 6). On reconnect, a frame left
    /// over from before the disconnect (if any) resumes sending.
    pub fn on_link_change(&mut self, connected: bool) -> ModelResult<()> {
        self.connected = connected;
        if !connected {
            self.clock.cancel_all();
            self.frames_in_burst = 0;
            self.bytes_in_burst = 0;
            self.active_reception = None;
            self.channel_busy_since_ns = None;
            self.tx_state = TxState::Idle;
            self.rx_state = RxState::RxIdle;
            log::warn!("link down: timers cancelled, burst state cleared");
            Ok(())
        } else {
            log::debug!("link up");
            self.try_begin_send_frame()
        }
    }

    fn now(&self) -> u64 {
        self.clock.now()
    }

    fn is_half_duplex(&self) -> bool {
        self.config.duplex() == crate::config::Duplex::Half
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.current_tx_signal.is_some()
                == matches!(
                    self.tx_state,
                    TxState::SendIfg | TxState::Transmitting | TxState::Jamming
                ),
            "invariant 2 violated: current_tx_signal presence must track tx_state"
        );
        debug_assert!(
            self.backoff_count <= crate::constants::MAX_ATTEMPTS,
            "invariant 4 violated: backoff_count exceeded MAX_ATTEMPTS"
        );
        if !self.is_half_duplex() {
            debug_assert!(
                !matches!(self.rx_state, RxState::RxCollision),
                "invariant 5 violated: collision state reached in full-duplex"
            );
        }
    }

    /// Dispatches a timer expiry to the appropriate handler
    /// (SPEC_FULL.md section 4.1, 4.4).
    pub fn on_timer(&mut self, kind: TimerKind) -> ModelResult<()> {
        let result = match kind {
            TimerKind::EndIfg => self.on_end_ifg(),
            TimerKind::EndTx => self.on_end_tx(),
            TimerKind::EndBackoff => self.on_end_backoff(),
            TimerKind::EndPause => self.on_end_pause(),
        };
        self.assert_invariants();
        result
    }

    /// Dispatches an incoming wire event from the physical layer to the
    /// Signal Adapter (SPEC_FULL.md section 4.2).
    pub fn on_wire_event(&mut self, event: WireEvent) -> ModelResult<()> {
        let result = self.on_signal_event(event);
        self.assert_invariants();
        result
    }
}

impl<C, P, U> Mac<C, P, U, ChaCha20Rng>
where
    C: Clock,
    P: PhysicalPort,
    U: UpperLayer,
{
    /// Builds a new MAC instance whose backoff RNG is a [`ChaCha20Rng`]
    /// seeded from `config.rng_seed()` (SPEC_FULL.md section 10,
    /// "Randomness": "seeded per MAC instance").
    pub fn with_seed(config: MacConfig, clock: C, phy: P, upper: U) -> ConfigResult<Self> {
        let rng = crate::rng::chacha_from_u64_seed(config.rng_seed());
        Self::new(config, clock, phy, upper, rng)
    }
}
