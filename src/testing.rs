//! Host-only test collaborators: a manually-advanced clock, recording
//! physical/upper-layer stand-ins, a deterministic RNG stub, and a
//! two-MAC channel harness (SPEC_FULL.md section 10, "Test tooling").
//!
//! Mirrors the `MockMdioBus`/`MockDelay` write-log style this crate's
//! lineage uses for host-side driver tests.

use std::collections::HashMap;

use crate::clock::{Clock, TimerKind};
use crate::config::MacConfig;
use crate::frame::Frame;
use crate::mac::Mac;
use crate::ports::{PhysicalPort, UpperLayer};
use crate::rng::RngCore;
use crate::signal::WireEvent;

/// Installs a best-effort logger so `RUST_LOG=trace cargo test -- --nocapture`
/// surfaces state-machine transitions from a [`ChannelHarness`] run. Safe to
/// call from multiple tests; only the first call takes effect.
pub fn init_test_logging() {
    let _ = env_logger::try_init();
}

/// A manually-advanced virtual clock and timer scheduler.
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ns: u64,
    timers: HashMap<TimerKind, u64>,
}

impl FakeClock {
    /// Creates a clock starting at t=0 with nothing scheduled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The next outstanding timer and its absolute fire time, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<(TimerKind, u64)> {
        self.timers.iter().map(|(&k, &t)| (k, t)).min_by_key(|&(_, t)| t)
    }

    /// Advances the clock to `t`. `t` must not be earlier than `now()`.
    pub fn advance_to(&mut self, t: u64) {
        assert!(t >= self.now_ns, "FakeClock cannot move backwards");
        self.now_ns = t;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> u64 {
        self.now_ns
    }

    fn schedule(&mut self, kind: TimerKind, delay_ns: u64) {
        self.timers.insert(kind, self.now_ns + delay_ns);
    }

    fn cancel(&mut self, kind: TimerKind) {
        self.timers.remove(&kind);
    }
}

/// A physical out-gate that records every emitted signal event.
#[derive(Debug, Default)]
pub struct RecordingPhy {
    emitted: Vec<WireEvent>,
}

impl RecordingPhy {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `Start` events emitted so far.
    #[must_use]
    pub fn starts(&self) -> usize {
        self.emitted
            .iter()
            .filter(|e| matches!(e, WireEvent::Start(_)))
            .count()
    }

    /// Number of `Finish` events emitted so far.
    #[must_use]
    pub fn finishes(&self) -> usize {
        self.emitted
            .iter()
            .filter(|e| matches!(e, WireEvent::Finish(_)))
            .count()
    }

    /// All events emitted so far, oldest first.
    #[must_use]
    pub fn emitted(&self) -> &[WireEvent] {
        &self.emitted
    }

    /// Removes and returns events recorded since the last drain.
    pub fn drain_new(&mut self, since: &mut usize) -> Vec<WireEvent> {
        let new = self.emitted[*since..].to_vec();
        *since = self.emitted.len();
        new
    }
}

impl PhysicalPort for RecordingPhy {
    fn emit(&mut self, event: WireEvent) {
        self.emitted.push(event);
    }
}

/// An upper layer that records every delivered frame.
#[derive(Debug, Default)]
pub struct RecordingUpperLayer {
    delivered: Vec<Frame>,
}

impl RecordingUpperLayer {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames delivered so far, oldest first.
    #[must_use]
    pub fn delivered(&self) -> &[Frame] {
        &self.delivered
    }
}

impl UpperLayer for RecordingUpperLayer {
    fn deliver(&mut self, frame: Frame) {
        self.delivered.push(frame);
    }
}

/// An `RngCore` stub that always produces a fixed value, for deterministic
/// backoff-slot tests (SPEC_FULL.md section 8, scenario S3).
#[derive(Debug, Clone, Copy)]
pub struct FixedRng {
    value: u32,
}

impl FixedRng {
    /// Creates a generator that always returns `value` from `next_u32`.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self { value }
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.value
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.value)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            chunk.copy_from_slice(&self.value.to_le_bytes()[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

type HarnessMac = Mac<FakeClock, RecordingPhy, RecordingUpperLayer, FixedRng>;

/// Wires two MAC instances back-to-back through a configurable
/// propagation delay, draining each side's emitted signals into the
/// other's wire-event queue (SPEC_FULL.md section 8, round-trip and
/// scenario tests).
pub struct ChannelHarness {
    mac_a: HarnessMac,
    mac_b: HarnessMac,
    propagation_delay_ns: u64,
    drained_a: usize,
    drained_b: usize,
    /// Pending deliveries: (arrival time, true if bound for B, event).
    in_flight: Vec<(u64, bool, WireEvent)>,
    time_ns: u64,
    /// Safety bound on event-loop iterations, in case a test scenario
    /// never quiesces.
    max_steps: u32,
}

impl ChannelHarness {
    /// Builds a harness with two MACs at the given configs and a fixed
    /// propagation delay in nanoseconds.
    ///
    /// # Panics
    ///
    /// Panics if either config fails [`MacConfig::validate`]; this harness
    /// is test-only tooling, not a production entry point.
    #[must_use]
    pub fn new(config_a: MacConfig, config_b: MacConfig, propagation_delay_ns: u64) -> Self {
        Self {
            mac_a: Mac::new(config_a, FakeClock::new(), RecordingPhy::new(), RecordingUpperLayer::new(), FixedRng::new(0))
                .expect("valid harness config"),
            mac_b: Mac::new(config_b, FakeClock::new(), RecordingPhy::new(), RecordingUpperLayer::new(), FixedRng::new(0))
                .expect("valid harness config"),
            propagation_delay_ns,
            drained_a: 0,
            drained_b: 0,
            in_flight: Vec::new(),
            time_ns: 0,
            max_steps: 10_000,
        }
    }

    /// Submits a frame at A.
    pub fn submit_a(&mut self, frame: Frame) {
        self.mac_a.submit(frame).expect("submit_a failed");
        self.drain(true);
    }

    /// Submits a frame at B.
    pub fn submit_b(&mut self, frame: Frame) {
        self.mac_b.submit(frame).expect("submit_b failed");
        self.drain(false);
    }

    /// Read-only access to A's statistics.
    #[must_use]
    pub fn mac_a_stats(&self) -> &crate::stats::Statistics {
        self.mac_a.stats()
    }

    /// Read-only access to B's statistics.
    #[must_use]
    pub fn mac_b_stats(&self) -> &crate::stats::Statistics {
        self.mac_b.stats()
    }

    /// B's recording upper layer.
    #[must_use]
    pub fn upper_b(&self) -> &RecordingUpperLayer {
        self.mac_b.upper()
    }

    /// A's recording upper layer.
    #[must_use]
    pub fn upper_a(&self) -> &RecordingUpperLayer {
        self.mac_a.upper()
    }

    fn drain(&mut self, from_a: bool) {
        let (src, drained, to_b) = if from_a {
            (&mut self.mac_a, &mut self.drained_a, true)
        } else {
            (&mut self.mac_b, &mut self.drained_b, false)
        };
        let events = src.phy_mut().drain_new(drained);
        for event in events {
            self.in_flight
                .push((self.time_ns + self.propagation_delay_ns, to_b, event));
        }
    }

    /// Drives timers and in-flight wire events until nothing more is
    /// scheduled, or `max_steps` is exceeded.
    pub fn run_to_quiescence(&mut self) {
        for _ in 0..self.max_steps {
            let next_a = self.mac_a.clock().next_due();
            let next_b = self.mac_b.clock().next_due();
            let next_wire = self.in_flight.iter().map(|&(t, _, _)| t).min();

            let candidates = [
                next_a.map(|(_, t)| t),
                next_b.map(|(_, t)| t),
                next_wire,
            ];
            let Some(next_time) = candidates.into_iter().flatten().min() else {
                break;
            };
            self.time_ns = next_time;

            if let Some((kind, t)) = next_a {
                if t == next_time {
                    self.mac_a.clock_mut().advance_to(next_time);
                    self.mac_a.clock_mut().cancel(kind);
                    self.mac_a.on_timer(kind).expect("mac_a timer handler failed");
                    self.drain(true);
                    continue;
                }
            }
            if let Some((kind, t)) = next_b {
                if t == next_time {
                    self.mac_b.clock_mut().advance_to(next_time);
                    self.mac_b.clock_mut().cancel(kind);
                    self.mac_b.on_timer(kind).expect("mac_b timer handler failed");
                    self.drain(false);
                    continue;
                }
            }

            if let Some(pos) = self.in_flight.iter().position(|&(t, _, _)| t == next_time) {
                let (_, to_b, event) = self.in_flight.remove(pos);
                if to_b {
                    self.mac_b.clock_mut().advance_to(next_time);
                    self.mac_b.on_wire_event(event).expect("mac_b wire event failed");
                    self.drain(false);
                } else {
                    self.mac_a.clock_mut().advance_to(next_time);
                    self.mac_a.on_wire_event(event).expect("mac_a wire event failed");
                    self.drain(true);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_reports_earliest_timer() {
        let mut clock = FakeClock::new();
        clock.schedule(TimerKind::EndTx, 100);
        clock.schedule(TimerKind::EndIfg, 10);
        assert_eq!(clock.next_due(), Some((TimerKind::EndIfg, 10)));
    }

    #[test]
    fn cancel_removes_timer() {
        let mut clock = FakeClock::new();
        clock.schedule(TimerKind::EndTx, 100);
        clock.cancel(TimerKind::EndTx);
        assert_eq!(clock.next_due(), None);
    }

    #[test]
    fn recording_phy_counts_starts_and_finishes() {
        use crate::signal::{Signal, SignalKind};
        let mut phy = RecordingPhy::new();
        let sig = Signal {
            id: 1,
            kind: SignalKind::Jam,
            duration_ns: 10,
            bitrate_bps: 100,
            full_duplex: false,
            bit_error: false,
            sending_time_ns: 0,
        };
        phy.emit(WireEvent::Start(sig.clone()));
        phy.emit(WireEvent::Finish(sig));
        assert_eq!(phy.starts(), 1);
        assert_eq!(phy.finishes(), 1);
    }
}
