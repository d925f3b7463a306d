//! Tx Engine (SPEC_FULL.md section 4.1).

use log::{debug, trace, warn};

use crate::clock::TimerKind;
use crate::codec::padded_frame_length;
use crate::constants::{self, INTERFRAME_GAP_BITS};
use crate::error::{DropReason, ModelError, ModelResult};
use crate::frame::Frame;
use crate::ports::{PhysicalPort, UpperLayer};
use crate::rng::{self, RngCore};
use crate::signal::{Signal, SignalKind, WireEvent};

use super::{Mac, RxState, TxState};

impl<C, P, U, R> Mac<C, P, U, R>
where
    C: crate::clock::Clock,
    P: PhysicalPort,
    U: UpperLayer,
    R: RngCore,
{
    /// Accepts a frame from the upper layer (SPEC_FULL.md section 4.1,
    /// `submit`).
    pub fn submit(&mut self, mut frame: Frame) -> ModelResult<()> {
        if frame.dest == self.local_address() {
            return Err(ModelError::SelfAddressedPacket);
        }
        if frame.data_length_bytes() > constants::MAX_ETHERNET_FRAME_BYTES {
            return Err(ModelError::FrameTooLong);
        }
        if !self.connected {
            self.stats.record_drop(DropReason::InterfaceDown);
            warn!("submit while disconnected: dropping frame");
            return Ok(());
        }
        if frame.src == constants::UNSPECIFIED_ADDRESS {
            frame.src = self.local_address();
        }
        trace!("submit: enqueue frame to {:02x?}", frame.dest);
        self.queue.enqueue(frame);

        let half_duplex_clear = !self.is_half_duplex() || self.rx_state == RxState::RxIdle;
        if self.tx_state == TxState::Idle && half_duplex_clear && self.current_tx_frame.is_none() {
            self.current_tx_frame = self.queue.dequeue();
            self.start_frame_transmission()?;
        }
        Ok(())
    }

    /// Begins transmitting `current_tx_frame` (SPEC_FULL.md section 4.1,
    /// `start_frame_transmission`).
    pub(super) fn start_frame_transmission(&mut self) -> ModelResult<()> {
        let frame = self
            .current_tx_frame
            .clone()
            .expect("start_frame_transmission requires a current frame");

        let in_burst = self.frames_in_burst > 0;
        let min_bytes = if self.is_half_duplex() {
            self.config.channel().min_frame_bytes(in_burst)
        } else {
            constants::MIN_ETHERNET_FRAME_BYTES_WITH_FCS
        };
        let on_wire_bytes = padded_frame_length(&frame).max(min_bytes);

        let bitrate = self.config.channel().bitrate_bps();
        let total_bits = u64::from(constants::PREAMBLE_BYTES + constants::SFD_BYTES + on_wire_bytes) * 8;
        let duration_ns = total_bits * 1_000_000_000 / bitrate;

        let id = self.id_gen.next_id();
        let now = self.now();
        let signal = Signal {
            id,
            kind: SignalKind::Data(frame),
            duration_ns,
            bitrate_bps: bitrate,
            full_duplex: !self.is_half_duplex(),
            bit_error: false,
            sending_time_ns: now,
        };

        self.current_tx_signal = Some(signal.clone());
        self.phy.emit(WireEvent::Start(signal));
        self.clock.schedule(TimerKind::EndTx, duration_ns);
        self.tx_state = TxState::Transmitting;
        if self.is_half_duplex() {
            self.channel_busy_since_ns = Some(now);
        }
        debug!("tx: start_frame_transmission duration_ns={duration_ns}");

        // A reception begun during the just-elapsed IFG is invisible until
        // now; resolve Tx/Rx overlap immediately (SPEC_FULL.md 4.1 step 7).
        self.calculate_rx_status();
        Ok(())
    }

    pub(super) fn on_end_tx(&mut self) -> ModelResult<()> {
        let signal = self
            .current_tx_signal
            .take()
            .ok_or(ModelError::MissingTxSignal)?;
        let now = self.now();
        self.phy.emit(WireEvent::Finish(signal.clone()));

        match self.tx_state {
            TxState::SendIfg => self.on_end_ifg_timer(),
            TxState::Jamming => self.handle_end_jamming(),
            TxState::Transmitting => self.on_tx_success(&signal, now),
            _ => Err(ModelError::UnexpectedTimerExpiry),
        }
    }

    fn on_tx_success(&mut self, signal: &Signal, now: u64) -> ModelResult<()> {
        let was_pause = matches!(&signal.kind, SignalKind::Data(f) if f.is_flow_control());
        self.stats.frames_sent += 1;
        if was_pause {
            self.stats.pause_frames_sent += 1;
        }
        if self.is_half_duplex() {
            if let Some(busy_since) = self.channel_busy_since_ns.take() {
                self.stats.successful_rx_tx_time_ns += now.saturating_sub(busy_since);
            }
        }
        self.current_tx_frame = None;
        self.last_tx_finish_time_ns = Some(now);
        self.backoff_count = 0;

        self.frames_in_burst += 1;
        self.bytes_in_burst += padded_frame_length(
            match &signal.kind {
                SignalKind::Data(f) => f,
                _ => unreachable!("transmitting state only carries Data signals"),
            },
        );

        if self.pending_pause_units > 0 {
            let units = self.pending_pause_units;
            self.pending_pause_units = 0;
            self.schedule_end_pause(units);
            return Ok(());
        }

        self.schedule_end_ifg();
        self.try_fill_ifg_in_burst();
        Ok(())
    }

    /// Schedules the interframe gap and enters `WaitIfg`
    /// (SPEC_FULL.md section 4.1, `schedule_end_ifg`).
    pub(super) fn schedule_end_ifg(&mut self) {
        let bitrate = self.config.channel().bitrate_bps();
        let duration_ns = u64::from(INTERFRAME_GAP_BITS) * 1_000_000_000 / bitrate;
        self.clock.schedule(TimerKind::EndIfg, duration_ns);
        self.tx_state = TxState::WaitIfg;
        trace!("tx: schedule_end_ifg duration_ns={duration_ns}");
    }

    /// If bursting is active and all preconditions hold, sends a filled-IFG
    /// signal instead of idling (SPEC_FULL.md section 4.1,
    /// `fill_ifg_if_in_burst`).
    fn try_fill_ifg_in_burst(&mut self) {
        let now_is_last_tx_finish = self.last_tx_finish_time_ns == Some(self.now());
        let in_burst_preconditions = self.config.bursting_enabled()
            && self.is_half_duplex()
            && self.current_tx_frame.is_none()
            && !self.queue.is_empty()
            && self.tx_state == TxState::WaitIfg
            && self.frames_in_burst > 0
            && now_is_last_tx_finish
            && self.config.channel().bursting_supported();

        if !in_burst_preconditions {
            return;
        }
        let channel = self.config.channel();
        // Check prospectively: the next frame's on-wire size (plus overhead)
        // must still fit the burst budget, not just what has been sent so far.
        let next_frame = self.queue.front().expect("checked non-empty above");
        let next_on_wire_bytes =
            padded_frame_length(next_frame).max(channel.min_frame_bytes(true));
        let projected_bytes_in_burst = self.bytes_in_burst
            + constants::INTERFRAME_GAP_BITS / 8
            + constants::PREAMBLE_BYTES
            + constants::SFD_BYTES
            + next_on_wire_bytes;
        if projected_bytes_in_burst > channel.max_bytes_in_burst() {
            self.frames_in_burst = 0;
            self.bytes_in_burst = 0;
            return;
        }

        self.clock.cancel(TimerKind::EndIfg);
        let bitrate = channel.bitrate_bps();
        let duration_ns = u64::from(INTERFRAME_GAP_BITS) * 1_000_000_000 / bitrate;
        let id = self.id_gen.next_id();
        let now = self.now();
        let signal = Signal {
            id,
            kind: SignalKind::FilledIfg,
            duration_ns,
            bitrate_bps: bitrate,
            full_duplex: false,
            bit_error: false,
            sending_time_ns: now,
        };
        self.current_tx_signal = Some(signal.clone());
        self.phy.emit(WireEvent::Start(signal));
        self.clock.schedule(TimerKind::EndTx, duration_ns);
        self.tx_state = TxState::SendIfg;
        trace!("tx: emitting filled-IFG burst filler");
    }

    /// Called when an `EndTx` expiry completes a `SendIfg` (filled-IFG
    /// burst filler); equivalent to the end of an ordinary IFG wait.
    fn on_end_ifg_timer(&mut self) -> ModelResult<()> {
        self.begin_send_frames()
    }

    pub(super) fn on_end_ifg(&mut self) -> ModelResult<()> {
        if self.tx_state != TxState::WaitIfg {
            return Err(ModelError::UnexpectedTimerExpiry);
        }
        self.begin_send_frames()
    }

    /// Pops the next queued frame (if none owned) and starts sending it, or
    /// idles (SPEC_FULL.md section 4.1, `begin_send_frames`).
    pub(super) fn begin_send_frames(&mut self) -> ModelResult<()> {
        if self.current_tx_frame.is_none() {
            self.current_tx_frame = self.queue.dequeue();
        }
        if self.current_tx_frame.is_none() {
            self.tx_state = TxState::Idle;
            self.frames_in_burst = 0;
            self.bytes_in_burst = 0;
            return Ok(());
        }
        if self.is_half_duplex() && self.rx_state != RxState::RxIdle {
            self.tx_state = TxState::Idle;
            return Ok(());
        }
        self.start_frame_transmission()
    }

    /// Truncates and appends a jam sequence to the current transmission
    /// (SPEC_FULL.md section 4.1, `abort_transmission_and_append_jam`).
    pub(super) fn abort_transmission_and_append_jam(&mut self) {
        let Some(mut signal) = self.current_tx_signal.take() else {
            return;
        };
        let now = self.now();
        let elapsed = now.saturating_sub(signal.sending_time_ns);
        let old_bits = signal.length_bits();
        let fraction_sent = if signal.duration_ns == 0 {
            1.0
        } else {
            elapsed as f64 / signal.duration_ns as f64
        };
        let new_bits = ((old_bits as f64 * fraction_sent).ceil() as u64).min(old_bits);

        if let SignalKind::Data(frame) = &mut signal.kind {
            let truncated_bytes = (new_bits / 8) as usize;
            if truncated_bytes < frame.payload.len() {
                frame.payload.truncate(truncated_bytes);
            }
            frame.bit_error = true;
        }

        let jam_bits = u64::from(constants::JAM_SIGNAL_BYTES) * 8;
        let new_duration_ns = (new_bits + jam_bits) * 1_000_000_000 / signal.bitrate_bps;
        signal.bit_error = true;
        signal.duration_ns = new_duration_ns;

        self.phy.emit(WireEvent::Update(signal.clone()));
        let new_finish = signal.sending_time_ns + new_duration_ns;
        self.current_tx_signal = Some(signal);
        self.clock.schedule(TimerKind::EndTx, new_finish.saturating_sub(now));
        self.tx_state = TxState::Jamming;
        warn!("tx: collision detected, aborting and appending jam");
    }

    /// Handles the end of the jam sequence: either retransmit after backoff
    /// or drop for exceeding the retry limit (SPEC_FULL.md section 4.1,
    /// `handle_retransmission`).
    pub(super) fn handle_end_jamming(&mut self) -> ModelResult<()> {
        self.backoff_count += 1;

        if self.backoff_count > constants::MAX_ATTEMPTS {
            warn!("tx: retry limit reached, dropping frame");
            self.current_tx_frame = None;
            self.backoff_count = 0;
            self.frames_in_burst = 0;
            self.bytes_in_burst = 0;
            self.stats.record_drop(DropReason::RetryLimitReached);
            self.current_tx_frame = self.queue.dequeue();
            if self.rx_state == RxState::RxIdle {
                self.schedule_end_ifg();
            } else {
                self.tx_state = TxState::Idle;
            }
            return Ok(());
        }

        let slots = rng::choose_backoff_slots(&mut self.rng, self.backoff_count);
        self.stats.backoffs += 1;
        let bitrate = self.config.channel().bitrate_bps();
        let slot_time_ns =
            u64::from(self.config.channel().slot_time_bits()) * 1_000_000_000 / bitrate;
        let delay_ns = u64::from(slots) * slot_time_ns;
        self.clock.schedule(TimerKind::EndBackoff, delay_ns);
        self.tx_state = TxState::Backoff;
        trace!("tx: backoff_count={} slots={slots}", self.backoff_count);
        Ok(())
    }

    pub(super) fn on_end_backoff(&mut self) -> ModelResult<()> {
        if self.tx_state != TxState::Backoff {
            return Err(ModelError::UnexpectedTimerExpiry);
        }
        if self.rx_state == RxState::RxIdle {
            self.schedule_end_ifg();
        } else {
            self.tx_state = TxState::Idle;
        }
        Ok(())
    }

    /// Starts a transmission immediately if idle and the channel permits,
    /// otherwise leaves the frame queued (SPEC_FULL.md section 4.1,
    /// `try_begin_send_frame`).
    pub(super) fn try_begin_send_frame(&mut self) -> ModelResult<()> {
        if self.current_tx_frame.is_some()
            && self.tx_state == TxState::Idle
            && (!self.is_half_duplex() || self.rx_state == RxState::RxIdle)
        {
            return self.start_frame_transmission();
        }
        Ok(())
    }
}
