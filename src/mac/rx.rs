//! Rx Engine, Signal Adapter, and Collision Arbiter (SPEC_FULL.md section 4.2).

use log::{debug, trace, warn};

use crate::codec;
use crate::error::{DropReason, ModelError, ModelResult};
use crate::ports::{PhysicalPort, UpperLayer};
use crate::rng::RngCore;
use crate::signal::{Signal, SignalKind, WireEvent};

use super::{Mac, RxState, TxState};

impl<C, P, U, R> Mac<C, P, U, R>
where
    C: crate::clock::Clock,
    P: PhysicalPort,
    U: UpperLayer,
    R: RngCore,
{
    /// Dispatches one incoming wire event (SPEC_FULL.md section 4.2,
    /// `processSignalFromNetwork`).
    pub(super) fn on_signal_event(&mut self, event: WireEvent) -> ModelResult<()> {
        let signal = match &event {
            WireEvent::Start(s) | WireEvent::Update(s) | WireEvent::Finish(s) => s,
        };

        if signal.full_duplex == self.is_half_duplex() {
            return Err(ModelError::DuplexMismatch);
        }

        if !self.connected {
            // Count only genuine frame-end signals as dropped packets; JAM,
            // filled-IFG, and fragment signals finishing were never frames.
            if matches!(event, WireEvent::Finish(_)) && matches!(signal.kind, SignalKind::Data(_))
            {
                self.stats.record_drop(DropReason::InterfaceDown);
            }
            return Ok(());
        }

        if self.is_half_duplex() {
            let propagation = self.now().saturating_sub(signal.sending_time_ns);
            if propagation >= self.config.channel().max_propagation_delay_ns() {
                return Err(ModelError::ExcessivePropagationDelay);
            }
        }

        match event {
            WireEvent::Start(signal) => {
                if self.active_reception.is_some() {
                    return Err(ModelError::MixedReception);
                }
                self.active_reception = Some((signal.id, self.now()));
                self.calculate_rx_status();
                Ok(())
            }
            WireEvent::Update(signal) => {
                self.adopt_or_check_reception(signal.id)?;
                self.calculate_rx_status();
                Ok(())
            }
            WireEvent::Finish(signal) => {
                self.adopt_or_check_reception(signal.id)?;
                self.handle_end_rx(signal)
            }
        }
    }

    fn adopt_or_check_reception(&mut self, id: crate::signal::SignalId) -> ModelResult<()> {
        match self.active_reception {
            None => {
                // The start event was missed (e.g. arrived during our IFG
                // blind spot); adopt this id and flag bit-error at
                // completion (SPEC_FULL.md section 9, open question).
                warn!("rx: adopting signal id={id} with no observed start");
                self.active_reception = Some((id, self.now()));
                Ok(())
            }
            Some((active_id, _)) if active_id != id => Err(ModelError::MixedReception),
            Some(_) => Ok(()),
        }
    }

    /// Completes or discards the signal a reception ends with
    /// (SPEC_FULL.md section 4.2, `handle_end_rx`).
    fn handle_end_rx(&mut self, mut signal: Signal) -> ModelResult<()> {
        let (_, start) = self
            .active_reception
            .take()
            .expect("handle_end_rx requires an active reception");
        let now = self.now();
        let dt = self
            .channel_busy_since_ns
            .map_or(0, |busy| now.saturating_sub(busy));

        match self.rx_state {
            RxState::Receiving => {
                if now.saturating_sub(start) != signal.duration_ns {
                    signal.bit_error = true;
                }
                self.stats.successful_rx_tx_time_ns += dt;
                self.frame_reception_complete(signal);
            }
            RxState::RxCollision => {
                self.stats.collision_time_ns += dt;
            }
            RxState::RxReconnect => {}
            RxState::RxIdle => return Err(ModelError::UnexpectedTimerExpiry),
        }

        self.calculate_rx_status();
        if self.is_half_duplex() && self.tx_state == TxState::Idle {
            self.schedule_end_ifg();
        }
        Ok(())
    }

    /// The Collision Arbiter: reconciles Tx and Rx activity and decides
    /// whether a collision is in progress (SPEC_FULL.md section 4.2,
    /// `calculate_rx_status`).
    pub(super) fn calculate_rx_status(&mut self) {
        let reception_active = self.active_reception.is_some();

        if !self.is_half_duplex() {
            self.rx_state = if reception_active {
                RxState::Receiving
            } else {
                RxState::RxIdle
            };
            return;
        }

        let transmitting = matches!(
            self.tx_state,
            TxState::SendIfg | TxState::Transmitting | TxState::Jamming
        );

        let previously_idle = self.rx_state == RxState::RxIdle;
        match (reception_active, transmitting) {
            (true, true) => {
                if self.rx_state != RxState::RxCollision {
                    self.stats.collisions += 1;
                    trace!("collision edge: 1");
                }
                self.rx_state = RxState::RxCollision;
                self.abort_transmission_and_append_jam();
            }
            (false, false) => {
                if self.rx_state == RxState::RxCollision {
                    trace!("collision edge: 0");
                }
                self.rx_state = RxState::RxIdle;
            }
            (true, false) if self.rx_state != RxState::RxCollision => {
                self.rx_state = RxState::Receiving;
            }
            _ => {}
        }

        if previously_idle && self.rx_state != RxState::RxIdle {
            self.channel_busy_since_ns = Some(self.now());
        }
    }

    /// Decapsulates, validates, and dispatches a completed reception
    /// (SPEC_FULL.md section 4.2, `frame_reception_complete`).
    fn frame_reception_complete(&mut self, signal: Signal) {
        let frame = match signal.kind {
            SignalKind::Data(frame) => frame,
            SignalKind::FilledIfg | SignalKind::Jam | SignalKind::Fragment => return,
        };

        if signal.bit_error || frame.bit_error || !codec::verify(&frame) {
            self.stats.record_drop(DropReason::IncorrectlyReceived);
            warn!("rx: dropping incorrectly received frame");
            return;
        }

        if frame.dest != self.local_address() && !frame.is_broadcast() && !self.config.promiscuous()
        {
            self.stats.record_drop(DropReason::NotAddressedToUs);
            trace!("rx: dropping frame not addressed to us");
            return;
        }

        if frame.is_flow_control() {
            self.process_received_control_frame(&frame);
            return;
        }

        self.stats.frames_received_ok += 1;
        debug!("rx: delivering frame from {:02x?}", frame.src);
        self.upper.deliver(frame);
    }
}
