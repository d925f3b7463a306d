//! PAUSE Handler: IEEE 802.3x flow control (SPEC_FULL.md section 4.3).

use log::{debug, trace};

use crate::clock::TimerKind;
use crate::constants::PAUSE_UNIT_BITS;
use crate::error::{ModelError, ModelResult};
use crate::frame::Frame;
use crate::ports::{PhysicalPort, UpperLayer};
use crate::rng::RngCore;

use super::{Mac, TxState};

impl<C, P, U, R> Mac<C, P, U, R>
where
    C: crate::clock::Clock,
    P: PhysicalPort,
    U: UpperLayer,
    R: RngCore,
{
    /// Applies or queues a received PAUSE request (SPEC_FULL.md section 4.3).
    pub(super) fn process_received_control_frame(&mut self, frame: &Frame) {
        let Some(units) = frame.pause_units() else {
            return;
        };
        self.stats.pause_frames_received += 1;
        debug!("pause: received request for {units} units");

        match self.tx_state {
            TxState::Idle if units > 0 => self.schedule_end_pause(units),
            TxState::Pause => {
                self.clock.cancel(TimerKind::EndPause);
                if units > 0 {
                    self.schedule_end_pause(units);
                } else {
                    self.tx_state = TxState::Idle;
                }
            }
            _ => {
                self.pending_pause_units = units;
                trace!("pause: deferred, tx busy");
            }
        }
    }

    /// Schedules the end of a PAUSE period and enters [`TxState::Pause`].
    pub(super) fn schedule_end_pause(&mut self, units: u16) {
        let bitrate = self.config.channel().bitrate_bps();
        let duration_ns = u64::from(units) * u64::from(PAUSE_UNIT_BITS) * 1_000_000_000 / bitrate;
        self.clock.schedule(TimerKind::EndPause, duration_ns);
        self.tx_state = TxState::Pause;
        trace!("pause: entering pause for {duration_ns}ns");
    }

    pub(super) fn on_end_pause(&mut self) -> ModelResult<()> {
        if self.tx_state != TxState::Pause {
            return Err(ModelError::UnexpectedTimerExpiry);
        }
        if !self.is_half_duplex() {
            self.begin_send_frames()
        } else if self.rx_state == super::RxState::RxIdle {
            self.schedule_end_ifg();
            Ok(())
        } else {
            self.tx_state = TxState::Idle;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MacConfig;
    use crate::testing::{FakeClock, FixedRng, RecordingPhy, RecordingUpperLayer};

    fn new_mac(cfg: MacConfig) -> crate::mac::Mac<FakeClock, RecordingPhy, RecordingUpperLayer, FixedRng> {
        crate::mac::Mac::new(cfg, FakeClock::new(), RecordingPhy::new(), RecordingUpperLayer::new(), FixedRng::new(0))
            .expect("valid test config")
    }

    #[test]
    fn idle_mac_enters_pause_immediately_on_request() {
        let mut mac = new_mac(MacConfig::new().with_local_address([1; 6]));
        mac.process_received_control_frame(&Frame::pause([1; 6], 2));
        assert_eq!(mac.debug_state().tx_state, TxState::Pause);
        assert_eq!(mac.stats().pause_frames_received, 1);
    }

    #[test]
    fn zero_unit_pause_while_paused_resumes_immediately() {
        let mut mac = new_mac(MacConfig::new().with_local_address([1; 6]));
        mac.process_received_control_frame(&Frame::pause([1; 6], 5));
        mac.process_received_control_frame(&Frame::pause([1; 6], 0));
        assert_eq!(mac.debug_state().tx_state, TxState::Idle);
    }

    #[test]
    fn pause_received_mid_transmission_is_applied_after_current_frame() {
        let mut mac = new_mac(MacConfig::new().with_local_address([1; 6]));
        mac.submit(Frame::new([2; 6], 0x0800, vec![0u8; 10])).unwrap();
        assert_eq!(mac.debug_state().tx_state, TxState::Transmitting);

        mac.process_received_control_frame(&Frame::pause([1; 6], 3));
        assert_eq!(mac.debug_state().tx_state, TxState::Transmitting);
        assert_eq!(mac.stats().pause_frames_received, 1);

        mac.on_timer(crate::clock::TimerKind::EndTx).unwrap();
        assert_eq!(mac.debug_state().tx_state, TxState::Pause);
    }
}
