//! Statistics counters and end-of-run scalar metrics
//! (SPEC_FULL.md section 6, "Emitted metrics"; section 10, supplemented
//! `finish()` behavior from `original_source/EtherMac.cc`).

use crate::error::DropReason;

/// Running counters owned exclusively by one MAC instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Frames handed to the physical layer successfully.
    pub frames_sent: u64,
    /// Frames delivered to the upper layer successfully.
    pub frames_received_ok: u64,
    /// Collisions detected (Tx aborted by jam).
    pub collisions: u64,
    /// Total backoff periods entered.
    pub backoffs: u64,
    /// PAUSE frames sent.
    pub pause_frames_sent: u64,
    /// PAUSE frames received and applied.
    pub pause_frames_received: u64,
    /// Drops by interface-down.
    pub dropped_interface_down: u64,
    /// Drops by retry-limit-reached.
    pub dropped_retry_limit: u64,
    /// Drops by incorrectly-received (bit error / bad CRC / bad length).
    pub dropped_incorrectly_received: u64,
    /// Drops by not-addressed-to-us.
    pub dropped_not_addressed_to_us: u64,
    /// Accumulated nanoseconds of successful Rx or Tx on the channel
    /// (half-duplex channel-busy accounting).
    pub successful_rx_tx_time_ns: u64,
    /// Accumulated nanoseconds of collision on the channel.
    pub collision_time_ns: u64,
}

impl Statistics {
    /// Records a drop with the given reason.
    pub fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::InterfaceDown => self.dropped_interface_down += 1,
            DropReason::RetryLimitReached => self.dropped_retry_limit += 1,
            DropReason::IncorrectlyReceived => self.dropped_incorrectly_received += 1,
            DropReason::NotAddressedToUs => self.dropped_not_addressed_to_us += 1,
        }
    }

    /// Total frames dropped, across all reasons.
    #[must_use]
    pub fn total_dropped(&self) -> u64 {
        self.dropped_interface_down
            + self.dropped_retry_limit
            + self.dropped_incorrectly_received
            + self.dropped_not_addressed_to_us
    }

    /// Computes end-of-run scalar utilization metrics over `total_time_ns`,
    /// mirroring the original `finish()` scalar recording.
    #[must_use]
    pub fn finish(&self, total_time_ns: u64) -> ChannelUtilization {
        if total_time_ns == 0 {
            return ChannelUtilization::default();
        }
        let busy = self.successful_rx_tx_time_ns + self.collision_time_ns;
        let idle_pct = 100.0 * (total_time_ns.saturating_sub(busy)) as f64 / total_time_ns as f64;
        let utilization_pct =
            100.0 * self.successful_rx_tx_time_ns as f64 / total_time_ns as f64;
        let collision_pct = 100.0 * self.collision_time_ns as f64 / total_time_ns as f64;
        ChannelUtilization {
            idle_pct,
            utilization_pct,
            collision_pct,
            collisions: self.collisions,
            backoffs: self.backoffs,
        }
    }
}

/// End-of-run scalar channel utilization summary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelUtilization {
    /// Percentage of the run the channel was idle.
    pub idle_pct: f64,
    /// Percentage of the run spent in successful Rx/Tx.
    pub utilization_pct: f64,
    /// Percentage of the run spent in collision.
    pub collision_pct: f64,
    /// Total collisions over the run.
    pub collisions: u64,
    /// Total backoff periods over the run.
    pub backoffs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_drop_increments_correct_counter() {
        let mut stats = Statistics::default();
        stats.record_drop(DropReason::RetryLimitReached);
        stats.record_drop(DropReason::InterfaceDown);
        assert_eq!(stats.dropped_retry_limit, 1);
        assert_eq!(stats.dropped_interface_down, 1);
        assert_eq!(stats.total_dropped(), 2);
    }

    #[test]
    fn finish_computes_percentages() {
        let mut stats = Statistics::default();
        stats.successful_rx_tx_time_ns = 50;
        stats.collision_time_ns = 10;
        let util = stats.finish(100);
        assert!((util.utilization_pct - 50.0).abs() < 1e-9);
        assert!((util.collision_pct - 10.0).abs() < 1e-9);
        assert!((util.idle_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn finish_on_zero_duration_is_zeroed() {
        let stats = Statistics::default();
        assert_eq!(stats.finish(0), ChannelUtilization::default());
    }
}
