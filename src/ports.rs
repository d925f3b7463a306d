//! External collaborator contracts the MAC core is generic over
//! (SPEC_FULL.md section 6).

use crate::frame::Frame;
use crate::signal::WireEvent;

/// The physical out-gate: a serialized channel onto which the MAC emits
/// signal events. The host guarantees no overlapping sends.
pub trait PhysicalPort {
    /// Emits one signal event (start/update/finish) onto the wire.
    fn emit(&mut self, event: WireEvent);
}

/// The upper-layer push interface frames are delivered to once received,
/// validated, and (if addressed to us) decapsulated.
pub trait UpperLayer {
    /// Delivers a successfully-received frame upward.
    fn deliver(&mut self, frame: Frame);
}
