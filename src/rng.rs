//! Seeded randomness for backoff slot selection (SPEC_FULL.md section 9,
//! "Randomness"; section 10, "Randomness").
//!
//! The MAC core is generic over any [`RngCore`] implementor, so tests can
//! inject a deterministic stub. The default, host-facing constructor uses
//! [`ChaCha20Rng`] seeded from a `u64`, mirroring how the `hermit-os-kernel`
//! example seeds its own entropy pool.

pub use rand_core::RngCore;
use rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::constants::{BACKOFF_RANGE_LIMIT, MAX_BACKOFF_SLOTS};

/// Builds a [`ChaCha20Rng`] from a 64-bit seed, expanding it into the full
/// 256-bit seed ChaCha20 requires.
#[must_use]
pub fn chacha_from_u64_seed(seed: u64) -> ChaCha20Rng {
    let mut expanded = [0u8; 32];
    expanded[..8].copy_from_slice(&seed.to_le_bytes());
    ChaCha20Rng::from_seed(expanded)
}

/// Chooses a backoff slot count `k` uniformly from `[0, range)`, where
/// `range = min(2^backoff_count, MAX_BACKOFF_SLOTS)` (binary exponential
/// backoff, IEEE 802.3 4.2.3.2.5).
pub fn choose_backoff_slots<R: RngCore + ?Sized>(rng: &mut R, backoff_count: u8) -> u32 {
    let range = if backoff_count >= BACKOFF_RANGE_LIMIT {
        MAX_BACKOFF_SLOTS
    } else {
        1u32 << backoff_count
    };
    uniform_int(rng, range)
}

/// Uniform integer in `[0, bound)` via Lemire's rejection-free reduction.
fn uniform_int<R: RngCore + ?Sized>(rng: &mut R, bound: u32) -> u32 {
    if bound == 0 {
        return 0;
    }
    ((u64::from(rng.next_u32()) * u64::from(bound)) >> 32) as u32
}
