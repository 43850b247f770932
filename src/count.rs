//! # Count — Segmented Prime Counting over 64-Bit Intervals
//!
//! Counts the primes in a half-open interval `[start, start + length)`
//! without sieving the whole range at once: a dense sieve over an interval
//! near 2^63 is unthinkable, but a table of primes up to the interval end's
//! square root is small, and with it each bounded window of the interval can
//! be sieved independently.
//!
//! ## Algorithm: Segmented Sieve
//!
//! 1. Normalize the interval — non-positive lengths and ranges entirely below
//!    2 count zero primes; a start below 2 is clamped upward since nothing
//!    there can be prime.
//! 2. Build the small-prime table ([`crate::sieve::SmallPrimes`]) once.
//! 3. Walk the interval in segments of at most [`MAX_SEGMENT_LENGTH`] slots.
//!    Each segment initializes its bitmap by the parity of its first integer
//!    (all even integers except 2 start composite, and the number of slots
//!    that pattern clears has a closed form), then for every table prime
//!    p ≥ 3 marks the multiples of p that fall inside the window, tallying
//!    each first-time mark. The offset of the first multiple is
//!    `(-segStart) mod p`, shifted by p when that multiple would be p itself
//!    — a prime must never be eliminated by its own marking pass.
//! 4. Sum the per-segment tallies.
//!
//! Sequential runs reuse one segment bitmap across the whole walk, trimming
//! its logical length for the final short segment. With `parallel` set, the
//! segments run on the rayon pool instead, each with a private bitmap and the
//! table shared read-only; the counts combine by summation, so the two modes
//! agree exactly.
//!
//! ## References
//!
//! - OEIS A000720: pi(n), the prime counting function.
//! - Sorenson, "Trading Time for Space in Prime Number Sieves", ANTS 1998
//!   (segmented sieving survey).

use anyhow::{anyhow, Result};
use rayon::prelude::*;
use tracing::debug;

use crate::sieve::{BitSieve, SmallPrimes};
use crate::trialdiv;

/// Upper bound on slots per segment: 2^30 bits caps each segment bitmap at
/// 128 MiB no matter how long the interval is.
pub const MAX_SEGMENT_LENGTH: i64 = 1 << 30;

/// Count the primes in `[start, start + length)`.
///
/// The reference configuration: sequential, one reused segment bitmap,
/// segments of [`MAX_SEGMENT_LENGTH`]. Negative and sub-2 portions of the
/// interval contribute nothing; a non-positive `length` counts zero. Fails
/// only when a sieve allocation fails or `start + length` overflows `i64`.
pub fn count_primes_in_interval(start: i64, length: i64) -> Result<i64> {
    count_primes_segmented(start, length, MAX_SEGMENT_LENGTH, false)
}

/// Count the primes in `[start, start + length)` with explicit control over
/// the segment size and the execution mode.
///
/// `segment_length` bounds peak memory (one bit per slot per live segment)
/// and must be positive; any value yields the same count, smaller values just
/// mean more windows. With `parallel` set, segments are processed on the
/// rayon pool, each allocating its own bitmap.
pub fn count_primes_segmented(
    mut start: i64,
    mut length: i64,
    segment_length: i64,
    parallel: bool,
) -> Result<i64> {
    assert!(
        segment_length > 0,
        "segment length must be positive, got {}",
        segment_length
    );
    if length <= 0 {
        return Ok(0);
    }
    let interval_end = start.checked_add(length).ok_or_else(|| {
        anyhow!(
            "interval end {} + {} overflows the 64-bit domain",
            start,
            length
        )
    })?;
    if interval_end <= 2 {
        return Ok(0); // entirely below the first prime
    }
    if start < 2 {
        // interval_end > 2 guarantees 2 - start < length, so no underflow
        length -= 2 - start;
        start = 2;
    }

    let table = SmallPrimes::covering(interval_end)?;
    debug!(
        start,
        length,
        segment_length,
        parallel,
        table_limit = table.limit(),
        "interval normalized"
    );

    if parallel {
        let num_segments = (length - 1) / segment_length + 1;
        (0..num_segments)
            .into_par_iter()
            .map(|k| {
                let seg_start = start + k * segment_length;
                let seg_len = segment_length.min(length - k * segment_length);
                let mut sieve = BitSieve::try_new(seg_len)?;
                Ok(count_segment(seg_start, seg_len, &table, &mut sieve))
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))
    } else {
        let mut sieve = BitSieve::try_new(length.min(segment_length))?;
        let mut total: i64 = 0;
        while length > segment_length {
            total += count_segment(start, segment_length, &table, &mut sieve);
            start += segment_length;
            length -= segment_length;
        }
        total += count_segment(start, length, &table, &mut sieve);
        Ok(total)
    }
}

/// Sieve one segment `[seg_start, seg_start + seg_len)` and return its prime
/// count. `seg_start` is at least 2 (the orchestration clamps) and `sieve`
/// has capacity for `seg_len` slots.
fn count_segment(seg_start: i64, seg_len: i64, table: &SmallPrimes, sieve: &mut BitSieve) -> i64 {
    debug_assert!(seg_start >= 2, "segments start at or above the first prime");
    debug_assert!(seg_len > 0);

    let mut num_primes = seg_len;
    // Parity init pre-marks every even integer in the window; the closed
    // forms count exactly the slots each pattern cleared.
    if seg_start % 2 == 0 {
        sieve.init_even_off(seg_len);
        num_primes -= (seg_len + 1) / 2;
    } else {
        sieve.init_odd_off(seg_len);
        num_primes -= seg_len / 2;
    }
    // 2 is the one even prime, and the parity pattern just erased it.
    if seg_start <= 2 {
        sieve.mark_prime(2 - seg_start);
        num_primes += 1;
    }

    for p in table.iter_odd_primes() {
        debug_assert!(
            trialdiv::is_prime(p),
            "small-prime table disagrees with trial division at {}",
            p
        );
        // Offset of the smallest multiple of p at or after seg_start.
        let mut kp = seg_start % p;
        if kp != 0 {
            kp = p - kp;
        }
        // If that multiple is p itself, p is prime and must survive its own
        // pass; written without the sum seg_start + kp, which can overflow.
        if seg_start <= p && kp == p - seg_start {
            kp += p;
        }
        while kp < seg_len {
            // Check-then-mark: a slot already proven composite by a smaller
            // prime must not be deducted twice.
            if sieve.is_prime(kp) {
                sieve.mark_composite(kp);
                num_primes -= 1;
            }
            kp += p;
        }
    }

    debug_assert_eq!(
        num_primes,
        sieve.count_candidates(),
        "segment tally diverged from the bitmap"
    );
    num_primes
}
