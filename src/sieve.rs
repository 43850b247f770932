//! # Sieve — Bit-Packed Candidate Bitmaps and the Small-Prime Table
//!
//! Storage layer for the segmented counter in [`crate::count`]. Provides:
//!
//! 1. **Bit-packed candidate storage** (`BitSieve`) — one bit per integer slot
//!    (8× memory reduction over `Vec<bool>`), parity-aware bulk initialization,
//!    and fallible allocation so oversized requests surface as errors instead
//!    of aborting mid-count.
//! 2. **Small-prime precomputation** (`SmallPrimes`) — every prime up to the
//!    square root of the interval end, produced by a basic sieve of
//!    Eratosthenes over a `BitSieve` and exposed only through point queries
//!    and ordered, restartable iteration.
//!
//! ## Algorithm: Parity Initialization
//!
//! Apart from 2, every even integer is composite, so a freshly initialized
//! sieve can start with all even integers already marked off. Which bit
//! pattern achieves that depends on the parity of the integer at slot 0:
//! `0xAAAA…` (even indices clear) when the range starts on an even integer,
//! `0x5555…` (odd indices clear) when it starts on an odd one. The caller
//! knows the closed-form count of slots each pattern clears, so no popcount
//! is needed to seed a tally.
//!
//! ## Algorithm: Square-Root Coverage
//!
//! Every composite below 2^63 has a prime factor at or below its square root,
//! so a table of primes up to ⌈√(start+length)⌉ is sufficient to eliminate
//! every composite in the interval. The table length is rounded up to a power
//! of two: with `2^b ≥ start+length`, a table of `2^⌈b/2⌉` slots covers the
//! square root.
//!
//! ## References
//!
//! - Eratosthenes of Cyrene, ~240 BCE (sieve algorithm).
//! - OEIS A000720: pi(n), the prime counting function.

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::trialdiv;

/// Bulk pattern with even indices clear: slot 0 composite, slot 1 candidate, …
const EVEN_OFF: u64 = 0xAAAA_AAAA_AAAA_AAAA;
/// Bulk pattern with odd indices clear: slot 0 candidate, slot 1 composite, …
const ODD_OFF: u64 = 0x5555_5555_5555_5555;

/// Packed bit array tracking candidate/composite status, one bit per integer.
///
/// Bit layout: slot `i` lives in word `i / 64`, bit position `i % 64`. A set
/// bit (1) means the integer is still a **candidate** prime; a clear bit (0)
/// means it has been proven composite. Word packing never leaks: callers see
/// only slot indices.
///
/// Capacity is fixed at creation, but each bulk initializer takes a logical
/// length, so one allocation can be reused across sieve passes of shrinking
/// size (a shorter final segment, for instance). Slots past the logical
/// length within the last covered word are kept clear by the initializers;
/// words beyond the covered range are simply ignored.
#[derive(Debug)]
pub struct BitSieve {
    words: Vec<u64>,
    len: i64,
}

impl BitSieve {
    /// Allocate storage for `length` slots, all initially composite.
    ///
    /// Allocation is fallible: a request beyond what the host can provide
    /// returns an error rather than aborting, so the caller can fail the
    /// whole count cleanly. `length` must be positive.
    pub fn try_new(length: i64) -> Result<Self> {
        assert!(length > 0, "sieve length must be positive, got {}", length);
        // (length + 63) / 64 would overflow for absurd requests; this form
        // stays in range and lets try_reserve report the failure instead.
        let num_words = ((length - 1) / 64 + 1) as usize;
        let mut words = Vec::new();
        words.try_reserve_exact(num_words).map_err(|e| {
            anyhow!(
                "cannot allocate a sieve of {} slots ({} MiB): {}",
                length,
                num_words / (128 * 1024),
                e
            )
        })?;
        words.resize(num_words, 0);
        Ok(BitSieve { words, len: length })
    }

    /// Number of logical slots.
    #[inline]
    pub fn len(&self) -> i64 {
        self.len
    }

    /// Returns true if the sieve has zero logical length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Initialize the first `length` slots to candidate (all bits set).
    pub fn init_all_prime(&mut self, length: i64) {
        self.fill(u64::MAX, length);
    }

    /// Initialize the first `length` slots with even indices composite and odd
    /// indices candidate. Used when slot 0 represents an even integer, so the
    /// pre-marked slots are exactly the even integers; `(length + 1) / 2`
    /// slots start composite.
    pub fn init_even_off(&mut self, length: i64) {
        self.fill(EVEN_OFF, length);
    }

    /// Mirror of [`BitSieve::init_even_off`] for ranges starting on an odd
    /// integer: odd indices composite, even indices candidate; `length / 2`
    /// slots start composite.
    pub fn init_odd_off(&mut self, length: i64) {
        self.fill(ODD_OFF, length);
    }

    /// Bulk-fill the first `length` slots with `pattern`, trimming the logical
    /// length to `length` and clearing the unused tail of the last word.
    fn fill(&mut self, pattern: u64, length: i64) {
        debug_assert!(
            length > 0 && length <= self.words.len() as i64 * 64,
            "init length {} exceeds sieve capacity {}",
            length,
            self.words.len() * 64
        );
        self.len = length;
        let full_words = (length / 64) as usize;
        self.words[..full_words].fill(pattern);
        let tail_bits = (length % 64) as u32;
        if tail_bits > 0 {
            self.words[full_words] = pattern & ((1u64 << tail_bits) - 1);
        }
    }

    /// Mark slot `index` composite (clear the bit).
    #[inline]
    pub fn mark_composite(&mut self, index: i64) {
        debug_assert!(
            index >= 0 && index < self.len,
            "BitSieve index out of bounds: {} not in [0, {})",
            index,
            self.len
        );
        self.words[(index / 64) as usize] &= !(1u64 << (index % 64));
    }

    /// Mark slot `index` candidate (set the bit).
    #[inline]
    pub fn mark_prime(&mut self, index: i64) {
        debug_assert!(
            index >= 0 && index < self.len,
            "BitSieve index out of bounds: {} not in [0, {})",
            index,
            self.len
        );
        self.words[(index / 64) as usize] |= 1u64 << (index % 64);
    }

    /// Whether slot `index` is still a candidate. Once sieving finishes this
    /// is primality itself.
    #[inline]
    pub fn is_prime(&self, index: i64) -> bool {
        debug_assert!(
            index >= 0 && index < self.len,
            "BitSieve index out of bounds: {} not in [0, {})",
            index,
            self.len
        );
        self.words[(index / 64) as usize] & (1u64 << (index % 64)) != 0
    }

    /// Count candidate slots in `[0, len)` using hardware POPCNT. The
    /// initializers keep tail bits clear, so whole-word popcounts are exact.
    pub fn count_candidates(&self) -> i64 {
        let covered = ((self.len + 63) / 64) as usize;
        self.words[..covered]
            .iter()
            .map(|w| w.count_ones() as i64)
            .sum()
    }

    /// Iterate over candidate slot indices in ascending order.
    pub fn iter_candidates(&self) -> impl Iterator<Item = i64> + '_ {
        let covered = ((self.len + 63) / 64) as usize;
        self.words[..covered]
            .iter()
            .enumerate()
            .flat_map(|(wi, &word)| {
                let base = wi as i64 * 64;
                BitIter { word, base }
            })
    }
}

/// Iterator over set bits within a single u64 word.
struct BitIter {
    word: u64,
    base: i64,
}

impl Iterator for BitIter {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        if self.word == 0 {
            return None;
        }
        let tz = self.word.trailing_zeros() as i64;
        self.word &= self.word - 1; // clear lowest set bit
        Some(self.base + tz)
    }
}

/// Read-only table of every prime below a power-of-two limit.
///
/// Built once per count call and shared read-only by every segment, including
/// parallel workers. Primes are exposed only through [`SmallPrimes::is_prime`]
/// and the ordered iteration of [`SmallPrimes::iter_odd_primes`]; the backing
/// bitmap never escapes.
pub struct SmallPrimes {
    table: BitSieve,
}

impl SmallPrimes {
    /// Build the table needed to sieve any interval ending at `interval_end`
    /// (exclusive): its limit is a power of two at or above
    /// ⌈√interval_end⌉, so every possible prime factor is covered.
    pub fn covering(interval_end: i64) -> Result<Self> {
        debug_assert!(interval_end > 2, "nothing to cover below the first prime");
        let set_bit = (interval_end as u64).next_power_of_two().trailing_zeros();
        Self::build(set_bit / 2 + set_bit % 2)
    }

    /// Sieve the integers `[0, 2^power)` and keep the result as the table.
    ///
    /// Classic sieve of Eratosthenes with the even numbers pre-eliminated by
    /// the parity pattern: O(n log log n) time, one bit per integer. Debug
    /// builds cross-check every odd slot against trial division before its
    /// multiples are marked; a disagreement is a logic defect and panics.
    pub fn build(power: u32) -> Result<Self> {
        let limit: i64 = 1 << power;
        let mut table = BitSieve::try_new(limit)?;
        table.init_even_off(limit);
        table.mark_composite(0);
        table.mark_composite(1);
        // A power-1 table has no slot for 2; it also has no primes >= 3 to
        // offer, and segments handle 2 themselves, so it stays all-composite.
        if limit > 2 {
            table.mark_prime(2);
        }

        let mut i: i64 = 3;
        while i < limit {
            debug_assert_eq!(
                table.is_prime(i),
                trialdiv::is_prime(i),
                "small-prime table disagrees with trial division at {}",
                i
            );
            if table.is_prime(i) {
                // Even multiples are already off; re-marking them is harmless
                // and keeps the stride simple.
                let mut multiple = 2 * i;
                while multiple < limit {
                    table.mark_composite(multiple);
                    multiple += i;
                }
            }
            i += 2;
        }

        debug!(
            limit,
            primes = table.count_candidates(),
            "small-prime table sieved"
        );
        Ok(SmallPrimes { table })
    }

    /// Exclusive upper bound of the table (always a power of two).
    #[inline]
    pub fn limit(&self) -> i64 {
        self.table.len()
    }

    /// Whether `n` is prime, for `n` in `[0, limit)`.
    #[inline]
    pub fn is_prime(&self, n: i64) -> bool {
        self.table.is_prime(n)
    }

    /// Iterate over the table's primes `>= 3` in ascending order. Restartable:
    /// each call walks the bitmap from the start, which is how every segment
    /// replays the same primes.
    pub fn iter_odd_primes(&self) -> impl Iterator<Item = i64> + '_ {
        self.table.iter_candidates().filter(|&p| p >= 3)
    }
}
