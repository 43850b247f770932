//! # Trialdiv — Trial-Division Reference Oracle
//!
//! The slow, obviously-correct counterpart to the segmented sieve: primality
//! by dividing through every candidate divisor up to the square root. Used to
//! cross-check sieve output in debug assertions, in the test suites, and
//! behind the CLI's `--verify` flag. Runtime is O(√n) per integer, so keep
//! the windows short.

/// Primality by trial division. Integers below 2 (including every negative)
/// are not prime.
///
/// The loop condition divides instead of squaring: `d * d <= n` would
/// overflow for n near `i64::MAX`.
pub fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d: i64 = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Count the primes in `[start, start + length)` one integer at a time.
///
/// Normalizes exactly like the segmented counter: non-positive lengths count
/// zero and the sub-2 portion of the window contributes nothing. The end is
/// saturated rather than checked — the oracle is for short windows and stays
/// infallible.
pub fn count_primes_in_interval(start: i64, length: i64) -> i64 {
    if length <= 0 {
        return 0;
    }
    let end = start.saturating_add(length);
    (start.max(2)..end).filter(|&n| is_prime(n)).count() as i64
}

#[cfg(test)]
mod tests {
    //! # Trial-Division Oracle Tests
    //!
    //! The oracle itself needs grounding before anything can be checked
    //! against it: a truth table over the small integers, the negative
    //! domain, and the same pi(x) checkpoints the sieve tests use
    //! (OEIS [A000720](https://oeis.org/A000720)).

    use super::*;

    /// Full truth table for 0..=30; the primes are
    /// 2, 3, 5, 7, 11, 13, 17, 19, 23, 29.
    #[test]
    fn truth_table_to_thirty() {
        let primes = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29];
        for n in 0..=30i64 {
            assert_eq!(is_prime(n), primes.contains(&n), "misclassified {}", n);
        }
    }

    /// No negative integer is prime, down to and including `i64::MIN`, whose
    /// negation does not exist in `i64`.
    #[test]
    fn negatives_are_not_prime() {
        assert!(!is_prime(-1));
        assert!(!is_prime(-2));
        assert!(!is_prime(-17));
        assert!(!is_prime(i64::MIN));
    }

    /// Perfect squares of primes are the boundary case for the `d <= n / d`
    /// loop condition: the square root itself must still be tried.
    #[test]
    fn prime_squares_are_composite() {
        for &p in &[2i64, 3, 5, 7, 11, 101, 997] {
            assert!(!is_prime(p * p), "{}^2 misclassified as prime", p);
        }
    }

    /// pi(x) checkpoints from A000720.
    #[test]
    fn counts_known_pi_values() {
        assert_eq!(count_primes_in_interval(0, 100), 25);
        assert_eq!(count_primes_in_interval(0, 1000), 168);
    }

    /// The oracle applies the same window normalization as the sieve:
    /// negative starts clamp to 2 and non-positive lengths count zero.
    #[test]
    fn window_normalization() {
        assert_eq!(count_primes_in_interval(-5, 10), 2);
        assert_eq!(count_primes_in_interval(0, 10), 4);
        assert_eq!(count_primes_in_interval(2, 1), 1);
        assert_eq!(count_primes_in_interval(4, 6), 2);
        assert_eq!(count_primes_in_interval(10, 0), 0);
        assert_eq!(count_primes_in_interval(10, -4), 0);
    }
}
