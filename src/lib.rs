pub mod count;
pub mod sieve;
pub mod trialdiv;

pub use count::{count_primes_in_interval, count_primes_segmented, MAX_SEGMENT_LENGTH};
pub use sieve::{BitSieve, SmallPrimes};
