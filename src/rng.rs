use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One ChaCha8 stream per system. A stream's seed depends only on the run
/// seed and the system name, so adding or reordering systems leaves the
/// other streams untouched.
pub struct RngManager {
    seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let seed = self.seed;
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(seed ^ name_hash(name)));
        SystemRng { inner: entry }
    }
}

// FNV-1a; stable across platforms and releases, unlike `DefaultHasher`.
fn name_hash(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub struct SystemRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for SystemRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streams_ignore_request_order() {
        let mut a = RngManager::new(99);
        let mut b = RngManager::new(99);
        let _ = a.stream("spawner").next_u64();
        let from_a = a.stream("combat").next_u64();
        let from_b = b.stream("combat").next_u64();
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn streams_differ_by_name_and_continue() {
        let mut rng = RngManager::new(1);
        let first = rng.stream("wander").next_u64();
        let other = rng.stream("spawner").next_u64();
        let second = rng.stream("wander").next_u64();
        assert_ne!(first, other);
        assert_ne!(first, second);
    }
}
