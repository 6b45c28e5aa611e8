use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

/// Default precision: 2^14 registers (16 KiB), about 0.81 % standard error.
pub const DEFAULT_PRECISION: u32 = 14;

/// HyperLogLog sketch for approximate distinct counts.
///
/// Two sketches of the same precision merge by taking the register-wise
/// maximum, so the estimate does not depend on how the input was split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperLogLog {
    registers: Vec<u8>,
    p: u32,
}

impl Default for HyperLogLog {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl HyperLogLog {
    /// Creates a sketch with precision `p`, clamped to 4..=18.
    pub fn new(p: u32) -> Self {
        let p = p.clamp(4, 18);
        Self {
            registers: vec![0; 1 << p],
            p,
        }
    }

    pub fn insert(&mut self, value: &str) {
        self.insert_hash(xxh3_64(value.as_bytes()));
    }

    pub fn insert_hash(&mut self, hash: u64) {
        let index = (hash >> (64 - self.p)) as usize;
        // The sentinel bit bounds rho when the remaining bits are all zero.
        let remaining = (hash << self.p) | (1 << (self.p - 1));
        let rho = remaining.leading_zeros() as u8 + 1;
        if rho > self.registers[index] {
            self.registers[index] = rho;
        }
    }

    pub fn merge(&mut self, other: &HyperLogLog) {
        debug_assert_eq!(self.p, other.p);
        for (mine, theirs) in self.registers.iter_mut().zip(&other.registers) {
            *mine = (*mine).max(*theirs);
        }
    }

    pub fn estimate(&self) -> f64 {
        let m = self.registers.len() as f64;
        let alpha = match self.registers.len() {
            16 => 0.673,
            32 => 0.697,
            64 => 0.709,
            _ => 0.7213 / (1.0 + 1.079 / m),
        };
        let harmonic: f64 = self
            .registers
            .iter()
            .map(|&r| 2f64.powi(-i32::from(r)))
            .sum();
        let raw = alpha * m * m / harmonic;

        // Linear counting for small cardinalities.
        let zeros = self.registers.iter().filter(|&&r| r == 0).count();
        if raw <= 2.5 * m && zeros > 0 {
            m * (m / zeros as f64).ln()
        } else {
            raw
        }
    }
}
