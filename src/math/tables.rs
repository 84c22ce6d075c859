//! Lookup tables for trig and square root
//!
//! Angles are resolved to one of 65536 steps over a full turn, trading
//! angular precision for a table read. Square roots go through the
//! classic IEEE-754 bit trick: the low exponent bit plus the top 15 mantissa
//! bits index a table of pre-rooted mantissas, and the exponent is halved
//! arithmetically.
//!
//! The tables are built once by `MathTables::new()` and are read-only after
//! that. Callers hold the struct (or a reference to it) and pass it where
//! table-driven math is wanted.

use std::f32::consts::TAU;

/// Number of entries in the sin/cos tables (one full turn)
pub const TRIG_TABLE_SIZE: usize = 65536;

const TRIG_MASK: usize = TRIG_TABLE_SIZE - 1;

/// Table steps per radian
const STEPS_PER_RADIAN: f32 = TRIG_TABLE_SIZE as f32 / TAU;

/// Number of entries in the sqrt mantissa table (1 exponent bit + 15 mantissa bits)
const SQRT_TABLE_SIZE: usize = 0x10000;

/// Precomputed trig and sqrt tables
pub struct MathTables {
    sin: Box<[f32]>,
    cos: Box<[f32]>,
    sqrt: Box<[u32]>,
}

impl MathTables {
    /// Build all tables. Costs a few hundred microseconds; do it once at startup.
    pub fn new() -> Self {
        let mut sin = Vec::with_capacity(TRIG_TABLE_SIZE);
        let mut cos = Vec::with_capacity(TRIG_TABLE_SIZE);
        for i in 0..TRIG_TABLE_SIZE {
            // f64 for the build so the table itself carries no accumulated error
            let angle = i as f64 * std::f64::consts::TAU / TRIG_TABLE_SIZE as f64;
            sin.push(angle.sin() as f32);
            cos.push(angle.cos() as f32);
        }

        let mut sqrt = vec![0u32; SQRT_TABLE_SIZE];
        for i in 0..0x8000u32 {
            // Odd exponent (bit 23 set): build against 1.0 .. 2.0
            let odd = f32::from_bits((i << 8) | (0x7F << 23));
            sqrt[(i + 0x8000) as usize] = odd.sqrt().to_bits() & 0x7F_FFFF;
            // Even exponent: build against 2.0 .. 4.0
            let even = f32::from_bits((i << 8) | (0x80 << 23));
            sqrt[i as usize] = even.sqrt().to_bits() & 0x7F_FFFF;
        }

        Self {
            sin: sin.into_boxed_slice(),
            cos: cos.into_boxed_slice(),
            sqrt: sqrt.into_boxed_slice(),
        }
    }

    /// Table index for an angle in radians (any range, wraps)
    #[inline]
    pub fn angle_index(radians: f32) -> u16 {
        let wrapped = radians.rem_euclid(TAU);
        ((wrapped * STEPS_PER_RADIAN + 0.5) as usize & TRIG_MASK) as u16
    }

    /// Convert degrees to a table index
    #[inline]
    pub fn degrees_to_angle(degrees: f32) -> u16 {
        Self::angle_index(degrees.to_radians())
    }

    /// Table sine of an angle in radians
    #[inline]
    pub fn sin(&self, radians: f32) -> f32 {
        self.sin[Self::angle_index(radians) as usize]
    }

    /// Table cosine of an angle in radians
    #[inline]
    pub fn cos(&self, radians: f32) -> f32 {
        self.cos[Self::angle_index(radians) as usize]
    }

    /// (sin, cos) pair from one index computation
    #[inline]
    pub fn sin_cos(&self, radians: f32) -> (f32, f32) {
        let i = Self::angle_index(radians) as usize;
        (self.sin[i], self.cos[i])
    }

    /// Approximate square root.
    ///
    /// Only meaningful for positive finite inputs up to roughly 1e9; zero
    /// maps to zero. Negative inputs, NaN and infinities give garbage.
    #[inline]
    pub fn fast_sqrt(&self, n: f32) -> f32 {
        let bits = n.to_bits();
        if bits == 0 {
            return 0.0;
        }
        let mantissa = self.sqrt[((bits >> 8) & 0xFFFF) as usize];
        // Halve the unbiased exponent; wrapping keeps inputs below 1.0 correct
        let exponent =
            ((bits.wrapping_sub(0x3F80_0000) >> 1).wrapping_add(0x3F80_0000)) & 0x7F80_0000;
        f32::from_bits(mantissa | exponent)
    }
}

impl Default for MathTables {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MathTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MathTables")
            .field("trig_entries", &self.sin.len())
            .field("sqrt_entries", &self.sqrt.len())
            .finish()
    }
}
