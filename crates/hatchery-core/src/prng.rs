//! Seeded PRNG for the art engine.
//!
//! Mulberry32 with the canonical constants, so renders reproduce bit-for-bit
//! against the web viewers that ship the same generator. One render call
//! draws everything (pixels first, then overlays) from a single stream; the
//! stream must never be reseeded or reordered mid-render.

/// Derive the 32-bit render seed from `(profile_id, score, grid_size)`.
/// Fixed avalanche mix; changing any constant changes every render ever made.
pub fn mix_seed(profile_id: u64, score: u64, grid_size: u32) -> u32 {
    let mut h = profile_id.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    h ^= score.wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= u64::from(grid_size).wrapping_mul(0x1656_67B1_9E37_79F9);
    h ^= h >> 33;
    h = h.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    h ^= h >> 29;
    (h as u32) ^ ((h >> 32) as u32)
}

#[derive(Debug, Clone)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut z = self.state;
        z = (z ^ (z >> 15)).wrapping_mul(z | 1);
        z ^= z.wrapping_add((z ^ (z >> 7)).wrapping_mul(z | 61));
        z ^ (z >> 14)
    }

    /// Uniform draw in `[0, 1)`, the shape the layout and overlay code use.
    pub fn next_unit(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}
