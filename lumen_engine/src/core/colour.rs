use crate::core::types::{Channel, ColourRgba};

/// A colour with `N` float channels, usable directly as a vertex attribute
#[derive(Copy, Clone, Debug, PartialOrd, PartialEq)]
#[repr(transparent)] // Ensure it's treated as a raw array, so we can cast it to bytes safely
pub struct Colour<const N: usize>(pub [Channel; N]);

// SAFETY: `Colour<N>` is `repr(transparent)` over `[f32; N]`, which is itself `Pod`:
// no padding, every bit pattern valid, and all zeroes is black
unsafe impl<const N: usize> bytemuck::Zeroable for Colour<N> {}
unsafe impl<const N: usize> bytemuck::Pod for Colour<N> {}

impl<const N: usize> Default for Colour<N> {
    fn default() -> Self { Self::BLACK }
}

impl<const N: usize> Colour<N> {
    pub const fn new(val: [Channel; N]) -> Self { Self(val) }

    pub const BLACK: Self = Self::new([0.; N]);
    pub const WHITE: Self = Self::new([1.; N]);
}

impl ColourRgba {
    pub const RED: Self = Self::new([1., 0., 0., 1.]);
    pub const GREEN: Self = Self::new([0., 1., 0., 1.]);
    pub const BLUE: Self = Self::new([0., 0., 1., 1.]);
}

impl<const N: usize> From<[Channel; N]> for Colour<N> {
    fn from(val: [Channel; N]) -> Self { Self::new(val) }
}
impl<const N: usize> From<Colour<N>> for [Channel; N] {
    fn from(Colour(val): Colour<N>) -> Self { val }
}
