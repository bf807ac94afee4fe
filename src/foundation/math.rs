use crate::foundation::core::{AffineCoeffs, Background, Coloration, Rgb, ViewParams};

/// Linear blend of `a` toward `b` by `t`, applied field by field for composite values.
pub trait Lerp: Sized {
    /// Blend `a` toward `b` by `t`.
    fn lerp(a: &Self, b: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        lerp_f32(*a, *b, t)
    }
}

impl Lerp for Rgb {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            r: lerp_f32(a.r, b.r, t),
            g: lerp_f32(a.g, b.g, t),
            b: lerp_f32(a.b, b.b, t),
        }
    }
}

impl Lerp for AffineCoeffs {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self(std::array::from_fn(|i| lerp_f32(a.0[i], b.0[i], t)))
    }
}

impl Lerp for ViewParams {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            translate_x: lerp_f32(a.translate_x, b.translate_x, t),
            translate_y: lerp_f32(a.translate_y, b.translate_y, t),
            rotation_deg: lerp_f32(a.rotation_deg, b.rotation_deg, t),
            scale: lerp_f32(a.scale, b.scale, t),
        }
    }
}

impl Lerp for Coloration {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            brightness: lerp_f32(a.brightness, b.brightness, t),
            inv_gamma: lerp_f32(a.inv_gamma, b.inv_gamma, t),
            vibrancy: lerp_f32(a.vibrancy, b.vibrancy, t),
        }
    }
}

impl Lerp for Background {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self {
            a: lerp_f32(a.a, b.a, t),
            r: lerp_f32(a.r, b.r, t),
            g: lerp_f32(a.g, b.g, t),
            b: lerp_f32(a.b, b.b, t),
        }
    }
}

/// `a * (1 - t) + b * t`, exact at both endpoints and returning `a` whenever `a == b`.
///
/// Finite endpoints give a finite result inside `[min(a, b), max(a, b)]`, even when `b - a`
/// itself would overflow.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    if t <= 0.0 || a == b {
        return a;
    }
    if t >= 1.0 {
        return b;
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    (a * (1.0 - t) + b * t).max(lo).min(hi)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
