use crate::foundation::error::{GenomeError, GenomeResult};

pub use kurbo::{Affine, Point, Vec2};

/// Linear RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
}

impl Rgb {
    /// Build a color from its three channels.
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Opaque white, the color of a freshly added transform.
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Channels in `[r, g, b]` order.
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Reject non-finite channels or channels outside `[0, 1]`.
    pub fn validate(self) -> GenomeResult<()> {
        ensure_unit("color.r", self.r)?;
        ensure_unit("color.g", self.g)?;
        ensure_unit("color.b", self.b)?;
        Ok(())
    }
}

/// Six affine coefficients `[a, b, c, d, e, f]` in kurbo order:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AffineCoeffs(pub [f32; 6]);

impl Default for AffineCoeffs {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineCoeffs {
    /// The identity mapping.
    pub const IDENTITY: Self = Self([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Build from the linear part `(a, b, c, d)` and translation `(e, f)`.
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self([a, b, c, d, e, f])
    }

    /// Narrow a kurbo affine to packed coefficients.
    pub fn from_affine(affine: Affine) -> Self {
        let c = affine.as_coeffs();
        Self([
            c[0] as f32,
            c[1] as f32,
            c[2] as f32,
            c[3] as f32,
            c[4] as f32,
            c[5] as f32,
        ])
    }

    /// Widen to a kurbo affine.
    pub fn to_affine(self) -> Affine {
        Affine::new(self.0.map(f64::from))
    }

    /// Map a point through this affine.
    pub fn apply(self, p: Point) -> Point {
        self.to_affine() * p
    }

    /// Reject non-finite coefficients.
    pub fn validate(self) -> GenomeResult<()> {
        for (i, &c) in self.0.iter().enumerate() {
            if !c.is_finite() {
                return Err(GenomeError::range(format!(
                    "affine coefficient {i} must be finite, got {c}"
                )));
            }
        }
        Ok(())
    }
}

/// Camera placement of the fractal in world space.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewParams {
    /// World-space x at the image center.
    pub translate_x: f32,
    /// World-space y at the image center.
    pub translate_y: f32,
    /// Rotation in degrees, `[0, 360)`.
    pub rotation_deg: f32,
    /// Zoom; 1.0 maps the unit radius onto half of the image's shorter side.
    pub scale: f32,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            rotation_deg: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewParams {
    /// Reject non-finite fields, a negative scale, or rotation outside `[0, 360)`.
    pub fn validate(&self) -> GenomeResult<()> {
        ensure_finite("view.translate_x", self.translate_x)?;
        ensure_finite("view.translate_y", self.translate_y)?;
        ensure_finite("view.rotation_deg", self.rotation_deg)?;
        if !(0.0..360.0).contains(&self.rotation_deg) {
            return Err(GenomeError::range(format!(
                "view.rotation_deg must be in [0, 360), got {}",
                self.rotation_deg
            )));
        }
        ensure_non_negative("view.scale", self.scale)?;
        Ok(())
    }

    /// Copy with rotation wrapped into `[0, 360)`.
    pub fn normalized(mut self) -> Self {
        if self.rotation_deg.is_finite() {
            self.rotation_deg = self.rotation_deg.rem_euclid(360.0);
            // rem_euclid can round up to exactly 360 for tiny negative inputs
            if self.rotation_deg >= 360.0 {
                self.rotation_deg = 0.0;
            }
        }
        self
    }

    /// World-to-pixel affine for a `width` x `height` image.
    pub fn to_affine(&self, width: u32, height: u32) -> Affine {
        let w = f64::from(width);
        let h = f64::from(height);
        let unit = f64::from(self.scale) * w.min(h) * 0.5;

        // Canonical order:
        // T(center) * S(scale * min/2) * R(rot) * T(-translate)
        Affine::translate(Vec2::new(w * 0.5, h * 0.5))
            * Affine::scale(unit)
            * Affine::rotate(f64::from(self.rotation_deg).to_radians())
            * Affine::translate(Vec2::new(
                -f64::from(self.translate_x),
                -f64::from(self.translate_y),
            ))
    }
}

/// Tone-mapping parameters applied by the render kernel.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coloration {
    /// Overall brightness, > 0.
    pub brightness: f32,
    /// Reciprocal of the gamma exponent, > 0.
    pub inv_gamma: f32,
    /// Blend between per-channel and luminance gamma, `[0, 1]`.
    pub vibrancy: f32,
}

impl Default for Coloration {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            inv_gamma: 1.0 / 2.2,
            vibrancy: 1.0,
        }
    }
}

impl Coloration {
    /// Reject values outside each field's domain.
    pub fn validate(&self) -> GenomeResult<()> {
        ensure_positive("coloration.brightness", self.brightness)?;
        ensure_positive("coloration.inv_gamma", self.inv_gamma)?;
        ensure_unit("coloration.vibrancy", self.vibrancy)?;
        Ok(())
    }

    /// Fields in `[brightness, inv_gamma, vibrancy]` order.
    pub fn to_array(self) -> [f32; 3] {
        [self.brightness, self.inv_gamma, self.vibrancy]
    }
}

/// Straight-alpha background color, all channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Background {
    /// Alpha.
    pub a: f32,
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            a: 1.0,
            r: 0.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

impl Background {
    /// Reject channels outside `[0, 1]`.
    pub fn validate(&self) -> GenomeResult<()> {
        ensure_unit("background.a", self.a)?;
        ensure_unit("background.r", self.r)?;
        ensure_unit("background.g", self.g)?;
        ensure_unit("background.b", self.b)?;
        Ok(())
    }

    /// Channels in `[a, r, g, b]` order.
    pub fn to_array(self) -> [f32; 4] {
        [self.a, self.r, self.g, self.b]
    }
}

pub(crate) fn ensure_finite(what: &str, v: f32) -> GenomeResult<f32> {
    if !v.is_finite() {
        return Err(GenomeError::range(format!("{what} must be finite, got {v}")));
    }
    Ok(v)
}

pub(crate) fn ensure_non_negative(what: &str, v: f32) -> GenomeResult<f32> {
    ensure_finite(what, v)?;
    if v < 0.0 {
        return Err(GenomeError::range(format!("{what} must be >= 0, got {v}")));
    }
    Ok(v)
}

pub(crate) fn ensure_positive(what: &str, v: f32) -> GenomeResult<f32> {
    ensure_finite(what, v)?;
    if v <= 0.0 {
        return Err(GenomeError::range(format!("{what} must be > 0, got {v}")));
    }
    Ok(v)
}

pub(crate) fn ensure_unit(what: &str, v: f32) -> GenomeResult<f32> {
    ensure_finite(what, v)?;
    if !(0.0..=1.0).contains(&v) {
        return Err(GenomeError::range(format!(
            "{what} must be in [0, 1], got {v}"
        )));
    }
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
