//! Classic iterated function systems on the built-in catalog.
//!
//! Each map is a pre-affine feeding the `linear` variation, so the attractor is the plain
//! affine IFS. Transform 0 is an identity final transform.

use crate::foundation::{
    core::{AffineCoeffs, Rgb, ViewParams},
    error::GenomeResult,
};
use crate::genome::store::Genome;

struct Map {
    weight: f32,
    affine: AffineCoeffs,
    color: Rgb,
}

fn ifs(maps: &[Map], view: ViewParams) -> GenomeResult<Genome> {
    let mut g = Genome::new();
    g.add_transform()?;
    for m in maps {
        let t = g.add_transform()?;
        t.set_weight(&mut g, m.weight)?;
        t.pre_affine().set(&mut g, m.affine)?;
        t.color().set(&mut g, m.color)?;
    }
    g.set_view(view)?;
    Ok(g)
}

/// Three half-scale maps toward the corners of `(0,0)`, `(1,0)`, `(0.5, 0.866)`.
pub fn sierpinski_triangle() -> GenomeResult<Genome> {
    const H: f32 = 0.433_012_7; // sqrt(3) / 4
    ifs(
        &[
            Map {
                weight: 1.0,
                affine: AffineCoeffs::new(0.5, 0.0, 0.0, 0.5, 0.0, 0.0),
                color: Rgb::new(1.0, 0.0, 0.0),
            },
            Map {
                weight: 1.0,
                affine: AffineCoeffs::new(0.5, 0.0, 0.0, 0.5, 0.5, 0.0),
                color: Rgb::new(0.0, 1.0, 0.0),
            },
            Map {
                weight: 1.0,
                affine: AffineCoeffs::new(0.5, 0.0, 0.0, 0.5, 0.25, H),
                color: Rgb::new(0.0, 0.0, 1.0),
            },
        ],
        ViewParams {
            translate_x: 0.5,
            translate_y: H,
            rotation_deg: 0.0,
            scale: 1.8,
        },
    )
}

/// Heighway dragon: two 45-degree rotations scaled by `1/sqrt(2)`.
pub fn heighway_dragon() -> GenomeResult<Genome> {
    ifs(
        &[
            Map {
                weight: 1.0,
                affine: AffineCoeffs::new(0.5, 0.5, -0.5, 0.5, 0.0, 0.0),
                color: Rgb::new(1.0, 0.6, 0.1),
            },
            Map {
                weight: 1.0,
                affine: AffineCoeffs::new(-0.5, 0.5, -0.5, -0.5, 1.0, 0.0),
                color: Rgb::new(0.1, 0.4, 1.0),
            },
        ],
        ViewParams {
            translate_x: 0.42,
            translate_y: 0.17,
            rotation_deg: 0.0,
            scale: 1.2,
        },
    )
}

/// Barnsley fern with its usual selection probabilities.
pub fn barnsley_fern() -> GenomeResult<Genome> {
    ifs(
        &[
            // stem
            Map {
                weight: 0.01,
                affine: AffineCoeffs::new(0.0, 0.0, 0.0, 0.16, 0.0, 0.0),
                color: Rgb::new(0.4, 0.25, 0.1),
            },
            Map {
                weight: 0.85,
                affine: AffineCoeffs::new(0.85, -0.04, 0.04, 0.85, 0.0, 1.6),
                color: Rgb::new(0.1, 0.8, 0.2),
            },
            Map {
                weight: 0.07,
                affine: AffineCoeffs::new(0.2, 0.23, -0.26, 0.22, 0.0, 1.6),
                color: Rgb::new(0.2, 0.6, 0.1),
            },
            Map {
                weight: 0.07,
                affine: AffineCoeffs::new(-0.15, 0.26, 0.28, 0.24, 0.0, 0.44),
                color: Rgb::new(0.3, 0.7, 0.3),
            },
        ],
        ViewParams {
            translate_x: 0.25,
            translate_y: 5.0,
            rotation_deg: 0.0,
            scale: 0.19,
        },
    )
}

#[cfg(test)]
#[path = "../../tests/unit/genome/presets.rs"]
mod tests;
