//! Process-wide read-only catalog of the classic flame variations.

use std::{
    collections::BTreeMap,
    f64::consts::{FRAC_PI_2, PI},
    sync::OnceLock,
};

use crate::foundation::core::{AffineCoeffs, Point};
use crate::variation::catalog::{KindRef, VariationCatalog};

/// Name of the kind auto-attached to new transforms.
pub const LINEAR: &str = "linear";

const EPS: f64 = 1e-10;

type Body = fn(Point, f64, &[f32], &AffineCoeffs) -> Point;

static BUILTINS: OnceLock<VariationCatalog> = OnceLock::new();

/// The built-in catalog, constructed on first use and never mutated afterwards.
pub fn builtin_catalog() -> &'static VariationCatalog {
    BUILTINS.get_or_init(build)
}

/// Shorthand for `builtin_catalog().get(name)`.
pub fn builtin(name: &str) -> Option<&'static KindRef> {
    builtin_catalog().get(name)
}

fn build() -> VariationCatalog {
    let table: &[(&str, &[(&str, f32)], Body)] = &[
        (LINEAR, &[], linear),
        ("sinusoidal", &[], sinusoidal),
        ("spherical", &[], spherical),
        ("swirl", &[], swirl),
        ("horseshoe", &[], horseshoe),
        ("polar", &[], polar),
        ("handkerchief", &[], handkerchief),
        ("heart", &[], heart),
        ("disc", &[], disc),
        ("spiral", &[], spiral),
        ("hyperbolic", &[], hyperbolic),
        ("diamond", &[], diamond),
        ("ex", &[], ex),
        ("bent", &[], bent),
        ("fisheye", &[], fisheye),
        ("exponential", &[], exponential),
        ("popcorn", &[], popcorn),
        ("rings", &[], rings),
        ("fan", &[], fan),
        ("cosine", &[], cosine),
        ("cylinder", &[], cylinder),
        ("tangent", &[], tangent),
        ("cross", &[], cross),
        ("blob", &[("high", 1.0), ("low", 0.0), ("waves", 1.0)], blob),
        ("curl", &[("c1", 1.0), ("c2", 0.0)], curl),
        ("fan2", &[("x", 0.5), ("y", 0.0)], fan2),
        (
            "ngon",
            &[("circle", 1.0), ("corners", 2.0), ("power", 3.0), ("sides", 5.0)],
            ngon,
        ),
        ("pdj", &[("a", 1.0), ("b", 1.0), ("c", 1.0), ("d", 1.0)], pdj),
        ("perspective", &[("angle", 0.5), ("dist", 2.0)], perspective),
        ("rectangles", &[("x", 1.0), ("y", 1.0)], rectangles),
        ("rings2", &[("val", 0.5)], rings2),
    ];

    let mut catalog = VariationCatalog::new();
    for &(name, defaults, body) in table {
        let defaults: BTreeMap<String, f32> =
            defaults.iter().map(|&(k, v)| (k.to_string(), v)).collect();
        // Names in the table are unique and defaults finite, so registration cannot fail.
        if let Err(err) = catalog.register(name, defaults, move |p, w, params, pre| {
            body(p, f64::from(w), params, pre)
        }) {
            tracing::error!(%err, name, "built-in variation failed to register");
        }
    }
    if let Err(err) = catalog.set_identity(LINEAR) {
        tracing::error!(%err, "built-in identity variation missing");
    }
    catalog
}

fn param(params: &[f32], i: usize) -> f64 {
    params.get(i).copied().map(f64::from).unwrap_or(0.0)
}

fn radius(p: Point) -> f64 {
    p.x.hypot(p.y)
}

// atan2(x, y): the angle convention used by the polar family.
fn theta(p: Point) -> f64 {
    p.x.atan2(p.y)
}

fn linear(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    Point::new(w * p.x, w * p.y)
}

fn sinusoidal(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    Point::new(w * p.x.sin(), w * p.y.sin())
}

fn spherical(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r2 = w / (p.x * p.x + p.y * p.y + EPS);
    Point::new(r2 * p.x, r2 * p.y)
}

fn swirl(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r2 = p.x * p.x + p.y * p.y;
    let (s, c) = r2.sin_cos();
    Point::new(w * (p.x * s - p.y * c), w * (p.x * c + p.y * s))
}

fn horseshoe(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = w / (radius(p) + EPS);
    Point::new(r * (p.x - p.y) * (p.x + p.y), r * 2.0 * p.x * p.y)
}

fn polar(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    Point::new(w * theta(p) / PI, w * (radius(p) - 1.0))
}

fn handkerchief(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p);
    let a = theta(p);
    Point::new(w * r * (a + r).sin(), w * r * (a - r).cos())
}

fn heart(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p);
    let (s, c) = (theta(p) * r).sin_cos();
    Point::new(w * r * s, -w * r * c)
}

fn disc(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let a = theta(p) / PI;
    let (s, c) = (PI * radius(p)).sin_cos();
    Point::new(w * a * s, w * a * c)
}

fn spiral(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p) + EPS;
    let (sa, ca) = theta(p).sin_cos();
    let (sr, cr) = r.sin_cos();
    let k = w / r;
    Point::new(k * (ca + sr), k * (sa - cr))
}

fn hyperbolic(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p) + EPS;
    let (s, c) = theta(p).sin_cos();
    Point::new(w * s / r, w * c * r)
}

fn diamond(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p);
    let (sa, ca) = theta(p).sin_cos();
    let (sr, cr) = r.sin_cos();
    Point::new(w * sa * cr, w * ca * sr)
}

fn ex(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = radius(p);
    let a = theta(p);
    let m0 = (a + r).sin().powi(3);
    let m1 = (a - r).cos().powi(3);
    Point::new(w * r * (m0 + m1), w * r * (m0 - m1))
}

fn bent(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let x = if p.x < 0.0 { 2.0 * p.x } else { p.x };
    let y = if p.y < 0.0 { p.y * 0.5 } else { p.y };
    Point::new(w * x, w * y)
}

fn fisheye(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let r = w * 2.0 / (radius(p) + 1.0);
    Point::new(r * p.y, r * p.x)
}

fn exponential(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let dx = w * (p.x - 1.0).exp();
    let (s, c) = (PI * p.y).sin_cos();
    Point::new(dx * c, dx * s)
}

fn popcorn(p: Point, w: f64, _: &[f32], pre: &AffineCoeffs) -> Point {
    let e = f64::from(pre.0[4]);
    let f = f64::from(pre.0[5]);
    Point::new(
        w * (p.x + e * (3.0 * p.y).tan().sin()),
        w * (p.y + f * (3.0 * p.x).tan().sin()),
    )
}

fn rings(p: Point, w: f64, _: &[f32], pre: &AffineCoeffs) -> Point {
    let e = f64::from(pre.0[4]);
    let dx = e * e + EPS;
    let r = radius(p);
    let rr = (r + dx).rem_euclid(2.0 * dx) - dx + r * (1.0 - dx);
    let k = w * rr / (r + EPS);
    Point::new(k * p.x, k * p.y)
}

fn fan(p: Point, w: f64, _: &[f32], pre: &AffineCoeffs) -> Point {
    let e = f64::from(pre.0[4]);
    let f = f64::from(pre.0[5]);
    let dx = PI * (e * e + EPS);
    let half = dx * 0.5;
    let mut a = theta(p);
    if (a + f).rem_euclid(dx) > half {
        a -= half;
    } else {
        a += half;
    }
    let r = w * radius(p);
    Point::new(r * a.cos(), r * a.sin())
}

fn cosine(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let (s, c) = (PI * p.x).sin_cos();
    Point::new(w * c * p.y.cosh(), -w * s * p.y.sinh())
}

fn cylinder(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    Point::new(w * p.x.sin(), w * p.y)
}

fn tangent(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    Point::new(w * p.x.sin() / p.y.cos(), w * p.y.tan())
}

fn cross(p: Point, w: f64, _: &[f32], _: &AffineCoeffs) -> Point {
    let s = p.x * p.x - p.y * p.y;
    let r = w * (1.0 / (s * s + EPS)).sqrt();
    Point::new(p.x * r, p.y * r)
}

fn blob(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (high, low, waves) = (param(params, 0), param(params, 1), param(params, 2));
    let a = p.y.atan2(p.x);
    let r = radius(p);
    let rr = r * (low + (high - low) * (0.5 + 0.5 * (waves * a).sin()));
    Point::new(w * rr * a.cos(), w * rr * a.sin())
}

fn curl(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (c1, c2) = (param(params, 0), param(params, 1));
    let re = 1.0 + c1 * p.x + c2 * (p.x * p.x - p.y * p.y);
    let im = c1 * p.y + 2.0 * c2 * p.x * p.y;
    let r = w / (re * re + im * im + EPS);
    Point::new((p.x * re + p.y * im) * r, (p.y * re - p.x * im) * r)
}

fn fan2(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (fx, fy) = (param(params, 0), param(params, 1));
    let dx = PI * (fx * fx + EPS);
    let half = dx * 0.5;
    let mut a = theta(p);
    let t = a + fy - dx * ((a + fy) / dx).floor();
    if t > half {
        a -= half;
    } else {
        a += half;
    }
    let r = w * radius(p);
    Point::new(r * a.sin(), r * a.cos())
}

fn ngon(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (circle, corners, power, sides) = (
        param(params, 0),
        param(params, 1),
        param(params, 2),
        param(params, 3),
    );
    let r_factor = (p.x * p.x + p.y * p.y).powf(power * 0.5);
    let b = 2.0 * PI / sides.max(EPS);
    let a = p.y.atan2(p.x);
    let mut phi = a - b * (a / b).floor();
    if phi > b * 0.5 {
        phi -= b;
    }
    let amp = (corners * (1.0 / (phi.cos() + EPS) - 1.0) + circle) / (r_factor + EPS);
    Point::new(w * p.x * amp, w * p.y * amp)
}

fn pdj(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (a, b, c, d) = (
        param(params, 0),
        param(params, 1),
        param(params, 2),
        param(params, 3),
    );
    Point::new(
        w * ((a * p.y).sin() - (b * p.x).cos()),
        w * ((c * p.x).sin() - (d * p.y).cos()),
    )
}

fn perspective(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let (angle, dist) = (param(params, 0), param(params, 1));
    let (vsin, vcos) = (angle * FRAC_PI_2).sin_cos();
    let t = 1.0 / (dist - p.y * vsin + EPS);
    Point::new(w * dist * p.x * t, w * dist * vcos * p.y * t)
}

fn rectangles(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    fn fold(v: f64, size: f64) -> f64 {
        if size == 0.0 {
            v
        } else {
            (2.0 * (v / size).floor() + 1.0) * size - v
        }
    }
    let (rx, ry) = (param(params, 0), param(params, 1));
    Point::new(w * fold(p.x, rx), w * fold(p.y, ry))
}

fn rings2(p: Point, w: f64, params: &[f32], _: &AffineCoeffs) -> Point {
    let val = param(params, 0);
    let dx = val * val + EPS;
    let mut r = radius(p);
    r += -2.0 * dx * ((r + dx) / (2.0 * dx)).floor() + r * (1.0 - dx);
    let (s, c) = theta(p).sin_cos();
    Point::new(w * s * r, w * c * r)
}

#[cfg(test)]
#[path = "../../tests/unit/variation/builtin.rs"]
mod tests;
