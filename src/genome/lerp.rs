//! Cross-schema interpolation between two genomes.

use std::cmp::Ordering;

use crate::foundation::{
    error::{GenomeError, GenomeResult},
    math::{Lerp, lerp_f32},
};
use crate::genome::store::{AFFINE_STRIDE, COLOR_STRIDE, Genome};
use crate::variation::catalog::{KindRef, VariationCatalog};

/// Column reconciliation between two sources and their merged schema.
///
/// Each output variation column and parameter column maps to its column in `a` and in `b`,
/// or `None` where that source lacks the kind.
#[derive(Clone, Debug)]
pub(crate) struct ColumnPlan {
    pub(crate) kinds: Vec<KindRef>,
    pub(crate) var_a: Vec<Option<usize>>,
    pub(crate) var_b: Vec<Option<usize>>,
    pub(crate) param_a: Vec<Option<usize>>,
    pub(crate) param_b: Vec<Option<usize>>,
    pub(crate) param_default: Vec<f32>,
}

enum Side {
    A,
    B,
    Both,
}

impl ColumnPlan {
    /// Single merge walk over both name-sorted kind lists.
    pub(crate) fn build(a: &[KindRef], b: &[KindRef]) -> GenomeResult<Self> {
        let capacity = a.len() + b.len();
        let mut plan = Self {
            kinds: Vec::with_capacity(capacity),
            var_a: Vec::with_capacity(capacity),
            var_b: Vec::with_capacity(capacity),
            param_a: Vec::new(),
            param_b: Vec::new(),
            param_default: Vec::new(),
        };

        let (mut i, mut j) = (0, 0);
        let (mut offset_a, mut offset_b) = (0, 0);
        loop {
            let side = match (a.get(i), b.get(j)) {
                (None, None) => break,
                (Some(_), None) => Side::A,
                (None, Some(_)) => Side::B,
                (Some(ka), Some(kb)) => match VariationCatalog::compare(ka, kb) {
                    Ordering::Less => Side::A,
                    Ordering::Greater => Side::B,
                    Ordering::Equal if ka == kb => Side::Both,
                    Ordering::Equal => {
                        return Err(GenomeError::duplicate(format!(
                            "both genomes use a different variation named '{}'",
                            ka.name()
                        )));
                    }
                },
            };

            let (kind, in_a, in_b) = match side {
                Side::A => (&a[i], true, false),
                Side::B => (&b[j], false, true),
                Side::Both => (&a[i], true, true),
            };
            let n = kind.param_count();

            plan.kinds.push(kind.clone());
            plan.var_a.push(in_a.then_some(i));
            plan.var_b.push(in_b.then_some(j));
            for (k, &default) in kind.param_defaults().iter().enumerate() {
                plan.param_a.push(in_a.then_some(offset_a + k));
                plan.param_b.push(in_b.then_some(offset_b + k));
                plan.param_default.push(default);
            }

            if in_a {
                i += 1;
                offset_a += n;
            }
            if in_b {
                j += 1;
                offset_b += n;
            }
        }
        Ok(plan)
    }

    pub(crate) fn param_width(&self) -> usize {
        self.param_default.len()
    }
}

/// Blend `a` toward `b` by `mix` in `[0, 1]`, reconciling their variation schemas.
///
/// The output has `max(|a|, |b|)` transforms and the union of both active kind sets. Rows
/// missing from the shorter genome keep the longer genome's values, except that their
/// weight fades by `1 - mix`. A kind missing from one side blends against coefficient 0
/// and against its default parameters.
#[tracing::instrument(skip(a, b), fields(a_transforms = a.transform_count, b_transforms = b.transform_count))]
pub fn lerp(a: &Genome, b: &Genome, mix: f32) -> GenomeResult<Genome> {
    if !mix.is_finite() || !(0.0..=1.0).contains(&mix) {
        return Err(GenomeError::range(format!(
            "mix must be in [0, 1], got {mix}"
        )));
    }
    let (a, b, mix) = if a.transform_count >= b.transform_count {
        (a, b, mix)
    } else {
        (b, a, 1.0 - mix)
    };

    let plan = ColumnPlan::build(&a.active, &b.active)?;
    let out = blend(a, b, mix, plan);
    tracing::debug!(
        transforms = out.transform_count,
        variations = out.active.len(),
        params = out.param_width,
        "genomes interpolated"
    );
    Ok(out)
}

// `a` has at least as many transforms as `b`.
fn blend(a: &Genome, b: &Genome, mix: f32, plan: ColumnPlan) -> Genome {
    let rows = a.transform_count;
    let shared_rows = b.transform_count;
    let v = plan.kinds.len();
    let p = plan.param_width();
    let (va, vb) = (a.active.len(), b.active.len());
    let (pa, pb) = (a.param_width, b.param_width);

    let mut out = Genome::empty(a.identity.clone().or_else(|| b.identity.clone()));
    out.weight.reserve_exact(rows);
    out.color_weight.reserve_exact(rows);
    out.color.reserve_exact(rows * COLOR_STRIDE);
    out.affine_pre.reserve_exact(rows * AFFINE_STRIDE);
    out.affine_post.reserve_exact(rows * AFFINE_STRIDE);
    out.has_variation.reserve_exact(rows * v);
    out.variation_coef.reserve_exact(rows * v);
    out.param_value.reserve_exact(rows * p);

    for t in 0..rows {
        let shared = t < shared_rows;

        if shared {
            out.weight.push(lerp_f32(a.weight[t], b.weight[t], mix));
            out.color_weight
                .push(lerp_f32(a.color_weight[t], b.color_weight[t], mix));
            blend_row(&mut out.color, &a.color, &b.color, t, COLOR_STRIDE, mix);
            blend_row(&mut out.affine_pre, &a.affine_pre, &b.affine_pre, t, AFFINE_STRIDE, mix);
            blend_row(&mut out.affine_post, &a.affine_post, &b.affine_post, t, AFFINE_STRIDE, mix);
        } else {
            out.weight.push(a.weight[t] * (1.0 - mix));
            out.color_weight.push(a.color_weight[t]);
            copy_row(&mut out.color, &a.color, t, COLOR_STRIDE);
            copy_row(&mut out.affine_pre, &a.affine_pre, t, AFFINE_STRIDE);
            copy_row(&mut out.affine_post, &a.affine_post, t, AFFINE_STRIDE);
        }

        for c in 0..v {
            let (has_a, coef_a) = match plan.var_a[c] {
                Some(col) => (a.has_variation[t * va + col], a.variation_coef[t * va + col]),
                None => (false, 0.0),
            };
            let (has_b, coef_b) = match (shared, plan.var_b[c]) {
                (true, Some(col)) => (b.has_variation[t * vb + col], b.variation_coef[t * vb + col]),
                (true, None) => (false, 0.0),
                // past b's extent the row is carried from a untouched
                (false, _) => (false, coef_a),
            };
            out.has_variation.push(has_a || has_b);
            out.variation_coef.push(lerp_f32(coef_a, coef_b, mix));
        }

        for c in 0..p {
            let default = plan.param_default[c];
            let value_a = plan.param_a[c].map_or(default, |col| a.param_value[t * pa + col]);
            let value_b = match (shared, plan.param_b[c]) {
                (true, Some(col)) => b.param_value[t * pb + col],
                (true, None) => default,
                (false, _) => value_a,
            };
            out.param_value.push(lerp_f32(value_a, value_b, mix));
        }
    }

    out.transform_count = rows;
    out.param_width = p;
    out.active = plan.kinds;
    out.view = Lerp::lerp(&a.view, &b.view, mix);
    out.coloration = Lerp::lerp(&a.coloration, &b.coloration, mix);
    out.background = Lerp::lerp(&a.background, &b.background, mix);
    out
}

fn blend_row(out: &mut Vec<f32>, a: &[f32], b: &[f32], row: usize, stride: usize, mix: f32) {
    let s = row * stride;
    out.extend(
        a[s..s + stride]
            .iter()
            .zip(&b[s..s + stride])
            .map(|(&x, &y)| lerp_f32(x, y, mix)),
    );
}

fn copy_row(out: &mut Vec<f32>, a: &[f32], row: usize, stride: usize) {
    let s = row * stride;
    out.extend_from_slice(&a[s..s + stride]);
}

#[cfg(test)]
#[path = "../../tests/unit/genome/lerp.rs"]
mod tests;
