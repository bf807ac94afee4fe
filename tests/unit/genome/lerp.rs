use std::collections::BTreeMap;

use super::*;
use crate::foundation::core::{AffineCoeffs, Point, Rgb, ViewParams};

fn passthrough(p: Point, _: f32, _: &[f32], _: &AffineCoeffs) -> Point {
    p
}

fn params(pairs: &[(&str, f32)]) -> BTreeMap<String, f32> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

struct Fixture {
    catalog: VariationCatalog,
    alpha: KindRef, // 1 param
    bravo: KindRef, // 2 params
}

fn fixture() -> Fixture {
    let mut catalog = VariationCatalog::new();
    catalog
        .register("linear", BTreeMap::new(), passthrough)
        .unwrap();
    let alpha = catalog
        .register("alpha", params(&[("s", 9.0)]), passthrough)
        .unwrap();
    let bravo = catalog
        .register("bravo", params(&[("p", 0.25), ("q", 0.75)]), passthrough)
        .unwrap();
    catalog.set_identity("linear").unwrap();
    Fixture {
        catalog,
        alpha,
        bravo,
    }
}

fn genome(f: &Fixture, transforms: usize) -> Genome {
    let mut g = Genome::with_catalog(&f.catalog);
    for i in 0..transforms {
        let t = g.add_transform().unwrap();
        if i > 0 {
            t.set_weight(&mut g, i as f32).unwrap();
            t.set_color_weight(&mut g, 0.1 * i as f32).unwrap();
        }
    }
    g
}

// a: 4 transforms, alpha on row 1 (coef 0.5, s = 3)
fn genome_a(f: &Fixture) -> Genome {
    let mut g = genome(f, 4);
    let u = g.attach_variation(1, &f.alpha).unwrap();
    u.set_coef(&mut g, 0.5).unwrap();
    u.set_param(&mut g, "s", 3.0).unwrap();
    g.transform(3)
        .unwrap()
        .color()
        .set(&mut g, Rgb::new(0.2, 0.4, 0.6))
        .unwrap();
    g
}

// b: 2 transforms, bravo on row 1 (p = 2)
fn genome_b(f: &Fixture) -> Genome {
    let mut g = genome(f, 2);
    let u = g.attach_variation(1, &f.bravo).unwrap();
    u.set_param(&mut g, "p", 2.0).unwrap();
    g.transform(1)
        .unwrap()
        .set_weight(&mut g, 5.0)
        .unwrap();
    g.transform(1)
        .unwrap()
        .pre_affine()
        .set(&mut g, AffineCoeffs::new(0.5, 0.0, 0.0, 0.5, 1.0, 1.0))
        .unwrap();
    g.set_view(ViewParams {
        translate_x: 2.0,
        scale: 3.0,
        ..ViewParams::default()
    })
    .unwrap();
    g
}

#[test]
fn column_plan_merges_sorted_schemas() {
    let f = fixture();
    let a = genome_a(&f);
    let b = genome_b(&f);
    let plan = ColumnPlan::build(&a.active, &b.active).unwrap();

    let names: Vec<&str> = plan.kinds.iter().map(|k| k.name()).collect();
    assert_eq!(names, vec!["alpha", "bravo", "linear"]);
    assert_eq!(plan.var_a, vec![Some(0), None, Some(1)]);
    assert_eq!(plan.var_b, vec![None, Some(0), Some(1)]);
    assert_eq!(plan.param_a, vec![Some(0), None, None]);
    assert_eq!(plan.param_b, vec![None, Some(0), Some(1)]);
    assert_eq!(plan.param_default, vec![9.0, 0.25, 0.75]);
    assert_eq!(plan.param_width(), 3);
}

#[test]
fn lerp_with_self_is_identity() {
    let f = fixture();
    let a = genome_a(&f);
    for mix in [0.0, 0.25, 0.5, 0.9, 1.0] {
        assert_eq!(lerp(&a, &a, mix).unwrap(), a, "mix={mix}");
    }
}

#[test]
fn mix_must_be_in_unit_range() {
    let f = fixture();
    let a = genome_a(&f);
    for mix in [-0.1, 1.5, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            lerp(&a, &a, mix),
            Err(GenomeError::RangeViolation(_))
        ));
    }
}

#[test]
fn output_schema_is_union_and_extent_is_longer_genome() {
    let f = fixture();
    let out = lerp(&genome_a(&f), &genome_b(&f), 0.5).unwrap();
    assert_eq!(out.transform_count(), 4);
    let names: Vec<&str> = out.active_variations().iter().map(|k| k.name()).collect();
    assert_eq!(names, vec!["alpha", "bravo", "linear"]);
    assert_eq!(out.param_width(), 3);
    out.check_invariants().unwrap();
}

#[test]
fn missing_kind_blends_against_zero_coefficient_and_default_params() {
    let f = fixture();
    let out = lerp(&genome_a(&f), &genome_b(&f), 0.5).unwrap();

    // row 1: alpha only in a (coef 0.5 -> 0), bravo only in b (0 -> 1)
    assert_eq!(out.variation_row(1).unwrap(), &[true, true, true]);
    assert_eq!(out.coef_row(1).unwrap(), &[0.25, 0.5, 1.0]);
    // alpha.s: 3 vs default 9; bravo.p: default 0.25 vs 2; bravo.q: 0.75 both
    assert_eq!(out.param_row(1).unwrap(), &[6.0, 1.125, 0.75]);
}

#[test]
fn rows_past_shorter_genome_fade_weight_only() {
    let f = fixture();
    let a = genome_a(&f);
    let out = lerp(&a, &genome_b(&f), 0.25).unwrap();

    assert_eq!(out.weights()[2], 2.0 * 0.75);
    assert_eq!(out.weights()[3], 3.0 * 0.75);
    assert_eq!(out.color_weights()[3], a.color_weights()[3]);
    assert_eq!(&out.colors()[9..12], &a.colors()[9..12]);
    assert_eq!(out.pre_affines()[18..24], a.pre_affines()[18..24]);
    assert_eq!(out.coef_row(3).unwrap(), &[0.0, 0.0, 1.0]);
    assert_eq!(out.variation_row(3).unwrap(), &[false, false, true]);
}

#[test]
fn shared_rows_blend_scalars() {
    let f = fixture();
    let out = lerp(&genome_a(&f), &genome_b(&f), 0.5).unwrap();
    assert_eq!(out.weights()[1], 3.0);
    assert_eq!(
        out.transform(1).unwrap().pre_affine().get(&out).unwrap(),
        AffineCoeffs::new(0.75, 0.0, 0.0, 0.75, 0.5, 0.5)
    );
    assert_eq!(out.view().translate_x, 1.0);
    assert_eq!(out.view().scale, 2.0);
}

#[test]
fn mix_zero_reproduces_a_values() {
    let f = fixture();
    let a = genome_a(&f);
    let out = lerp(&a, &genome_b(&f), 0.0).unwrap();

    assert_eq!(out.weights(), a.weights());
    assert_eq!(out.colors(), a.colors());
    assert_eq!(out.pre_affines(), a.pre_affines());
    assert_eq!(out.view(), a.view());
    for kind in a.active_variations() {
        let col_a = a.column_of(kind).unwrap();
        let col_out = out.column_of(kind).unwrap();
        for t in 0..a.transform_count() {
            assert_eq!(
                out.coef_row(t).unwrap()[col_out],
                a.coef_row(t).unwrap()[col_a]
            );
        }
    }
    // b's extra kind contributes nothing
    let bravo = out.column_of(&f.bravo).unwrap();
    assert_eq!(out.coef_row(1).unwrap()[bravo], 0.0);
}

#[test]
fn mix_one_reproduces_b_on_shared_rows() {
    let f = fixture();
    let b = genome_b(&f);
    let out = lerp(&genome_a(&f), &b, 1.0).unwrap();

    assert_eq!(&out.weights()[..2], b.weights());
    assert_eq!(&out.weights()[2..], &[0.0, 0.0]);
    assert_eq!(&out.pre_affines()[..12], b.pre_affines());
    assert_eq!(out.view(), b.view());
    let bravo_out = out.column_of(&f.bravo).unwrap();
    let bravo_b = b.column_of(&f.bravo).unwrap();
    assert_eq!(
        out.coef_row(1).unwrap()[bravo_out],
        b.coef_row(1).unwrap()[bravo_b]
    );
    let alpha = out.column_of(&f.alpha).unwrap();
    assert_eq!(out.coef_row(1).unwrap()[alpha], 0.0);
    let p = out.param_offset_of(&f.bravo).unwrap();
    assert_eq!(out.param_row(1).unwrap()[p], 2.0);
}

#[test]
fn shorter_first_argument_is_canonicalized() {
    let f = fixture();
    let a = genome_a(&f);
    let b = genome_b(&f);
    assert_eq!(lerp(&b, &a, 0.25).unwrap(), lerp(&a, &b, 0.75).unwrap());
}

#[test]
fn output_keeps_invariants_across_mixes() {
    let f = fixture();
    let a = genome_a(&f);
    let b = genome_b(&f);
    for i in 0..=10 {
        let out = lerp(&a, &b, i as f32 / 10.0).unwrap();
        out.check_invariants().unwrap();
    }
}

#[test]
fn output_stays_mutable() {
    let f = fixture();
    let mut out = lerp(&genome_a(&f), &genome_b(&f), 0.5).unwrap();
    out.add_transform().unwrap();
    assert!(out.detach_variation(1, &f.alpha).unwrap());
    assert!(out.remove_transform(4));
    out.check_invariants().unwrap();
}

#[test]
fn same_name_from_different_catalogs_is_rejected() {
    let f = fixture();
    let mut other = VariationCatalog::new();
    let foreign = other
        .register("alpha", BTreeMap::new(), passthrough)
        .unwrap();

    let a = genome_a(&f);
    let mut b = genome(&f, 2);
    b.attach_variation(1, &foreign).unwrap();
    assert!(matches!(
        lerp(&a, &b, 0.5),
        Err(GenomeError::DuplicateName(_))
    ));
}

#[test]
fn extreme_coefficients_blend_without_overflow() {
    let f = fixture();
    let mut a = genome(&f, 2);
    let mut b = genome(&f, 2);
    let pre = a.transform(1).unwrap().pre_affine();
    pre.set_coeff(&mut a, 0, -3e38).unwrap();
    pre.set_coeff(&mut b, 0, 3e38).unwrap();

    assert_eq!(lerp(&a, &b, 0.0).unwrap(), a);
    assert_eq!(lerp(&a, &b, 1.0).unwrap(), b);

    let mid = lerp(&a, &b, 0.5).unwrap();
    assert_eq!(mid.pre_affines()[6], 0.0);
    assert!(mid.pre_affines().iter().all(|v| v.is_finite()));
    let back = Genome::from_json(&mid.to_json().unwrap(), &f.catalog).unwrap();
    assert_eq!(back, mid);
}
