use super::*;

fn passthrough(p: Point, _coef: f32, _params: &[f32], _pre: &AffineCoeffs) -> Point {
    p
}

fn params(pairs: &[(&str, f32)]) -> BTreeMap<String, f32> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn register_sorts_parameter_schema_by_name() {
    let mut cat = VariationCatalog::new();
    let k = cat
        .register("blob", params(&[("waves", 1.0), ("high", 1.0), ("low", 0.0)]), passthrough)
        .unwrap();
    assert_eq!(k.param_names(), &["high", "low", "waves"]);
    assert_eq!(k.param_defaults(), &[1.0, 0.0, 1.0]);
    assert_eq!(k.param_index("low"), Some(1));
    assert_eq!(k.param_index("nope"), None);
}

#[test]
fn duplicate_names_are_rejected() {
    let mut cat = VariationCatalog::new();
    cat.register("linear", BTreeMap::new(), passthrough).unwrap();
    let err = cat
        .register("linear", BTreeMap::new(), passthrough)
        .unwrap_err();
    assert!(matches!(err, GenomeError::DuplicateName(_)));
    assert_eq!(cat.len(), 1);
}

#[test]
fn non_finite_defaults_are_rejected() {
    let mut cat = VariationCatalog::new();
    let err = cat
        .register("bad", params(&[("x", f32::NAN)]), passthrough)
        .unwrap_err();
    assert!(matches!(err, GenomeError::RangeViolation(_)));
    assert!(cat.is_empty());
}

#[test]
fn identity_is_by_catalog_not_name() {
    let mut a = VariationCatalog::new();
    let mut b = VariationCatalog::new();
    let ka = a.register("swirl", BTreeMap::new(), passthrough).unwrap();
    let kb = b.register("swirl", BTreeMap::new(), passthrough).unwrap();

    assert_ne!(ka, kb);
    assert_eq!(VariationCatalog::compare(&ka, &kb), Ordering::Equal);
    assert_ne!(ka.cmp(&kb), Ordering::Equal);
    assert!(a.contains(&ka));
    assert!(!a.contains(&kb));
    assert_eq!(a.get("swirl"), Some(&ka));
}

#[test]
fn ordering_is_lexicographic_by_name() {
    let mut cat = VariationCatalog::new();
    let z = cat.register("zeta", BTreeMap::new(), passthrough).unwrap();
    let a = cat.register("alpha", BTreeMap::new(), passthrough).unwrap();
    let m = cat.register("mu", BTreeMap::new(), passthrough).unwrap();

    let mut v = vec![z.clone(), m.clone(), a.clone()];
    v.sort();
    assert_eq!(v, vec![a, m, z]);

    let names: Vec<&str> = cat.iter().map(|k| k.name()).collect();
    assert_eq!(names, vec!["alpha", "mu", "zeta"]);
}

#[test]
fn set_identity_requires_registered_kind() {
    let mut cat = VariationCatalog::new();
    assert!(cat.identity().is_none());
    assert!(matches!(
        cat.set_identity("linear"),
        Err(GenomeError::SchemaMismatch(_))
    ));
    let lin = cat.register("linear", BTreeMap::new(), passthrough).unwrap();
    cat.set_identity("linear").unwrap();
    assert_eq!(cat.identity(), Some(&lin));
}

#[test]
fn apply_invokes_registered_capability() {
    let mut cat = VariationCatalog::new();
    let k = cat
        .register("shift", params(&[("dx", 2.0)]), |p: Point, coef: f32, params: &[f32], _pre: &AffineCoeffs| {
            Point::new(
                f64::from(coef) * (p.x + f64::from(params[0])),
                f64::from(coef) * p.y,
            )
        })
        .unwrap();
    let out = k.apply(Point::new(1.0, 1.0), 0.5, &[2.0], &AffineCoeffs::IDENTITY);
    assert_eq!(out, Point::new(1.5, 0.5));
}
