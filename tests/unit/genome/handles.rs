use super::*;
use crate::variation::builtin::builtin;

fn kind(name: &str) -> KindRef {
    builtin(name).unwrap().clone()
}

fn two_transforms() -> (Genome, TransformHandle) {
    let mut g = Genome::new();
    g.add_transform().unwrap();
    let t = g.add_transform().unwrap();
    (g, t)
}

#[test]
fn transform_scalars_round_trip_and_validate() {
    let (mut g, t) = two_transforms();
    assert_eq!(t.index(), 1);
    assert!(!t.is_final());
    assert!(g.final_transform().unwrap().is_final());

    t.set_weight(&mut g, 2.5).unwrap();
    t.set_color_weight(&mut g, 0.75).unwrap();
    assert_eq!(t.weight(&g).unwrap(), 2.5);
    assert_eq!(t.color_weight(&g).unwrap(), 0.75);

    assert!(matches!(
        t.set_weight(&mut g, -1.0),
        Err(GenomeError::RangeViolation(_))
    ));
    assert!(matches!(
        t.set_color_weight(&mut g, 1.5),
        Err(GenomeError::RangeViolation(_))
    ));
    assert!(matches!(
        t.set_weight(&mut g, f32::NAN),
        Err(GenomeError::RangeViolation(_))
    ));
    // failed writes leave the old values
    assert_eq!(t.weight(&g).unwrap(), 2.5);
    assert_eq!(t.color_weight(&g).unwrap(), 0.75);
}

#[test]
fn color_handle_rejects_out_of_range_channels() {
    let (mut g, t) = two_transforms();
    let c = t.color();
    assert_eq!(c.transform(), t);
    assert_eq!(c.get(&g).unwrap(), Rgb::white());

    c.set(&mut g, Rgb::new(0.1, 0.2, 0.3)).unwrap();
    assert_eq!(c.get(&g).unwrap(), Rgb::new(0.1, 0.2, 0.3));
    assert!(matches!(
        c.set(&mut g, Rgb::new(0.1, -0.2, 0.3)),
        Err(GenomeError::RangeViolation(_))
    ));
    assert_eq!(c.get(&g).unwrap(), Rgb::new(0.1, 0.2, 0.3));
}

#[test]
fn affine_slots_are_independent() {
    let (mut g, t) = two_transforms();
    let pre = t.pre_affine();
    let post = t.post_affine();
    assert_eq!(pre.slot(), AffineSlot::Pre);
    assert_eq!(post.slot(), AffineSlot::Post);

    pre.set(&mut g, AffineCoeffs::new(2.0, 0.0, 0.0, 2.0, 1.0, 0.0))
        .unwrap();
    post.set_coeff(&mut g, 5, -3.0).unwrap();

    assert_eq!(
        pre.get(&g).unwrap(),
        AffineCoeffs::new(2.0, 0.0, 0.0, 2.0, 1.0, 0.0)
    );
    assert_eq!(
        post.get(&g).unwrap(),
        AffineCoeffs::new(1.0, 0.0, 0.0, 1.0, 0.0, -3.0)
    );
    let p = pre.apply(&g, Point::new(1.0, 1.0)).unwrap();
    assert_eq!(p, Point::new(3.0, 2.0));
}

#[test]
fn affine_coefficient_index_and_value_are_checked() {
    let (mut g, t) = two_transforms();
    let pre = t.pre_affine();
    assert!(matches!(
        pre.set_coeff(&mut g, 6, 1.0),
        Err(GenomeError::InvalidIndex(_))
    ));
    assert!(matches!(
        pre.set_coeff(&mut g, 0, f32::INFINITY),
        Err(GenomeError::RangeViolation(_))
    ));
    assert!(matches!(
        pre.set(&mut g, AffineCoeffs::new(1.0, f32::NAN, 0.0, 1.0, 0.0, 0.0)),
        Err(GenomeError::RangeViolation(_))
    ));
    assert_eq!(pre.get(&g).unwrap(), AffineCoeffs::IDENTITY);
}

#[test]
fn handles_go_stale_after_row_removal() {
    let (mut g, t) = two_transforms();
    let c = t.color();
    let a = t.post_affine();
    assert!(t.is_valid(&g) && c.is_valid(&g) && a.is_valid(&g));

    assert!(g.remove_transform(1));
    assert!(!t.is_valid(&g));
    assert!(!c.is_valid(&g));
    assert!(!a.is_valid(&g));
    assert!(matches!(t.weight(&g), Err(GenomeError::InvalidIndex(_))));
    assert!(matches!(c.get(&g), Err(GenomeError::InvalidIndex(_))));
    assert!(matches!(
        a.set(&mut g, AffineCoeffs::IDENTITY),
        Err(GenomeError::InvalidIndex(_))
    ));
}

#[test]
fn usage_handle_reads_and_writes_its_cells() {
    let (mut g, t) = two_transforms();
    let curl = kind("curl");
    let u = t.attach(&mut g, &curl).unwrap();
    assert_eq!(u.transform(), t);
    assert_eq!(u.kind(), &curl);
    assert_eq!(u.coef(&g).unwrap(), 1.0);
    assert_eq!(u.params(&g).unwrap(), &[1.0, 0.0]);

    u.set_coef(&mut g, 0.25).unwrap();
    u.set_param(&mut g, "c2", 0.5).unwrap();
    assert_eq!(u.coef(&g).unwrap(), 0.25);
    assert_eq!(u.param(&g, "c2").unwrap(), 0.5);
    assert_eq!(u.params(&g).unwrap(), &[1.0, 0.5]);

    // the final transform's columns are untouched
    let offset = g.param_offset_of(&curl).unwrap();
    assert_eq!(&g.param_row(0).unwrap()[offset..offset + 2], &[1.0, 0.0]);
}

#[test]
fn unknown_parameter_is_a_schema_mismatch() {
    let (mut g, t) = two_transforms();
    let u = t.attach(&mut g, &kind("curl")).unwrap();
    assert!(matches!(
        u.param(&g, "c3"),
        Err(GenomeError::SchemaMismatch(_))
    ));
    assert!(matches!(
        u.set_param(&mut g, "c3", 1.0),
        Err(GenomeError::SchemaMismatch(_))
    ));
}

#[test]
fn set_params_requires_the_exact_key_set() {
    let (mut g, t) = two_transforms();
    let u = t.attach(&mut g, &kind("curl")).unwrap();

    let partial: BTreeMap<String, f32> = [("c1".to_string(), 2.0)].into_iter().collect();
    assert!(matches!(
        u.set_params(&mut g, &partial),
        Err(GenomeError::SchemaMismatch(_))
    ));

    let extra: BTreeMap<String, f32> = [("c1", 2.0), ("c2", 3.0), ("c3", 4.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert!(matches!(
        u.set_params(&mut g, &extra),
        Err(GenomeError::SchemaMismatch(_))
    ));

    let bad: BTreeMap<String, f32> = [("c1", 2.0), ("c2", f32::NAN)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    assert!(matches!(
        u.set_params(&mut g, &bad),
        Err(GenomeError::RangeViolation(_))
    ));
    assert_eq!(u.params(&g).unwrap(), &[1.0, 0.0]);

    let exact: BTreeMap<String, f32> = [("c2", 3.0), ("c1", 2.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    u.set_params(&mut g, &exact).unwrap();
    assert_eq!(u.params(&g).unwrap(), &[2.0, 3.0]);
}

#[test]
fn usage_handle_goes_stale_after_detach() {
    let (mut g, t) = two_transforms();
    let pdj = kind("pdj");
    let u = t.attach(&mut g, &pdj).unwrap();
    assert!(u.is_valid(&g));

    assert!(t.detach(&mut g, &pdj).unwrap());
    assert!(!u.is_valid(&g));
    assert!(g.active_variation("pdj").is_none());
    assert!(matches!(u.coef(&g), Err(GenomeError::InvalidIndex(_))));
    assert!(matches!(
        u.set_param(&mut g, "a", 0.0),
        Err(GenomeError::InvalidIndex(_))
    ));
}

#[test]
fn usage_handle_is_stale_when_only_its_row_dropped_the_kind() {
    let mut g = Genome::new();
    g.add_transform().unwrap();
    let t1 = g.add_transform().unwrap();
    let t2 = g.add_transform().unwrap();
    let pdj = kind("pdj");
    let u1 = t1.attach(&mut g, &pdj).unwrap();
    t2.attach(&mut g, &pdj).unwrap();

    t1.detach(&mut g, &pdj).unwrap();
    // column still active because t2 references it
    assert!(g.active_variation("pdj").is_some());
    assert!(!u1.is_valid(&g));
    assert!(matches!(u1.params(&g), Err(GenomeError::InvalidIndex(_))));
}

#[test]
fn usage_handles_survive_column_shifts() {
    let (mut g, t) = two_transforms();
    let pdj = kind("pdj");
    let u = t.attach(&mut g, &pdj).unwrap();
    u.set_param(&mut g, "d", 7.0).unwrap();

    // "curl" sorts before "pdj" and shifts its columns right
    t.attach(&mut g, &kind("curl")).unwrap();
    assert!(u.is_valid(&g));
    assert_eq!(u.param(&g, "d").unwrap(), 7.0);
    assert_eq!(u.params(&g).unwrap(), &[1.0, 1.0, 1.0, 7.0]);
}

#[test]
fn variation_lookup_and_listing() {
    let (mut g, t) = two_transforms();
    let pdj = kind("pdj");
    assert!(t.variation(&g, &pdj).is_none());
    t.attach(&mut g, &pdj).unwrap();
    assert!(t.variation(&g, &pdj).is_some());

    let names: Vec<String> = t
        .variations(&g)
        .unwrap()
        .iter()
        .map(|u| u.kind().name().to_string())
        .collect();
    assert_eq!(names, vec!["linear", "pdj"]);

    let final_names: Vec<String> = g
        .final_transform()
        .unwrap()
        .variations(&g)
        .unwrap()
        .iter()
        .map(|u| u.kind().name().to_string())
        .collect();
    assert_eq!(final_names, vec!["linear"]);
}
