use super::*;

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn affine_coeffs_identity_roundtrips_through_kurbo() {
    assert_eq!(AffineCoeffs::IDENTITY.to_affine(), Affine::IDENTITY);
    assert_eq!(
        AffineCoeffs::from_affine(Affine::IDENTITY),
        AffineCoeffs::IDENTITY
    );

    let t = AffineCoeffs::new(0.5, 0.0, 0.0, 0.5, 0.25, -1.0);
    assert!(close(t.apply(Point::new(1.0, 1.0)), Point::new(0.75, -0.5)));
}

#[test]
fn affine_coeffs_reject_non_finite() {
    let bad = AffineCoeffs::new(1.0, 0.0, f32::NAN, 1.0, 0.0, 0.0);
    assert!(matches!(
        bad.validate(),
        Err(GenomeError::RangeViolation(_))
    ));
    assert!(AffineCoeffs::IDENTITY.validate().is_ok());
}

#[test]
fn default_view_maps_origin_to_image_center() {
    let v = ViewParams::default();
    let a = v.to_affine(200, 100);
    assert!(close(a * Point::ORIGIN, Point::new(100.0, 50.0)));
    // unit x lands half the shorter side to the right
    assert!(close(a * Point::new(1.0, 0.0), Point::new(150.0, 50.0)));
}

#[test]
fn view_translation_moves_camera_center() {
    let v = ViewParams {
        translate_x: 2.0,
        translate_y: -1.0,
        ..ViewParams::default()
    };
    let a = v.to_affine(64, 64);
    assert!(close(a * Point::new(2.0, -1.0), Point::new(32.0, 32.0)));
}

#[test]
fn view_rotation_quarter_turn() {
    let v = ViewParams {
        rotation_deg: 90.0,
        ..ViewParams::default()
    };
    let a = v.to_affine(100, 100);
    assert!(close(a * Point::new(1.0, 0.0), Point::new(50.0, 100.0)));
}

#[test]
fn view_normalized_wraps_rotation() {
    let v = ViewParams {
        rotation_deg: -90.0,
        ..ViewParams::default()
    }
    .normalized();
    assert_eq!(v.rotation_deg, 270.0);
    assert!(v.validate().is_ok());

    let v = ViewParams {
        rotation_deg: 720.0,
        ..ViewParams::default()
    }
    .normalized();
    assert_eq!(v.rotation_deg, 0.0);
}

#[test]
fn view_validate_rejects_negative_scale() {
    let v = ViewParams {
        scale: -1.0,
        ..ViewParams::default()
    };
    assert!(matches!(v.validate(), Err(GenomeError::RangeViolation(_))));
}

#[test]
fn coloration_and_background_domains() {
    assert!(Coloration::default().validate().is_ok());
    assert!(Background::default().validate().is_ok());

    let c = Coloration {
        brightness: 0.0,
        ..Coloration::default()
    };
    assert!(c.validate().is_err());

    let c = Coloration {
        vibrancy: 1.5,
        ..Coloration::default()
    };
    assert!(c.validate().is_err());

    let b = Background {
        r: -0.1,
        ..Background::default()
    };
    assert!(b.validate().is_err());
}

#[test]
fn rgb_validate_rejects_out_of_unit() {
    assert!(Rgb::white().validate().is_ok());
    assert!(Rgb::new(0.0, 1.1, 0.0).validate().is_err());
    assert!(Rgb::new(f32::INFINITY, 0.0, 0.0).validate().is_err());
}
