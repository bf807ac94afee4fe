use flamegenome::{barnsley_fern, builtin, lerp, sierpinski_triangle};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut a = sierpinski_triangle()?;
    let b = barnsley_fern()?;

    // give the triangle a twist so the blend crosses schemas
    if let Some(swirl) = builtin("swirl") {
        let u = a.attach_variation(2, swirl)?;
        u.set_coef(&mut a, 0.25)?;
    }

    for i in 0..=4 {
        let mix = i as f32 / 4.0;
        let g = lerp(&a, &b, mix)?;
        let snap = g.export_snapshot(640, 480)?;
        let layout = snap.layout();
        println!(
            "mix {mix:.2}: {} transforms, {} variations, {} params, fingerprint {}",
            layout.transforms,
            layout.variations,
            layout.params,
            g.fingerprint()
        );
    }

    println!("{}", lerp(&a, &b, 0.5)?.to_json()?);
    Ok(())
}
