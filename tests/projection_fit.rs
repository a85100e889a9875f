use ambient_dice::integrate::Integrator;
use ambient_dice::projection::{project, Projector};
use ambient_dice::sampling::plane_to_sphere;
use ambient_dice::{CoefficientSet, EnvironmentMap, BASIS_COUNT};
use glam::{Vec2, Vec3};

fn known_weights() -> CoefficientSet {
    CoefficientSet::new(std::array::from_fn(|i| {
        let t = i as f32;
        Vec3::new(0.2 + 0.1 * t, 1.5 - 0.1 * t, if i % 2 == 0 { 0.3 } else { 0.9 })
    }))
}

fn sphere_grid() -> Vec<Vec3> {
    let mut dirs = Vec::new();
    for j in 0..=16 {
        for i in 0..32 {
            dirs.push(plane_to_sphere(Vec2::new(i as f32 / 32.0, j as f32 / 16.0)));
        }
    }
    dirs
}

fn rough_signal(w: Vec3) -> Vec3 {
    Vec3::new((3.0 * w.z).exp(), 1.0 + w.x * w.x * w.x, (8.0 * w.y).sin().abs())
}

#[test]
fn recovers_weights_of_a_lobe_combination() {
    let weights = known_weights();
    let fit = project(65_536, &weights).expect("fit");
    for i in 0..BASIS_COUNT {
        let error = (fit.coefficients.get(i) - weights.get(i)).abs().max_element();
        assert!(error < 1e-2, "lobe {i}: expected {:?}, got {:?}", weights.get(i), fit.coefficients.get(i));
    }
    assert!(fit.report.condition < 100.0);
}

#[test]
fn constant_signal_reconstructs_constant() {
    let k = Vec3::new(0.3, 0.6, 1.2);
    let signal = move |_: Vec3| k;
    let fit = project(16_384, &signal).expect("fit");
    for dir in sphere_grid() {
        let value = fit.coefficients.evaluate(dir);
        let relative = ((value - k) / k).abs().max_element();
        assert!(relative < 0.02, "direction {dir:?}: {value:?} vs {k:?}");
    }
}

#[test]
fn identical_inputs_give_bit_identical_fits() {
    let map = EnvironmentMap::neutral_gradient(128, 64).expect("map");
    let first = project(4096, &map).expect("first fit");
    let second = project(4096, &map).expect("second fit");
    for (a, b) in first.coefficients.iter().zip(second.coefficients.iter()) {
        assert_eq!(a.to_array().map(f32::to_bits), b.to_array().map(f32::to_bits));
    }
}

#[test]
fn parallel_assembly_matches_serial_exactly() {
    let integrator = Integrator::new(4096).expect("integrator");
    let serial = Projector::new(integrator).with_parallel(false).project(&rough_signal).expect("serial");
    let parallel = Projector::new(integrator).with_parallel(true).project(&rough_signal).expect("parallel");
    assert_eq!(serial, parallel);
}

#[test]
fn more_samples_shrink_spread_across_scrambles() {
    let spread = |samples: u32| {
        let fits: Vec<CoefficientSet> = (1..=4u64)
            .map(|seed| {
                let integrator = Integrator::new(samples).expect("integrator").with_seed(Some(seed));
                let projector = Projector::new(integrator).with_max_condition(1.0e6);
                projector.project(&rough_signal).expect("fit").coefficients
            })
            .collect();
        let mut widest = 0.0f32;
        for i in 0..BASIS_COUNT {
            let lo = fits.iter().map(|f| f.get(i)).fold(Vec3::splat(f32::MAX), Vec3::min);
            let hi = fits.iter().map(|f| f.get(i)).fold(Vec3::splat(f32::MIN), Vec3::max);
            widest = widest.max((hi - lo).max_element());
        }
        widest
    };
    let coarse = spread(256);
    let fine = spread(16_384);
    assert!(coarse > 0.0, "different scrambles should disagree at low sample counts");
    assert!(fine < 0.5 * coarse, "spread did not shrink: {coarse} -> {fine}");
}

#[test]
fn fits_an_equirect_image_of_known_lobes() {
    let weights = known_weights();
    let map = EnvironmentMap::from_fn(512, 256, |dir| weights.evaluate(dir)).expect("map");
    let fit = project(16_384, &map).expect("fit");
    for i in 0..BASIS_COUNT {
        let error = (fit.coefficients.get(i) - weights.get(i)).abs().max_element();
        assert!(error < 5e-2, "lobe {i}: {error}");
    }
}
