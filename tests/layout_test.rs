use cgmath::{InnerSpace, Vector2};
use holiday_ngin::animation::{
    ConeProfile, LayoutParams, LayoutSpec, Placement, generate_layout,
    layout::{sample_in_sphere, sample_on_cone},
};
use rand::{SeedableRng, rngs::StdRng};

fn spec(count: usize, surface_bias: f32, placement: Placement) -> LayoutSpec {
    LayoutSpec {
        count,
        scale_range: (0.2, 0.4),
        scale_multiplier: 1.5,
        surface_bias,
        placement,
    }
}

fn seeded(seed: u64) -> LayoutParams {
    LayoutParams {
        seed: Some(seed),
        ..LayoutParams::default()
    }
}

#[test]
fn scattered_points_stay_inside_the_sphere() {
    let params = seeded(7);
    let layouts = generate_layout(&spec(2000, 0.0, Placement::Cone), &params, &mut params.rng(0));
    let r = params.scatter_radius;
    let inside = layouts
        .iter()
        .filter(|l| l.scattered.magnitude() <= r)
        .count();
    assert!(inside as f32 >= 0.95 * layouts.len() as f32);
    assert!(layouts.iter().all(|l| l.scattered.magnitude() <= r * 1.0001));
}

#[test]
fn sphere_radii_follow_the_cube_root_law() {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 20_000;
    let radius = 10.0;
    let radii: Vec<f32> = (0..n)
        .map(|_| sample_in_sphere(&mut rng, radius).magnitude())
        .collect();

    // P(r < R/2) is 1/8 for a uniform volume and 1/2 for uniform radii
    let inner = radii.iter().filter(|r| **r < radius / 2.0).count() as f32 / n as f32;
    assert!((0.10..0.15).contains(&inner), "inner fraction {inner}");

    let outer_shell = radii.iter().filter(|r| **r > radius * 0.9).count() as f32 / n as f32;
    // 1 - 0.9^3
    assert!((0.24..0.30).contains(&outer_shell), "outer shell fraction {outer_shell}");
}

#[test]
fn sphere_directions_are_isotropic() {
    let mut rng = StdRng::seed_from_u64(3);
    let n = 20_000;
    let samples: Vec<_> = (0..n).map(|_| sample_in_sphere(&mut rng, 1.0)).collect();
    for axis in 0..3 {
        let mean = samples.iter().map(|p| p[axis]).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.03, "axis {axis} mean {mean}");
        let upper = samples.iter().filter(|p| p[axis] > 0.0).count() as f32 / n as f32;
        assert!((0.47..0.53).contains(&upper), "axis {axis} upper half {upper}");
    }
}

#[test]
fn cone_samples_respect_the_profile() {
    let cone = ConeProfile::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..5000 {
        let p = sample_on_cone(&mut rng, &cone, 0.0);
        assert!(p.y >= cone.base_y && p.y <= cone.base_y + cone.height, "y {}", p.y);
        let h = (p.y - cone.base_y) / cone.height;
        let r = Vector2::new(p.x, p.z).magnitude();
        assert!(r <= cone.radius_bound(h) + 1e-3, "r {r} above bound at h {h}");
    }
}

#[test]
fn surface_bias_pushes_samples_outward() {
    let cone = ConeProfile::default();
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..2000 {
        let p = sample_on_cone(&mut rng, &cone, 0.9);
        let h = (p.y - cone.base_y) / cone.height;
        let r = Vector2::new(p.x, p.z).magnitude();
        assert!(r >= 0.9 * cone.radius_bound(h) - 1e-3);
    }

    let filled: Vec<f32> = (0..4000)
        .map(|_| {
            let p = sample_on_cone(&mut rng, &cone, 0.0);
            let h = (p.y - cone.base_y) / cone.height;
            Vector2::new(p.x, p.z).magnitude() / cone.radius_bound(h)
        })
        .collect();
    let deep = filled.iter().filter(|f| **f < 0.5).count() as f32 / filled.len() as f32;
    assert!(deep > 0.4, "foliage should fill the volume, got {deep}");
}

#[test]
fn apex_and_logo_placements_are_fixed() {
    let params = seeded(1);
    let cone = params.cone;
    let star = generate_layout(&spec(3, 0.0, Placement::Apex { lift: 0.5 }), &params, &mut params.rng(1));
    for layout in &star {
        assert_eq!(layout.tree, cone.apex() + cgmath::vec3(0.0, 0.5, 0.0));
    }
    let logo = generate_layout(
        &spec(1, 0.0, Placement::Logo { lift: 2.0, forward: 3.0 }),
        &params,
        &mut params.rng(2),
    );
    assert_eq!(logo[0].tree, cone.apex() + cgmath::vec3(0.0, 2.0, 3.0));
}

#[test]
fn layout_has_count_instances_with_scaled_sizes() {
    let params = seeded(9);
    let layouts = generate_layout(&spec(500, 0.9, Placement::Cone), &params, &mut params.rng(3));
    assert_eq!(layouts.len(), 500);
    for l in &layouts {
        assert!(l.scale >= 0.2 * 1.5 && l.scale <= 0.4 * 1.5, "scale {}", l.scale);
        for angle in [l.rotation.x, l.rotation.y, l.rotation.z, l.phase] {
            assert!((0.0..std::f32::consts::TAU).contains(&angle));
        }
    }
}

#[test]
fn seeded_layouts_are_reproducible() {
    let params = seeded(1234);
    let s = spec(50, 0.5, Placement::Cone);
    let a = generate_layout(&s, &params, &mut params.rng(4));
    let b = generate_layout(&s, &params, &mut params.rng(4));
    assert_eq!(a, b);

    let other_group = generate_layout(&s, &params, &mut params.rng(5));
    assert_ne!(a, other_group);
}
