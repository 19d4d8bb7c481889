use cgmath::{InnerSpace, Quaternion, Rad, Vector3, vec3};
use holiday_ngin::{
    animation::{
        Arrangement, BlendState, GroupAnimator, InstanceLayout,
        blend::{Motion, SETTLE_THRESHOLD, pose},
        overlay::{BLOOM_THRESHOLD, float_bound, settle_scale, star_breath, star_pulse},
    },
    data_structures::instance::Instance,
};

fn layout() -> InstanceLayout {
    InstanceLayout {
        scattered: vec3(10.0, -3.0, 4.0),
        tree: vec3(1.0, 2.0, -1.0),
        rotation: vec3(0.3, 1.2, 2.0),
        scale: 0.4,
        phase: 0.7,
    }
}

#[test]
fn factor_moves_monotonically_toward_the_target() {
    let mut blend = BlendState::new(0.0);
    let mut previous = blend.factor;
    for _ in 0..300 {
        let next = blend.step(1.0, 1.0 / 60.0, 2.2);
        assert!(next >= previous && next <= 1.0);
        previous = next;
    }

    let mut previous = blend.factor;
    for _ in 0..300 {
        let next = blend.step(0.0, 1.0 / 60.0, 2.2);
        assert!(next <= previous && next >= 0.0);
        previous = next;
    }
}

#[test]
fn factor_converges_exponentially() {
    let speed = 2.0;
    let dt = 1.0 / 60.0;
    let mut blend = BlendState::new(0.0);
    let mut t = 0.0;
    for _ in 0..240 {
        blend.step(1.0, dt, speed);
        t += dt;
        let bound = (-speed * t).exp();
        assert!((1.0 - blend.factor) <= bound + 1e-5, "t {t}: {} > {bound}", 1.0 - blend.factor);
    }
    assert!(blend.factor > 0.99);
}

#[test]
fn huge_steps_never_overshoot() {
    let mut blend = BlendState::new(0.2);
    assert_eq!(blend.step(1.0, 5.0, 2.5), 1.0);
    assert_eq!(blend.step(0.0, 5.0, 2.5), 0.0);
}

#[test]
fn endpoints_match_the_precomputed_targets() {
    let l = layout();
    for t in [0.0, 1.3, 17.0, 250.0] {
        let scattered = pose(&l, 0.0, t, Motion::Tumble);
        assert!((scattered.position - l.scattered).magnitude() <= float_bound(0.0) + 1e-4);
        let tree = pose(&l, 1.0, t, Motion::Tumble);
        assert!((tree.position - l.tree).magnitude() <= float_bound(1.0) + 1e-4);
    }
    assert!(float_bound(1.0) < float_bound(0.0));
    assert!((settle_scale(1.0) - 0.08).abs() < 1e-6);
}

#[test]
fn rotation_snaps_once_settled() {
    let l = layout();
    let canonical = Quaternion::from(cgmath::Euler {
        x: Rad(l.rotation.x),
        y: Rad(l.rotation.y),
        z: Rad(l.rotation.z),
    });
    let settled_a = pose(&l, SETTLE_THRESHOLD + 0.01, 3.0, Motion::Tumble);
    let settled_b = pose(&l, 1.0, 9.0, Motion::Tumble);
    assert_eq!(settled_a.rotation, canonical);
    assert_eq!(settled_b.rotation, canonical);

    let tumbling_a = pose(&l, 0.0, 3.0, Motion::Tumble);
    let tumbling_b = pose(&l, 0.0, 4.0, Motion::Tumble);
    assert_ne!(tumbling_a.rotation, tumbling_b.rotation);
}

#[test]
fn scale_is_static_except_for_the_star() {
    let l = layout();
    assert_eq!(pose(&l, 0.0, 1.0, Motion::Tumble).scale, l.scale);
    assert_eq!(pose(&l, 0.6, 2.0, Motion::Tumble).scale, l.scale);

    let small = pose(&l, 0.0, 0.0, Motion::Star).scale;
    let large = pose(&l, 1.0, 0.0, Motion::Star).scale;
    assert!(small < large);
    let breathing = pose(&l, 1.0, 0.5, Motion::Star).scale;
    assert!((breathing - large * star_breath(0.5)).abs() < 1e-5);
}

#[test]
fn star_pulse_overshoots_the_bloom_threshold() {
    let mut t = 0.0;
    while t < 10.0 {
        let glow = star_pulse(t);
        assert!(glow.emissive_intensity > BLOOM_THRESHOLD);
        assert!((1.6 - 1e-4..=3.4 + 1e-4).contains(&glow.emissive_intensity));
        assert!((1.5 - 1e-4..=3.5 + 1e-4).contains(&glow.light_intensity));
        t += 0.01;
    }
}

#[test]
fn animator_writes_poses_into_instances() {
    let layouts = vec![layout(); 4];
    let mut animator = GroupAnimator::new(layouts.clone(), 2.0, Motion::Tumble, Arrangement::Scattered);
    let mut instances = vec![Instance::new(); 4];

    for _ in 0..600 {
        animator.update(Some(instances.as_mut_slice()), Arrangement::Tree, 5.0, 1.0 / 60.0);
    }
    assert!(animator.mean_factor() > 0.99);
    for instance in &instances {
        assert!((instance.position - layouts[0].tree).magnitude() <= float_bound(1.0) + 1e-3);
        assert_eq!(instance.scale, Vector3::new(0.4, 0.4, 0.4));
    }
}

#[test]
fn missing_render_target_is_a_no_op() {
    let mut animator = GroupAnimator::new(vec![layout(); 3], 2.0, Motion::Tumble, Arrangement::Scattered);
    animator.update(None, Arrangement::Tree, 1.0, 0.5);
    assert!(animator.blends().iter().all(|b| b.factor == 0.0));
    assert_eq!(animator.mean_factor(), 0.0);
}

#[test]
fn animator_starts_at_the_initial_arrangement() {
    let tree = GroupAnimator::new(vec![layout(); 2], 2.0, Motion::Billboard, Arrangement::Tree);
    assert!(tree.blends().iter().all(|b| b.factor == 1.0));
    assert!(tree.poses(0.0).all(|p| p.rotation == Quaternion::new(1.0, 0.0, 0.0, 0.0)));
    let empty = GroupAnimator::new(Vec::new(), 2.0, Motion::Tumble, Arrangement::Tree);
    assert!(empty.is_empty());
    assert_eq!(empty.mean_factor(), 0.0);
}
