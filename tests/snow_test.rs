use holiday_ngin::animation::{SnowField, SnowParams};
use rand::{SeedableRng, rngs::StdRng};

fn field(count: usize, seed: u64) -> SnowField {
    SnowField::new(count, SnowParams::default(), &mut StdRng::seed_from_u64(seed))
}

#[test]
fn flakes_stay_inside_the_band_forever() {
    let snow = field(300, 1);
    let params = *snow.params();
    for t in [-1.0e5, -37.5, -1e-7, 0.0, 1e-7, 0.016, 3.3, 59.9, 3600.0, 1.0e5] {
        for (position, _) in snow.positions(t) {
            assert!(
                position.y >= params.band_min && position.y < params.band_max(),
                "y {} left the band at t {t}",
                position.y
            );
        }
    }
}

#[test]
fn flakes_fall_and_wrap_to_the_top() {
    let snow = field(1, 2);
    let flake = snow.flakes()[0];
    let params = snow.params();
    let a = snow.position(&flake, 0.0).y;
    let b = snow.position(&flake, 0.1).y;
    assert!(b < a || a - params.band_min < 0.2, "flake rose from {a} to {b}");

    // one full band later the flake is back where it started
    let period = params.band_height / flake.speed;
    let wrapped = snow.position(&flake, period).y;
    assert!((wrapped - a).abs() < 1e-2 || (wrapped - a).abs() > params.band_height - 1e-2);
}

#[test]
fn flake_parameters_are_drawn_from_their_ranges() {
    let snow = field(500, 3);
    let params = snow.params();
    assert_eq!(snow.len(), 500);
    for flake in snow.flakes() {
        assert!((params.speed.0..=params.speed.1).contains(&flake.speed));
        assert!((params.wobble.0..=params.wobble.1).contains(&flake.wobble));
        assert!((params.scale.0..=params.scale.1).contains(&flake.scale));
        assert!((0.0..std::f32::consts::TAU).contains(&flake.phase));
    }
    assert!(snow.positions(0.0).all(|(_, scale)| scale >= params.scale.0));
}

#[test]
fn sway_stays_close_to_the_origin() {
    let snow = field(100, 4);
    for flake in snow.flakes() {
        for t in [0.0, 1.0, 10.0, 100.0] {
            let p = snow.position(flake, t);
            let limit = flake.wobble * 1.5 + 1e-4;
            assert!((p.x - flake.origin.x).abs() <= limit);
            assert!((p.z - flake.origin.z).abs() <= limit);
        }
    }
}

#[test]
fn empty_field_yields_nothing() {
    let snow = field(0, 5);
    assert!(snow.is_empty());
    assert_eq!(snow.positions(1.0).count(), 0);
}

#[test]
fn degenerate_parameters_do_not_panic() {
    let column = SnowParams {
        half_extent: 0.0,
        ..SnowParams::default()
    };
    let snow = SnowField::new(4, column, &mut StdRng::seed_from_u64(1));
    assert_eq!(snow.len(), 4);
    for flake in snow.flakes() {
        assert_eq!((flake.origin.x, flake.origin.z), (0.0, 0.0));
    }

    for band_height in [0.0, -3.0] {
        let flat = SnowParams {
            band_height,
            ..SnowParams::default()
        };
        let snow = SnowField::new(8, flat, &mut StdRng::seed_from_u64(2));
        for t in [0.0, 1.5, 1.0e4] {
            for (position, _) in snow.positions(t) {
                assert!(position.x.is_finite() && position.z.is_finite());
                assert_eq!(position.y, flat.band_min);
            }
        }
    }
}
