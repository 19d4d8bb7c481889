#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn assert_all_pixels(frame: &image::RgbaImage, expected: image::Rgba<u8>) {
    for (x, y, pixel) in frame.enumerate_pixels() {
        assert_eq!(*pixel, expected, "pixel mismatch at ({}, {})", x, y);
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use crate::common::test_utils::{FrameCounter, TestRender};
    use holiday_ngin::{
        context::{Context, InitContext},
        flow::ImageTestResult,
    };

    golden_image_test!(|_: InitContext| async move {
        anyhow::Ok(TestRender {
            setup: Box::new(|ctx: &mut Context| ctx.clear_colour = wgpu::Color::BLACK),
            group: None,
            validate: Box::new(|_: &Context, state: &mut FrameCounter, frame: &image::RgbaImage| {
                if state.frame() > 0 {
                    assert_all_pixels(frame, image::Rgba([0, 0, 0, 255]));
                    Ok(ImageTestResult::Passed)
                } else {
                    Ok(ImageTestResult::Waiting)
                }
            }),
        })
    });
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_a_lit_ornament_in_the_centre() {
    use crate::common::test_utils::{FrameCounter, TestRender};
    use holiday_ngin::{
        context::{Context, InitContext},
        data_structures::{
            geometry::GeometryKind,
            group::InstanceGroup,
            instance::{Instance, Shading},
        },
        flow::ImageTestResult,
        resources::load_model,
    };

    golden_image_test!(|ctx: InitContext| async move {
        let model = load_model(&ctx.device, &ctx.queue, "ornament", GeometryKind::Sphere, None)?;
        let mut ornament = Instance::with_shading(Shading {
            color: [0.9, 0.1, 0.1],
            env_intensity: 0.0,
            ..Shading::default()
        });
        ornament.scale = [8.0; 3].into();
        let group = InstanceGroup::new(&ctx.device, 0, "ornament", model, vec![ornament], false);
        anyhow::Ok(TestRender {
            setup: Box::new(|ctx: &mut Context| ctx.clear_colour = wgpu::Color::BLACK),
            group: Some(group),
            validate: Box::new(|_: &Context, state: &mut FrameCounter, frame: &image::RgbaImage| {
                if state.frame() > 1 {
                    let (w, h) = frame.dimensions();
                    let centre = frame.get_pixel(w / 2, h / 2);
                    assert!(centre[0] > centre[1] && centre[0] > centre[2], "centre {:?}", centre);
                    assert_eq!(frame.get_pixel(0, 0), &image::Rgba([0, 0, 0, 255]));
                    Ok(ImageTestResult::Passed)
                } else {
                    Ok(ImageTestResult::Waiting)
                }
            }),
        })
    });
}
