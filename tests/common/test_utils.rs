#[cfg(feature = "integration-tests")]
use holiday_ngin::{
    context::Context,
    data_structures::group::InstanceGroup,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

#[derive(Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validate =
    Box<dyn Fn(&Context, &mut FrameCounter, &image::RgbaImage) -> Result<ImageTestResult, anyhow::Error>>;

/// Draws an optional group on a fixed camera and hands every frame to `validate`.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender {
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) group: Option<InstanceGroup>,
    pub(crate) validate: Validate,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<FrameCounter> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out {
        (self.setup)(ctx);
        // a still camera keeps frames comparable
        ctx.camera.controller = holiday_ngin::camera::CameraController::new(0.0, 0.0);
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut FrameCounter, _: instant::Duration) -> Out {
        state.progress();
        if let Some(group) = self.group.as_mut() {
            group.write_to_buffer(&ctx.queue, &ctx.device);
        }
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, _: &mut FrameCounter) -> Out {
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut FrameCounter, _: &holiday_ngin::WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        match &self.group {
            Some(group) => Render::from(group),
            None => Render::None,
        }
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        frame: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, frame)
    }
}

/// Runs the flow built by the given async constructor until its validation passes.
#[macro_export]
macro_rules! golden_image_test {
    ($constructor:expr) => {{
        use holiday_ngin::flow::{FlowConstructor, GraphicsFlow};
        let model_constructor: FlowConstructor<FrameCounter> = Box::new(|ctx| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter>> = Box::new(($constructor)(ctx).await?);
                anyhow::Ok(g_flow)
            })
        });

        holiday_ngin::flow::run(vec![model_constructor])
            .expect("Failed to run flow for integration test.");
    }};
}
