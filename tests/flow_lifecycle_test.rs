#[cfg(feature = "integration-tests")]
use holiday_ngin::{
    context::Context,
    flow::{FlowConstructor, GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

#[cfg(feature = "integration-tests")]
#[derive(Default)]
struct Lifecycle {
    init_invocations: u32,
    update_invocations: u32,
    tick_invocations: u32,
}

#[cfg(feature = "integration-tests")]
struct Counting;

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<Lifecycle> for Counting {
    fn on_init(&mut self, ctx: &mut Context, state: &mut Lifecycle) -> Out {
        assert_eq!(state.init_invocations, 0);
        assert_eq!(state.update_invocations, 0);
        ctx.clear_colour = wgpu::Color::BLACK;
        state.init_invocations += 1;
        Out::Configure(Box::new(|ctx: &mut Context| ctx.tick_duration_millis = 1))
    }

    fn on_update(&mut self, ctx: &Context, state: &mut Lifecycle, _: instant::Duration) -> Out {
        assert_eq!(state.init_invocations, 1);
        assert_eq!(ctx.tick_duration_millis, 1, "configure output was not applied");
        state.update_invocations += 1;
        Out::Empty
    }

    fn on_tick(&mut self, _: &Context, state: &mut Lifecycle) -> Out {
        state.tick_invocations += 1;
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut Lifecycle, _: &holiday_ngin::WindowEvent) -> Out {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        state: &mut Lifecycle,
        _: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        if state.update_invocations > 5 && state.tick_invocations > 0 {
            Ok(ImageTestResult::Passed)
        } else {
            Ok(ImageTestResult::Waiting)
        }
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn hooks_run_in_order_and_configure_the_context() {
    let constructor: FlowConstructor<Lifecycle> = Box::new(|_| {
        Box::pin(async move {
            let flow: Box<dyn GraphicsFlow<Lifecycle>> = Box::new(Counting);
            anyhow::Ok(flow)
        })
    });
    holiday_ngin::flow::run(vec![constructor]).expect("Failed to run flow for integration test.");
}
