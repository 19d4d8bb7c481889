use holiday_ngin::{config::SceneConfig, flow, scene::holiday_flow};

fn main() -> anyhow::Result<()> {
    flow::init_logger();
    flow::run::<()>(vec![holiday_flow(SceneConfig::from_env())])
}
