//! The holiday scene flow.
//!
//! Builds one [`InstanceGroup`] per decoration group plus the snow, drives
//! the arrangement machine from the engine tick and from user input, and
//! blends every instance toward the current arrangement each frame.

use cgmath::{Quaternion, Rotation3, Vector3};
use instant::Duration;
use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    animation::{
        ArrangementMachine, GroupAnimator, SnowField, SnowParams, blend::Motion, generate_layout,
        overlay::star_pulse,
    },
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{group::InstanceGroup, instance::Instance},
    flow::{FlowConstructor, GraphicsFlow, Out},
    render::Render,
    resources::{load_model, pattern::PatternCache},
    scene::groups::{GroupConfig, decoration_groups, snow_group},
};

/// Salt of the snow rng stream, apart from the per-group salts.
const SNOW_SALT: u64 = 0x5_0057;

/// Animation of one decoration group, parallel to its [`InstanceGroup`].
struct Decoration {
    animator: GroupAnimator,
    /// Width over height of the sprite texture, `1.0` for meshes.
    aspect: f32,
}

pub struct HolidayFlow {
    machine: ArrangementMachine,
    config: SceneConfig,
    decorations: Vec<Decoration>,
    /// Decoration groups first, the snow group last.
    groups: Vec<InstanceGroup>,
    snow: SnowField,
    star: Option<usize>,
}

/// Constructor to hand to [`crate::flow::run`].
pub fn holiday_flow(config: SceneConfig) -> FlowConstructor<()> {
    Box::new(move |ctx: InitContext| {
        Box::pin(async move {
            let flow = HolidayFlow::new(&ctx, config).await?;
            anyhow::Ok(Box::new(flow) as Box<dyn GraphicsFlow<()>>)
        })
    })
}

async fn build_group(
    ctx: &InitContext,
    patterns: &mut PatternCache,
    id: u32,
    group: &GroupConfig,
    instances: Vec<Instance>,
) -> anyhow::Result<(InstanceGroup, f32)> {
    let pattern = group.pattern.as_ref().map(|key| patterns.get(key));
    let aspect = pattern
        .as_deref()
        .filter(|image| image.height() > 0)
        .map_or(1.0, |image| image.width() as f32 / image.height() as f32);
    let model = load_model(&ctx.device, &ctx.queue, group.name, group.kind, pattern.as_deref())?;
    let instance_group = InstanceGroup::new(&ctx.device, id, group.name, model, instances, group.transparent);
    Ok((instance_group, aspect))
}

impl HolidayFlow {
    pub async fn new(ctx: &InitContext, config: SceneConfig) -> anyhow::Result<Self> {
        let mut patterns = PatternCache::new();
        let mut decorations = Vec::new();
        let mut groups = Vec::new();
        let mut star = None;

        for (index, group) in decoration_groups().iter().enumerate() {
            let mut rng = config.layout.rng(index as u64);
            let layouts = generate_layout(&group.layout_spec(), &config.layout, &mut rng);
            let animator = GroupAnimator::new(layouts, group.speed, group.motion, config.start);
            let instances = vec![Instance::with_shading(group.shading()); animator.len()];
            let (instance_group, aspect) =
                build_group(ctx, &mut patterns, index as u32, group, instances).await?;
            if group.motion == Motion::Star {
                star = Some(index);
            }
            log::info!("{}: {} instances", group.name, animator.len());
            decorations.push(Decoration { animator, aspect });
            groups.push(instance_group);
        }

        let snow_config = snow_group(config.snow_count);
        let snow = SnowField::new(
            config.snow_count,
            SnowParams::default(),
            &mut config.layout.rng(SNOW_SALT),
        );
        let instances = vec![Instance::with_shading(snow_config.shading()); snow.len()];
        let (snow_group, _) =
            build_group(ctx, &mut patterns, groups.len() as u32, &snow_config, instances).await?;
        groups.push(snow_group);
        log::debug!("generated {} distinct patterns", patterns.len());

        let mut flow = Self {
            machine: ArrangementMachine::new(0.0, config.start, config.timings),
            config,
            decorations,
            groups,
            snow,
            star,
        };
        // first frame already shows the start arrangement
        flow.animate(0.0, 0.0, Quaternion::from_angle_y(cgmath::Rad(0.0)));
        Ok(flow)
    }

    fn animate(&mut self, t: f32, dt: f32, facing: Quaternion<f32>) {
        let arrangement = self.machine.current();
        for (index, decoration) in self.decorations.iter_mut().enumerate() {
            let target = self.groups.get_mut(index).map(|g| g.instances.as_mut_slice());
            decoration.animator.update(target, arrangement, t, dt);
        }

        for (decoration, group) in self.decorations.iter().zip(self.groups.iter_mut()) {
            if decoration.animator.motion() == Motion::Billboard {
                group.instances.iter_mut().for_each(|instance| {
                    instance.rotation = facing;
                    instance.scale.x *= decoration.aspect;
                });
            }
        }

        if let Some(snow_group) = self.groups.last_mut() {
            snow_group
                .instances
                .iter_mut()
                .zip(self.snow.positions(t))
                .for_each(|(instance, (position, scale))| {
                    instance.position = position;
                    instance.rotation = facing;
                    instance.scale = Vector3::new(scale, scale, scale);
                });
        }
    }

    /// Pulses the star and returns where its light sits.
    fn pulse_star(&mut self, t: f32) -> Option<([f32; 3], f32)> {
        let glow = star_pulse(t);
        let star = self.groups.get_mut(self.star?)?;
        let instance = star.instances.first_mut()?;
        instance.shading.emissive = glow.emissive_intensity;
        Some((instance.position.into(), glow.light_intensity))
    }

    fn toggle(&mut self, now: f32) {
        let arrangement = self.machine.on_user_action(now);
        log::info!("switched to {arrangement:?}");
    }
}

impl GraphicsFlow<()> for HolidayFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out {
        self.machine = ArrangementMachine::new(ctx.elapsed(), self.config.start, self.config.timings);
        ctx.recorder = crate::record::Recorder::new(self.config.record);
        log::info!(
            "holiday scene ready: {} groups, starting {:?}",
            self.groups.len(),
            self.config.start
        );
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), dt: Duration) -> Out {
        let t = ctx.elapsed();
        let facing = Quaternion::from_angle_y(ctx.camera.camera.yaw);
        self.animate(t, dt.as_secs_f32(), facing);
        let light = self.pulse_star(t);

        for group in self.groups.iter_mut() {
            group.write_to_buffer(&ctx.queue, &ctx.device);
        }

        match light {
            Some((position, intensity)) => Out::Configure(Box::new(move |ctx: &mut Context| {
                ctx.light.set_intensity(intensity);
                ctx.light.set_position(position);
            })),
            None => Out::Empty,
        }
    }

    fn on_tick(&mut self, ctx: &Context, _: &mut ()) -> Out {
        if let Some(arrangement) = self.machine.tick(ctx.elapsed()) {
            log::info!("auto-play switched to {arrangement:?}");
        }
        Out::Empty
    }

    fn on_window_events(&mut self, ctx: &Context, _: &mut (), event: &WindowEvent) -> Out {
        match event {
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.toggle(ctx.elapsed());
                Out::Empty
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Space => {
                    self.toggle(ctx.elapsed());
                    Out::Empty
                }
                KeyCode::KeyR => Out::Configure(Box::new(|ctx: &mut Context| ctx.start_recording())),
                _ => Out::Empty,
            },
            _ => Out::Empty,
        }
    }

    fn on_render(&self) -> Render<'_> {
        Render::from(self.groups.as_slice())
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut (),
        _: &image::RgbaImage,
    ) -> Result<crate::flow::ImageTestResult, anyhow::Error> {
        Ok(crate::flow::ImageTestResult::Waiting)
    }
}
