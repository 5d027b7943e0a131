//! Gravity generator core: three parts driven by a small power state machine.
//!
//! Run with `RUST_LOG=debug cargo run --example gravity_core` to see every
//! call the controller makes into the host.

use std::cell::Cell;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::rc::Rc;
use std::sync::Arc;

use anima::{
    AnimaController, AnimaPart, ColorHsv, HostAdapter, PartOptions, Playback, Sequence, SequenceRepository,
    VisualHandle,
};
use glam::{Affine3A, Quat, Vec3, Vec4};

const STEP: f64 = 1.0 / 60.0;
const CULL_DISTANCE: f64 = 500.0;

/// Host that prints what a real engine would render.
#[derive(Default)]
struct ConsoleHost {
    next: u64,
    names: HashMap<VisualHandle, String>,
    colors: HashMap<VisualHandle, ColorHsv>,
    viewpoint: Vec3,
}

impl HostAdapter for ConsoleHost {
    fn create_child_visual(&mut self, parent: Option<VisualHandle>, model: &str) -> Option<VisualHandle> {
        self.next += 1;
        let visual = VisualHandle(self.next);
        log::info!("create {model} as {visual:?} under {parent:?}");
        self.names.insert(visual, model.to_string());
        Some(visual)
    }

    fn apply_local_transform(&mut self, visual: VisualHandle, matrix: &Affine3A) {
        let (_, rotation, translation) = matrix.to_scale_rotation_translation();
        let (axis, angle) = rotation.to_axis_angle();
        log::debug!(
            "{:>12}  pos {:>6.2?}  rot {:>6.1}deg about {:.1?}",
            self.names.get(&visual).map_or("?", String::as_str),
            translation.to_array(),
            angle.to_degrees(),
            axis.to_array()
        );
    }

    fn set_visible(&mut self, visual: VisualHandle, visible: bool) {
        log::info!("{visual:?} visible = {visible}");
    }

    fn entity_position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn viewpoint_position(&self) -> Vec3 {
        self.viewpoint
    }

    fn root_color(&self) -> ColorHsv {
        Vec3::new(0.55, 0.4, 0.6)
    }

    fn color(&self, visual: VisualHandle) -> ColorHsv {
        self.colors.get(&visual).copied().unwrap_or(Vec3::ZERO)
    }

    fn set_color(&mut self, visual: VisualHandle, color: ColorHsv) {
        self.colors.insert(visual, color);
    }

    fn set_emissive(&mut self, visual: VisualHandle, emissivity: f32, emissive: Vec4, _display: Vec4) {
        log::trace!("{visual:?} emissive {emissivity:.2} {:.2?}", emissive.to_array());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GravMode {
    PowerOn,
    PowerOff,
    Active,
    Inactive,
}

impl GravMode {
    fn next(last_working: bool, working: bool) -> Self {
        match (last_working, working) {
            (false, true) => Self::PowerOn,
            (true, false) => Self::PowerOff,
            (_, true) => Self::Active,
            (_, false) => Self::Inactive,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            Self::PowerOn => "powerOn",
            Self::PowerOff => "powerOff",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Registers every `Seq_<Part>_<mode>` the demo uses.
fn register_sequences(repository: &SequenceRepository) {
    for (part, lift) in [("Core", 0.0_f32), ("TopCap", 0.4), ("BottomCap", -0.4)] {
        repository.register(format!("Seq_{part}_powerOn"), move || {
            (0..=29)
                .fold(Sequence::builder(format!("Seq_{part}_powerOn")).frames(0, 29), |b, f| {
                    let t = f as f32 / 29.0;
                    b.loc_rot(Vec3::Y * lift * t, Quat::from_rotation_y(t * TAU * 0.25))
                })
                .build()
        });
        repository.register(format!("Seq_{part}_powerOff"), move || {
            (0..=29)
                .fold(Sequence::builder(format!("Seq_{part}_powerOff")).frames(0, 29), |b, f| {
                    let t = 1.0 - f as f32 / 29.0;
                    b.loc_rot(Vec3::Y * lift * t, Quat::from_rotation_y(t * TAU * 0.25))
                })
                .build()
        });
        repository.register(format!("Seq_{part}_active"), move || {
            (0..=59)
                .fold(Sequence::builder(format!("Seq_{part}_active")).frames(0, 59), |b, f| {
                    let spin = if part == "Core" { f as f32 / 60.0 * TAU } else { 0.0 };
                    b.loc_rot(Vec3::Y * lift, Quat::from_rotation_y(spin))
                })
                .build()
        });
        repository.register(format!("Seq_{part}_inactive"), move || {
            Sequence::builder(format!("Seq_{part}_inactive")).frames(0, 0).none().build()
        });
    }
}

fn assign(
    anima: &mut AnimaController<ConsoleHost>,
    parts: &[(&str, anima::PartKey)],
    mode: GravMode,
) -> anima::Result<()> {
    for &(name, key) in parts {
        let sequence = anima.acquire(&format!("Seq_{name}_{}", mode.suffix()))?;
        if let Some(mut part) = anima.part_mut(key) {
            part.set_sequence(Some(sequence)).play(Playback::Loop, 0.0);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let repository = Arc::new(SequenceRepository::new());
    register_sequences(&repository);

    let mut anima = AnimaController::new(Arc::clone(&repository));
    anima.bind(ConsoleHost {
        viewpoint: Vec3::new(0.0, 2.0, 12.0),
        ..Default::default()
    });

    let options = PartOptions {
        smooth: true,
        ..Default::default()
    };
    let core = anima
        .add_part(None, "AnimaExamples/ModelCore", options)
        .ok_or_else(|| anyhow::anyhow!("core model missing"))?;
    let top = anima
        .add_part(Some(core), "AnimaExamples/TopCap", options)
        .ok_or_else(|| anyhow::anyhow!("top cap model missing"))?;
    let bottom = anima
        .add_part(Some(core), "AnimaExamples/BottomCap", options)
        .ok_or_else(|| anyhow::anyhow!("bottom cap model missing"))?;
    let parts = [("Core", core), ("TopCap", top), ("BottomCap", bottom)];

    // The core's sequence ending is the cue to re-evaluate the power state
    let cycle_done = Rc::new(Cell::new(false));
    if let Some(mut part) = anima.part_mut(core) {
        let flag = Rc::clone(&cycle_done);
        part.on_complete(move |_: &mut AnimaPart| flag.set(true));
    }

    let mut last_working = false;
    let mut mode = GravMode::next(last_working, true);
    assign(&mut anima, &parts, mode)?;
    last_working = true;

    for step in 0..600 {
        let working = !(240..420).contains(&step);

        anima.set_enabled(anima.test_distance(CULL_DISTANCE));
        if !anima.is_enabled() {
            continue;
        }
        anima.update(STEP);

        if cycle_done.replace(false) {
            let next = GravMode::next(last_working, working);
            if next != mode {
                log::info!("step {step}: {mode:?} -> {next:?}");
            }
            mode = next;
            last_working = working;
            assign(&mut anima, &parts, mode)?;
        }

        if let Some(mut part) = anima.part_mut(core) {
            let power = match mode {
                GravMode::PowerOn => part.cursor_normalized(),
                GravMode::PowerOff => 1.0 - part.cursor_normalized(),
                GravMode::Active => 1.0,
                GravMode::Inactive => 0.0,
            };
            let dark_cyan = Vec4::new(0.0, 0.55, 0.55, 1.0);
            let cyan = Vec4::new(0.0, 1.0, 1.0, 1.0);
            part.set_emissive(power, dark_cyan.lerp(cyan, power), None);
        }
    }

    log::info!(
        "done: {} live sequences, final mode {mode:?}",
        repository.live_count()
    );
    drop(anima);
    log::info!("after teardown: {} live sequences", repository.live_count());
    Ok(())
}
