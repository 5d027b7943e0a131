//! Shared test host.
#![allow(dead_code)]

use std::collections::HashMap;

use anima::{ColorHsv, HostAdapter, Keyframe, Sequence, VisualHandle};
use glam::{Affine3A, Quat, Vec3, Vec4};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

/// Host adapter that records every call for later inspection.
#[derive(Debug, Default)]
pub struct RecordingHost {
    next_visual: u64,
    pub created: Vec<(Option<VisualHandle>, String)>,
    pub removed: Vec<VisualHandle>,
    pub transforms: HashMap<VisualHandle, Affine3A>,
    pub transform_commits: usize,
    pub visibility: HashMap<VisualHandle, bool>,
    pub colors: HashMap<VisualHandle, ColorHsv>,
    pub emissive: HashMap<VisualHandle, (f32, Vec4, Vec4)>,
    pub subparts: HashMap<String, VisualHandle>,
    pub missing_models: Vec<String>,
    pub root_color: ColorHsv,
    pub entity_position: Vec3,
    pub viewpoint_position: Vec3,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pre-existing sub-object of the root entity.
    pub fn with_subpart(mut self, name: &str) -> Self {
        self.next_visual += 1;
        self.subparts.insert(name.to_string(), VisualHandle(1000 + self.next_visual));
        self
    }

    pub fn translation(&self, visual: VisualHandle) -> Option<Vec3> {
        self.transforms.get(&visual).map(|m| Vec3::from(m.translation))
    }

    pub fn visible(&self, visual: VisualHandle) -> bool {
        self.visibility.get(&visual).copied().unwrap_or(true)
    }
}

impl HostAdapter for RecordingHost {
    fn create_child_visual(&mut self, parent: Option<VisualHandle>, model: &str) -> Option<VisualHandle> {
        if self.missing_models.iter().any(|m| m == model) {
            return None;
        }
        self.next_visual += 1;
        self.created.push((parent, model.to_string()));
        Some(VisualHandle(self.next_visual))
    }

    fn subpart_visual(&self, name: &str) -> Option<VisualHandle> {
        self.subparts.get(name).copied()
    }

    fn remove_visual(&mut self, visual: VisualHandle) {
        self.removed.push(visual);
    }

    fn apply_local_transform(&mut self, visual: VisualHandle, matrix: &Affine3A) {
        self.transform_commits += 1;
        self.transforms.insert(visual, *matrix);
    }

    fn set_visible(&mut self, visual: VisualHandle, visible: bool) {
        self.visibility.insert(visual, visible);
    }

    fn entity_position(&self) -> Vec3 {
        self.entity_position
    }

    fn viewpoint_position(&self) -> Vec3 {
        self.viewpoint_position
    }

    fn root_color(&self) -> ColorHsv {
        self.root_color
    }

    fn color(&self, visual: VisualHandle) -> ColorHsv {
        self.colors.get(&visual).copied().unwrap_or(Vec3::ZERO)
    }

    fn set_color(&mut self, visual: VisualHandle, color: ColorHsv) {
        self.colors.insert(visual, color);
    }

    fn set_emissive(&mut self, visual: VisualHandle, emissivity: f32, emissive: Vec4, display: Vec4) {
        self.emissive.insert(visual, (emissivity, emissive, display));
    }
}

/// Distinct keyframe for `frame`: x position equals the frame number.
pub fn marker(frame: i32) -> Keyframe {
    Keyframe::new(
        Vec3::new(frame as f32, 0.0, 0.0),
        Quat::from_rotation_y(frame as f32 * 0.1),
        Vec3::ONE,
    )
}

/// Sequence over `start..=end` whose keyframes are `marker(frame)`.
pub fn ramp(name: &str, start: i32, end: i32, rate: f32) -> Sequence {
    (start..=end)
        .fold(Sequence::builder(name).frames(start, end).rate(rate), |b, f| {
            b.keyframe(marker(f))
        })
        .build()
        .expect("valid ramp")
}
