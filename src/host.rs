//! Host engine boundary.
//!
//! The runtime never touches the host scene graph directly. Everything it
//! needs from the embedding game goes through [`HostAdapter`]: creating the
//! visual object of a part, pushing local transforms and visibility, reading
//! the root entity's color and position, and the viewpoint used for distance
//! culling.

use glam::{Affine3A, Vec3, Vec4};

/// Opaque identifier of a host visual object. The value is chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

impl VisualHandle {
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Hue/saturation/value triple as the host stores it.
pub type ColorHsv = Vec3;

/// Services the embedding application provides to a bound controller.
///
/// The bound adapter *is* the controller's host entity: `None` parents and
/// [`root_color`](Self::root_color) refer to it.
pub trait HostAdapter {
    /// Creates a visual for `model` under `parent`, or under the root entity
    /// when `parent` is `None`. Returns `None` if either cannot be resolved.
    fn create_child_visual(&mut self, parent: Option<VisualHandle>, model: &str) -> Option<VisualHandle>;

    /// Looks up a named sub-object the root entity already owns.
    fn subpart_visual(&self, _name: &str) -> Option<VisualHandle> {
        None
    }

    /// Destroys a visual created through [`create_child_visual`](Self::create_child_visual).
    fn remove_visual(&mut self, _visual: VisualHandle) {}

    /// Replaces the local matrix of `visual`.
    fn apply_local_transform(&mut self, visual: VisualHandle, matrix: &Affine3A);

    fn set_visible(&mut self, visual: VisualHandle, visible: bool);

    /// World position of the root entity.
    fn entity_position(&self) -> Vec3;

    /// World position of the active camera.
    fn viewpoint_position(&self) -> Vec3;

    /// Color mask of the root entity.
    fn root_color(&self) -> ColorHsv;

    fn color(&self, visual: VisualHandle) -> ColorHsv;

    fn set_color(&mut self, visual: VisualHandle, color: ColorHsv);

    /// Drives the "Emissive" and "Display" materials of `visual`.
    fn set_emissive(&mut self, _visual: VisualHandle, _emissivity: f32, _emissive: Vec4, _display: Vec4) {}
}
