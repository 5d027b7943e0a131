//! Chainable part operation wrapper.
//!
//! [`PartMut`] borrows one part of a controller together with the bound host,
//! so part operations read without threading the adapter through every call.
//!
//! # Example
//!
//! ```rust,ignore
//! if let Some(mut core) = anima.part_mut(core_key) {
//!     core.set_sequence(Some(seq))
//!         .set_speed(0.5)
//!         .play(Playback::Once, 0.0);
//! }
//! ```
#![allow(clippy::return_self_not_must_use)]
use std::ops::Deref;

use glam::{Affine3A, Vec4};

use crate::animation::part::{AnimaPart, PartCallback};
use crate::animation::playback::Playback;
use crate::animation::repository::SharedSequence;
use crate::host::{ColorHsv, HostAdapter};

/// Temporary mutable borrow of a part and its host.
pub struct PartMut<'a, H: HostAdapter + ?Sized> {
    part: &'a mut AnimaPart,
    host: &'a mut H,
}

impl<'a, H: HostAdapter + ?Sized> PartMut<'a, H> {
    #[inline]
    pub fn new(part: &'a mut AnimaPart, host: &'a mut H) -> Self {
        Self { part, host }
    }

    /// Gives back the raw part, e.g. to edit its transform fields directly.
    #[inline]
    pub fn part_mut(&mut self) -> &mut AnimaPart {
        &mut *self.part
    }

    // -- Configuration --

    pub fn set_sequence(&mut self, sequence: Option<SharedSequence>) -> &mut Self {
        self.part.set_sequence(sequence);
        self
    }

    pub fn set_speed(&mut self, speed: f32) -> &mut Self {
        self.part.set_speed(speed);
        self
    }

    pub fn set_smooth_animation(&mut self, smooth: bool) -> &mut Self {
        self.part.set_smooth_animation(smooth);
        self
    }

    pub fn set_custom_color(&mut self, custom: bool) -> &mut Self {
        self.part.set_custom_color(custom);
        self
    }

    pub fn on_transform(&mut self, callback: impl FnMut(&mut AnimaPart) + 'static) -> &mut Self {
        self.part.set_on_transform(Some(Box::new(callback) as PartCallback));
        self
    }

    pub fn on_complete(&mut self, callback: impl FnMut(&mut AnimaPart) + 'static) -> &mut Self {
        self.part.set_on_complete(Some(Box::new(callback) as PartCallback));
        self
    }

    // -- Playback --

    pub fn play(&mut self, mode: Playback, cursor: f32) -> &mut Self {
        self.part.play(&mut *self.host, mode, cursor);
        self
    }

    pub fn play_normalized(&mut self, mode: Playback, t: f32) -> &mut Self {
        self.part.play_normalized(&mut *self.host, mode, t);
        self
    }

    pub fn stop(&mut self) -> &mut Self {
        self.part.stop();
        self
    }

    pub fn pause(&mut self) -> &mut Self {
        self.part.pause();
        self
    }

    pub fn resume(&mut self) -> &mut Self {
        self.part.resume(&mut *self.host);
        self
    }

    pub fn update(&mut self, elapsed: f64) -> &mut Self {
        self.part.update(&mut *self.host, elapsed);
        self
    }

    // -- Commits --

    pub fn apply_transformations(&mut self, invoke_callback: bool) -> &mut Self {
        self.part.apply_transformations(&mut *self.host, invoke_callback);
        self
    }

    pub fn apply_local_matrix(&mut self, matrix: &Affine3A, invoke_callback: bool) -> &mut Self {
        self.part.apply_local_matrix(&mut *self.host, matrix, invoke_callback);
        self
    }

    // -- Appearance --

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.part.set_visible(&mut *self.host, visible);
        self
    }

    #[must_use]
    pub fn color_hsv(&self) -> ColorHsv {
        self.part.color_hsv(&*self.host)
    }

    pub fn set_color_hsv(&mut self, color: ColorHsv) -> &mut Self {
        self.part.set_color_hsv(&mut *self.host, color);
        self
    }

    pub fn set_emissive(&mut self, emissivity: f32, emissive: Vec4, display: Option<Vec4>) -> &mut Self {
        self.part.set_emissive(&mut *self.host, emissivity, emissive, display);
        self
    }
}

impl<H: HostAdapter + ?Sized> Deref for PartMut<'_, H> {
    type Target = AnimaPart;

    fn deref(&self) -> &Self::Target {
        &*self.part
    }
}
