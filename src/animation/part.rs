use glam::{Affine3A, Quat, Vec3, Vec4};

use crate::animation::keyframe::Keyframe;
use crate::animation::playback::Playback;
use crate::animation::repository::SharedSequence;
use crate::animation::PartKey;
use crate::host::{ColorHsv, HostAdapter, VisualHandle};

/// Hook invoked with the part that triggered it.
pub type PartCallback = Box<dyn FnMut(&mut AnimaPart)>;

/// One animated node of a controller's hierarchy.
///
/// A part owns its own cursor, mode and speed; siblings never read each
/// other's state. Operations that touch the host visual take the adapter as
/// an argument; [`PartMut`](crate::animation::PartMut) binds the two together.
pub struct AnimaPart {
    visual: VisualHandle,
    parent: Option<PartKey>,
    smooth: bool,
    enabled: bool,
    visible: bool,
    custom_color: bool,

    sequence: Option<SharedSequence>,
    playback: Playback,
    saved_playback: Playback,
    cursor: f32,
    speed: f32,
    last_frame: i32,

    /// Local position committed on the next transform.
    pub position: Vec3,
    /// Local rotation committed on the next transform.
    pub rotation: Quat,
    /// Local scale committed on the next transform.
    pub scale: Vec3,

    on_transform: Option<PartCallback>,
    on_complete: Option<PartCallback>,
}

impl AnimaPart {
    #[must_use]
    pub fn new(visual: VisualHandle, parent: Option<PartKey>) -> Self {
        Self {
            visual,
            parent,
            smooth: false,
            enabled: true,
            visible: true,
            custom_color: false,
            sequence: None,
            playback: Playback::Halt,
            saved_playback: Playback::Halt,
            cursor: 0.0,
            speed: 1.0,
            last_frame: 0,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            on_transform: None,
            on_complete: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn visual(&self) -> VisualHandle {
        self.visual
    }

    /// Parent part, `None` when attached to the root entity or a subpart.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<PartKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn smooth_animation(&self) -> bool {
        self.smooth
    }

    pub fn set_smooth_animation(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    /// While inactive, updates and transform commits are skipped.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled
    }

    /// Observable visibility: the visible flag gated by the enable flag.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible && self.enabled
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&SharedSequence> {
        self.sequence.as_ref()
    }

    /// Assigns the sequence used by the next `play`. The cursor is kept.
    pub fn set_sequence(&mut self, sequence: Option<SharedSequence>) {
        self.sequence = sequence;
    }

    #[inline]
    #[must_use]
    pub fn playback(&self) -> Playback {
        self.playback
    }

    /// Cursor position in frames.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Cursor mapped onto `[0, 1]` across the frame window.
    #[must_use]
    pub fn cursor_normalized(&self) -> f32 {
        let Some(sequence) = self.sequence.as_deref() else {
            return 0.0;
        };
        let start = sequence.frame_start() as f32;
        if self.cursor <= start {
            return 0.0;
        }
        if self.cursor >= sequence.frame_end() as f32 {
            return 1.0;
        }
        (self.cursor - start) / sequence.frame_period() as f32
    }

    /// Signed speed multiplier, 0.5 = half speed.
    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Whether the part keeps its own color instead of following the root entity.
    #[inline]
    #[must_use]
    pub fn custom_color(&self) -> bool {
        self.custom_color
    }

    pub fn set_custom_color(&mut self, custom: bool) {
        self.custom_color = custom;
    }

    /// Called right before a transform is committed to the host.
    pub fn set_on_transform(&mut self, callback: Option<PartCallback>) {
        self.on_transform = callback;
    }

    /// Called whenever the playing cursor crosses the frame window border.
    pub fn set_on_complete(&mut self, callback: Option<PartCallback>) {
        self.on_complete = callback;
    }

    /// Current local matrix, `T * R * S`.
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        Keyframe::new(self.position, self.rotation, self.scale).to_affine()
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Starts playback at `cursor` (in frames, clamped to the frame window)
    /// and commits the keyframe under it right away.
    pub fn play<H: HostAdapter + ?Sized>(&mut self, host: &mut H, mode: Playback, cursor: f32) {
        let Some(sequence) = self.sequence.as_deref() else {
            return;
        };
        if mode == Playback::Halt {
            self.stop();
            return;
        }
        let cursor = cursor.clamp(sequence.frame_start() as f32, sequence.frame_end() as f32);
        self.playback = mode;
        self.saved_playback = mode;
        self.cursor = cursor;
        self.resolve(host);
    }

    /// Like [`play`](Self::play) with `t` in `[0, 1]` spread over the frame period.
    pub fn play_normalized<H: HostAdapter + ?Sized>(&mut self, host: &mut H, mode: Playback, t: f32) {
        let Some(sequence) = self.sequence.as_deref() else {
            return;
        };
        if mode == Playback::Halt {
            self.stop();
            return;
        }
        let t = t.clamp(0.0, 1.0);
        self.playback = mode;
        self.saved_playback = mode;
        self.cursor = sequence.frame_start() as f32 + t * sequence.frame_period() as f32;
        self.resolve(host);
    }

    /// Halts playback and forgets the paused mode. The cursor stays put.
    pub fn stop(&mut self) {
        self.playback = Playback::Halt;
        self.saved_playback = Playback::Halt;
    }

    pub fn pause(&mut self) {
        if self.playback == Playback::Halt {
            return;
        }
        self.saved_playback = self.playback;
        self.playback = Playback::Halt;
    }

    pub fn resume<H: HostAdapter + ?Sized>(&mut self, host: &mut H) {
        if self.playback != Playback::Halt {
            return;
        }
        self.playback = self.saved_playback;
        if self.playback.is_playing() {
            self.resolve(host);
        }
    }

    /// Advances the cursor by `elapsed` seconds and commits the new transform.
    pub fn update<H: HostAdapter + ?Sized>(&mut self, host: &mut H, elapsed: f64) {
        let elapsed = elapsed as f32;
        if elapsed == 0.0 || !self.enabled {
            return;
        }

        if !self.custom_color {
            let color = host.root_color();
            host.set_color(self.visual, color);
        }

        if self.playback == Playback::Halt {
            return;
        }

        let Some((start, end, period, rate)) = self.sequence.as_deref().map(|s| {
            (
                s.frame_start() as f32,
                s.frame_end() as f32,
                s.frame_period() as f32,
                s.frame_rate(),
            )
        }) else {
            self.halt();
            return;
        };

        self.cursor += elapsed * rate * self.speed;

        let crossed = self.cursor < start || self.cursor >= end + 1.0;
        if crossed {
            log::trace!("Cursor {} left {}..={} in {:?}", self.cursor, start, end, self.playback);
            match self.playback {
                Playback::Once => self.halt(),
                Playback::PingPong => self.speed = -self.speed,
                Playback::Loop | Playback::Halt => {}
            }
            // Wrapped even when halting so the resting frame matches the wrapped cursor
            let mut wrapped = (self.cursor - start) % period;
            if wrapped < 0.0 {
                wrapped += period;
            }
            self.cursor = wrapped + start;

            self.fire_complete();
        }

        if self.smooth || self.cursor.floor() as i32 != self.last_frame {
            self.resolve(host);
        }
    }

    // ========================================================================
    // Transform commits
    // ========================================================================

    /// Commits the current position/rotation/scale to the host visual.
    pub fn apply_transformations<H: HostAdapter + ?Sized>(&mut self, host: &mut H, invoke_callback: bool) {
        if !self.enabled {
            return;
        }
        if invoke_callback {
            self.fire_transform();
        }
        host.apply_local_transform(self.visual, &self.local_matrix());
    }

    /// Commits `matrix` as is. The position/rotation/scale fields are left untouched.
    pub fn apply_local_matrix<H: HostAdapter + ?Sized>(
        &mut self,
        host: &mut H,
        matrix: &Affine3A,
        invoke_callback: bool,
    ) {
        if !self.enabled {
            return;
        }
        if invoke_callback {
            self.fire_transform();
        }
        host.apply_local_transform(self.visual, matrix);
    }

    // ========================================================================
    // Visibility & color
    // ========================================================================

    pub fn set_visible<H: HostAdapter + ?Sized>(&mut self, host: &mut H, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            host.set_visible(self.visual, self.is_visible());
        }
    }

    /// Applies the controller's enable gate.
    pub(crate) fn set_enabled<H: HostAdapter + ?Sized>(&mut self, host: &mut H, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            host.set_visible(self.visual, self.is_visible());
        }
    }

    #[must_use]
    pub fn color_hsv<H: HostAdapter + ?Sized>(&self, host: &H) -> ColorHsv {
        host.color(self.visual)
    }

    /// Only takes effect while [`custom_color`](Self::custom_color) is on.
    pub fn set_color_hsv<H: HostAdapter + ?Sized>(&mut self, host: &mut H, color: ColorHsv) {
        if self.custom_color {
            host.set_color(self.visual, color);
        }
    }

    /// Sets the "Emissive" material; `display` defaults to white.
    pub fn set_emissive<H: HostAdapter + ?Sized>(
        &mut self,
        host: &mut H,
        emissivity: f32,
        emissive: Vec4,
        display: Option<Vec4>,
    ) {
        host.set_emissive(self.visual, emissivity, emissive, display.unwrap_or(Vec4::ONE));
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn halt(&mut self) {
        self.playback = Playback::Halt;
        self.saved_playback = Playback::Halt;
    }

    /// Samples the sequence at the cursor and commits the result.
    fn resolve<H: HostAdapter + ?Sized>(&mut self, host: &mut H) {
        if !self.enabled {
            return;
        }
        self.last_frame = self.cursor.floor() as i32;

        let sampled = match self.sequence.as_deref() {
            Some(sequence) => {
                let keyframe = sequence.sample(self.cursor, self.smooth);
                if keyframe.is_none() {
                    log::warn!("Sequence '{}' has no keyframe data, halting", sequence.name());
                }
                keyframe
            }
            None => None,
        };
        let Some(keyframe) = sampled else {
            self.halt();
            return;
        };

        self.position = keyframe.position;
        self.rotation = keyframe.rotation;
        self.scale = keyframe.scale;
        self.fire_transform();
        host.apply_local_transform(self.visual, &self.local_matrix());
    }

    fn fire_transform(&mut self) {
        if let Some(mut callback) = self.on_transform.take() {
            callback(self);
            // The callback may have installed a replacement
            if self.on_transform.is_none() {
                self.on_transform = Some(callback);
            }
        }
    }

    fn fire_complete(&mut self) {
        if let Some(mut callback) = self.on_complete.take() {
            callback(self);
            if self.on_complete.is_none() {
                self.on_complete = Some(callback);
            }
        }
    }
}

impl std::fmt::Debug for AnimaPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimaPart")
            .field("visual", &self.visual)
            .field("parent", &self.parent)
            .field("sequence", &self.sequence.as_ref().map(|s| s.name().to_owned()))
            .field("playback", &self.playback)
            .field("cursor", &self.cursor)
            .field("speed", &self.speed)
            .field("enabled", &self.enabled)
            .field("visible", &self.visible)
            .finish_non_exhaustive()
    }
}
