use std::sync::Arc;

use glam::Affine3A;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::animation::part::AnimaPart;
use crate::animation::playback::Playback;
use crate::animation::repository::{SequenceRepository, SharedSequence};
use crate::animation::wrapper::PartMut;
use crate::animation::PartKey;
use crate::errors::Result;
use crate::host::{HostAdapter, VisualHandle};
use crate::settings::{ControllerSettings, PartOptions};
use crate::utils::time::ElapsedClock;

/// Owner of one animated object's parts.
///
/// Every playback command fans out to the parts in insertion order. While no
/// host is bound, fan-outs and part creation are silent no-ops.
///
/// # Example
///
/// ```rust,ignore
/// let mut anima = AnimaController::new(Arc::clone(&repository));
/// anima.bind(host);
///
/// let core = anima.add_part(None, "Models/Core", PartOptions::default()).unwrap();
/// let cap = anima.add_part(Some(core), "Models/TopCap", PartOptions::default()).unwrap();
///
/// let seq = anima.acquire("Seq_Core_active")?;
/// anima.part_mut(core).unwrap().set_sequence(Some(seq));
/// anima.play(Playback::Loop, 0.0);
///
/// // every simulation step
/// anima.tick();
/// ```
pub struct AnimaController<H: HostAdapter> {
    host: Option<H>,
    repository: Arc<SequenceRepository>,
    settings: ControllerSettings,

    parts: SlotMap<PartKey, AnimaPart>,
    order: Vec<PartKey>,

    enabled: bool,
    clock: ElapsedClock,
    released: bool,
}

impl<H: HostAdapter> AnimaController<H> {
    /// Creates an unbound controller and registers it with `repository`.
    #[must_use]
    pub fn new(repository: Arc<SequenceRepository>) -> Self {
        Self::with_settings(repository, ControllerSettings::default())
    }

    #[must_use]
    pub fn with_settings(repository: Arc<SequenceRepository>, settings: ControllerSettings) -> Self {
        repository.register_controller();
        Self {
            host: None,
            repository,
            settings,
            parts: SlotMap::with_key(),
            order: Vec::new(),
            enabled: true,
            clock: ElapsedClock::new(),
            released: false,
        }
    }

    // ========================================================================
    // Host binding
    // ========================================================================

    /// Binds the host entity. Returns the previously bound host, if any.
    ///
    /// The current enable gate is pushed to every part, since it may have
    /// changed while unbound.
    pub fn bind(&mut self, host: H) -> Option<H> {
        self.clock.reset();
        let previous = self.host.replace(host);
        let enabled = self.enabled;
        self.for_each_part(|part, host| part.set_enabled(host, enabled));
        previous
    }

    pub fn unbind(&mut self) -> Option<H> {
        self.host.take()
    }

    #[inline]
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.host.is_some()
    }

    #[must_use]
    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    #[must_use]
    pub fn repository(&self) -> &Arc<SequenceRepository> {
        &self.repository
    }

    #[must_use]
    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut ControllerSettings {
        &mut self.settings
    }

    /// Shorthand for `repository().acquire(name)`.
    pub fn acquire(&self, name: &str) -> Result<SharedSequence> {
        self.repository.acquire(name)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Creates a part whose visual hangs under `parent`, or under the root
    /// entity when `parent` is `None`.
    pub fn add_part(&mut self, parent: Option<PartKey>, model: &str, options: PartOptions) -> Option<PartKey> {
        let parent_visual = match parent {
            Some(key) => {
                let Some(part) = self.parts.get(key) else {
                    log::warn!("Parent part {key:?} not found, '{model}' not added");
                    return None;
                };
                Some(part.visual())
            }
            None => None,
        };
        let host = self.host.as_mut()?;
        let Some(visual) = host.create_child_visual(parent_visual, model) else {
            log::warn!("Host could not create visual for model '{model}'");
            return None;
        };
        Some(self.insert_part(visual, parent, options))
    }

    /// Creates a part under one of the root entity's own sub-objects.
    pub fn add_part_to_subpart(&mut self, subpart: &str, model: &str, options: PartOptions) -> Option<PartKey> {
        let host = self.host.as_mut()?;
        let Some(parent_visual) = host.subpart_visual(subpart) else {
            log::warn!("Subpart '{subpart}' not found on root entity");
            return None;
        };
        let Some(visual) = host.create_child_visual(Some(parent_visual), model) else {
            log::warn!("Host could not create visual for model '{model}'");
            return None;
        };
        Some(self.insert_part(visual, None, options))
    }

    /// [`add_part`](Self::add_part) with the configured default options.
    pub fn add_default_part(&mut self, parent: Option<PartKey>, model: &str) -> Option<PartKey> {
        let options = self.settings.part_defaults;
        self.add_part(parent, model, options)
    }

    fn insert_part(&mut self, visual: VisualHandle, parent: Option<PartKey>, options: PartOptions) -> PartKey {
        let mut part = AnimaPart::new(visual, parent);
        part.set_smooth_animation(options.smooth);

        if let Some(host) = self.host.as_mut() {
            let color = host.root_color();
            host.set_color(visual, color);
            host.apply_local_transform(visual, &Affine3A::IDENTITY);
            part.set_visible(host, options.visible);
            part.set_enabled(host, self.enabled);
        }

        let key = self.parts.insert(part);
        self.order.push(key);
        key
    }

    /// Removes `key` and every part below it. Returns how many parts were removed.
    pub fn remove_part(&mut self, key: PartKey) -> usize {
        if !self.parts.contains_key(key) {
            return 0;
        }

        let mut doomed = vec![key];
        let mut stack: SmallVec<[PartKey; 8]> = SmallVec::new();
        stack.push(key);
        while let Some(current) = stack.pop() {
            for &child in &self.order {
                if self.parts.get(child).and_then(AnimaPart::parent) == Some(current) {
                    doomed.push(child);
                    stack.push(child);
                }
            }
        }

        for &k in &doomed {
            if let Some(part) = self.parts.remove(k)
                && let Some(host) = self.host.as_mut()
            {
                host.remove_visual(part.visual());
            }
        }
        self.order.retain(|k| self.parts.contains_key(*k));
        doomed.len()
    }

    #[must_use]
    pub fn part(&self, key: PartKey) -> Option<&AnimaPart> {
        self.parts.get(key)
    }

    /// Borrows a part together with the host. `None` for stale keys or while unbound.
    pub fn part_mut(&mut self, key: PartKey) -> Option<PartMut<'_, H>> {
        let part = self.parts.get_mut(key)?;
        let host = self.host.as_mut()?;
        Some(PartMut::new(part, host))
    }

    /// Parts in insertion order.
    pub fn parts(&self) -> impl Iterator<Item = (PartKey, &AnimaPart)> {
        self.order.iter().filter_map(|&k| self.parts.get(k).map(|p| (k, p)))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // ========================================================================
    // Enable gate
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabled parts are neither updated nor shown.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        let Some(host) = self.host.as_mut() else {
            return;
        };
        for key in &self.order {
            if let Some(part) = self.parts.get_mut(*key) {
                part.set_enabled(host, enabled);
            }
        }
    }

    /// Whether the viewpoint is closer than `max_distance` to the root entity.
    #[must_use]
    pub fn test_distance(&self, max_distance: f64) -> bool {
        let Some(host) = self.host.as_ref() else {
            return false;
        };
        let entity = host.entity_position().as_dvec3();
        let viewpoint = host.viewpoint_position().as_dvec3();
        entity.distance_squared(viewpoint) < max_distance * max_distance
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Seconds since the previous call.
    pub fn elapsed(&mut self) -> f64 {
        self.clock.poll()
    }

    /// One simulation step: distance gating (if configured), then `update`
    /// with the time elapsed since the last tick.
    pub fn tick(&mut self) {
        let elapsed = self.elapsed();
        if let Some(distance) = self.settings.cull_distance {
            let in_range = self.test_distance(distance);
            self.set_enabled(in_range);
        }
        if self.enabled {
            self.update(elapsed);
        }
    }

    // ========================================================================
    // Fan-out
    // ========================================================================

    fn for_each_part(&mut self, mut f: impl FnMut(&mut AnimaPart, &mut H)) {
        let Some(host) = self.host.as_mut() else {
            return;
        };
        for key in &self.order {
            if let Some(part) = self.parts.get_mut(*key) {
                f(part, host);
            }
        }
    }

    pub fn set_smooth_animation(&mut self, smooth: bool) {
        self.for_each_part(|part, _| part.set_smooth_animation(smooth));
    }

    /// Starts playback on all parts, `cursor` in frames.
    pub fn play(&mut self, mode: Playback, cursor: f32) {
        self.for_each_part(|part, host| part.play(host, mode, cursor));
    }

    /// Starts playback on all parts, `t` normalized to `[0, 1]`.
    pub fn play_normalized(&mut self, mode: Playback, t: f32) {
        self.for_each_part(|part, host| part.play_normalized(host, mode, t));
    }

    pub fn stop(&mut self) {
        self.for_each_part(|part, _| part.stop());
    }

    pub fn pause(&mut self) {
        self.for_each_part(|part, _| part.pause());
    }

    pub fn resume(&mut self) {
        self.for_each_part(|part, host| part.resume(host));
    }

    /// Advances every part by `elapsed` seconds.
    pub fn update(&mut self, elapsed: f64) {
        self.for_each_part(|part, host| part.update(host, elapsed));
    }

    /// Re-commits every part's transform, optionally running on-transform hooks.
    pub fn apply_transformations(&mut self, invoke_callbacks: bool) {
        self.for_each_part(|part, host| part.apply_transformations(host, invoke_callbacks));
    }

    // ========================================================================
    // Lifetime
    // ========================================================================

    /// Releases this controller's hold on the repository. Idempotent; also
    /// runs on drop.
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.repository.release_controller();
    }
}

impl<H: HostAdapter> Drop for AnimaController<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
