use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::animation::keyframe::{Interpolatable, Keyframe};
use crate::errors::{AnimaError, Result};

/// Immutable keyframe track with its frame-range metadata.
///
/// The cursor of a part moves through the frame window
/// `[frame_start, frame_end]`. Stored keyframes cover the key window
/// `[key_start, key_end]`, and any lookup outside the key window is clamped
/// to its first or last keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: String,
    frame_start: i32,
    frame_end: i32,
    frame_rate: f32,
    key_start: i32,
    key_end: i32,
    keyframes: Vec<Keyframe>,
}

impl Sequence {
    /// Starts declaring a sequence.
    pub fn builder(name: impl Into<String>) -> SequenceBuilder {
        SequenceBuilder::new(name)
    }

    /// Decodes and validates a sequence authored as JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let desc: SequenceDesc = serde_json::from_str(json)?;
        desc.into_sequence()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn frame_start(&self) -> i32 {
        self.frame_start
    }

    #[must_use]
    pub fn frame_end(&self) -> i32 {
        self.frame_end
    }

    /// Inclusive frame count, `frame_end - frame_start + 1`.
    #[must_use]
    pub fn frame_period(&self) -> i32 {
        self.frame_end - self.frame_start + 1
    }

    /// Frames per second.
    #[must_use]
    pub fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    #[must_use]
    pub fn key_start(&self) -> i32 {
        self.key_start
    }

    #[must_use]
    pub fn key_end(&self) -> i32 {
        self.key_end
    }

    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframe stored for `frame`, clamped into the key window.
    ///
    /// Returns `None` only when no keyframe is stored at all.
    #[must_use]
    pub fn get_keyframe(&self, frame: i32) -> Option<&Keyframe> {
        if self.keyframes.is_empty() {
            return None;
        }
        let frame = frame.clamp(self.key_start, self.key_end);
        self.keyframes.get((frame - self.key_start) as usize)
    }

    /// Resolves the transform for a fractional cursor.
    ///
    /// Without smoothing this is the keyframe at `floor(cursor)`. With
    /// smoothing the keyframes at `floor(cursor)` and `floor(cursor) + 1`
    /// are blended by the fractional part; both lookups clamp independently,
    /// so the tail of the sequence holds flat instead of wrapping.
    #[must_use]
    pub fn sample(&self, cursor: f32, smooth: bool) -> Option<Keyframe> {
        let floor = cursor.floor();
        let frame = floor as i32;
        let lower = *self.get_keyframe(frame)?;
        if !smooth {
            return Some(lower);
        }
        let upper = *self.get_keyframe(frame.saturating_add(1))?;
        Some(Keyframe::interpolate_linear(lower, upper, cursor - floor))
    }
}

/// Step-by-step declaration of a [`Sequence`].
///
/// Mirrors the shapes the authoring exporter emits: each push method appends
/// one keyframe, filling omitted components with identity values.
///
/// ```rust,ignore
/// let seq = Sequence::builder("Seq_TopCap_powerOn")
///     .frames(0, 2)
///     .rate(30.0)
///     .location(Vec3::ZERO)
///     .location(Vec3::new(0.0, 0.5, 0.0))
///     .location(Vec3::new(0.0, 1.0, 0.0))
///     .build()?;
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct SequenceBuilder {
    name: String,
    frame_start: i32,
    frame_end: i32,
    frame_rate: f32,
    keys: Option<(i32, i32)>,
    keyframes: Vec<Keyframe>,
}

impl SequenceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frame_start: 0,
            frame_end: 0,
            frame_rate: 30.0,
            keys: None,
            keyframes: Vec::new(),
        }
    }

    /// Global frame window the cursor plays through.
    pub fn frames(mut self, start: i32, end: i32) -> Self {
        self.frame_start = start;
        self.frame_end = end;
        self
    }

    pub fn rate(mut self, frames_per_second: f32) -> Self {
        self.frame_rate = frames_per_second;
        self
    }

    /// Window the stored keyframes are indexed by. Defaults to the frame window.
    pub fn keys(mut self, start: i32, end: i32) -> Self {
        self.keys = Some((start, end));
        self
    }

    pub fn keyframe(mut self, keyframe: Keyframe) -> Self {
        self.keyframes.push(keyframe);
        self
    }

    pub fn loc_rot_scale(self, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.keyframe(Keyframe::new(position, rotation, scale))
    }

    pub fn location(self, position: Vec3) -> Self {
        self.keyframe(Keyframe::new(position, Quat::IDENTITY, Vec3::ONE))
    }

    pub fn rotation(self, rotation: Quat) -> Self {
        self.keyframe(Keyframe::new(Vec3::ZERO, rotation, Vec3::ONE))
    }

    pub fn scaling(self, scale: Vec3) -> Self {
        self.keyframe(Keyframe::new(Vec3::ZERO, Quat::IDENTITY, scale))
    }

    pub fn loc_rot(self, position: Vec3, rotation: Quat) -> Self {
        self.keyframe(Keyframe::new(position, rotation, Vec3::ONE))
    }

    pub fn loc_scale(self, position: Vec3, scale: Vec3) -> Self {
        self.keyframe(Keyframe::new(position, Quat::IDENTITY, scale))
    }

    pub fn rot_scale(self, rotation: Quat, scale: Vec3) -> Self {
        self.keyframe(Keyframe::new(Vec3::ZERO, rotation, scale))
    }

    /// Appends an identity keyframe.
    pub fn none(self) -> Self {
        self.keyframe(Keyframe::IDENTITY)
    }

    /// Validates the windows against the declared keyframes.
    pub fn build(self) -> Result<Sequence> {
        let (key_start, key_end) = self.keys.unwrap_or((self.frame_start, self.frame_end));

        let Some(frames) = window_len(self.frame_start, self.frame_end) else {
            return Err(AnimaError::InvalidFrameRange {
                name: self.name,
                start: self.frame_start,
                end: self.frame_end,
            });
        };
        let Some(keys) = window_len(key_start, key_end) else {
            return Err(AnimaError::InvalidFrameRange {
                name: self.name,
                start: key_start,
                end: key_end,
            });
        };
        if keys != frames {
            return Err(AnimaError::WindowMismatch {
                name: self.name,
                keys,
                frames,
            });
        }
        if self.keyframes.is_empty() {
            return Err(AnimaError::EmptySequence(self.name));
        }
        let expected = keys as usize;
        if self.keyframes.len() != expected {
            return Err(AnimaError::KeyframeCount {
                name: self.name,
                expected,
                actual: self.keyframes.len(),
            });
        }

        Ok(Sequence {
            name: self.name,
            frame_start: self.frame_start,
            frame_end: self.frame_end,
            frame_rate: self.frame_rate,
            key_start,
            key_end,
            keyframes: self.keyframes,
        })
    }
}

/// Inclusive length of `[start, end]`. `None` when the window is reversed or
/// its length does not fit in an `i32`.
fn window_len(start: i32, end: i32) -> Option<i32> {
    let len = i64::from(end) - i64::from(start) + 1;
    if len < 1 {
        return None;
    }
    i32::try_from(len).ok()
}

/// Serialized form of a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceDesc {
    pub name: String,
    pub frame_start: i32,
    pub frame_end: i32,
    pub frame_rate: f32,
    #[serde(default)]
    pub key_start: Option<i32>,
    #[serde(default)]
    pub key_end: Option<i32>,
    pub keyframes: Vec<Keyframe>,
}

impl SequenceDesc {
    pub fn into_sequence(self) -> Result<Sequence> {
        let mut builder = Sequence::builder(self.name)
            .frames(self.frame_start, self.frame_end)
            .rate(self.frame_rate);
        if let (Some(start), Some(end)) = (self.key_start, self.key_end) {
            builder = builder.keys(start, end);
        }
        self.keyframes
            .into_iter()
            .fold(builder, SequenceBuilder::keyframe)
            .build()
    }
}

impl From<&Sequence> for SequenceDesc {
    fn from(sequence: &Sequence) -> Self {
        Self {
            name: sequence.name.clone(),
            frame_start: sequence.frame_start,
            frame_end: sequence.frame_end,
            frame_rate: sequence.frame_rate,
            key_start: Some(sequence.key_start),
            key_end: Some(sequence.key_end),
            keyframes: sequence.keyframes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(name: &str, start: i32, end: i32) -> SequenceBuilder {
        (start..=end).fold(
            Sequence::builder(name).frames(start, end).rate(30.0),
            |b, f| b.location(Vec3::new(f as f32, 0.0, 0.0)),
        )
    }

    #[test]
    fn period_and_count_follow_windows() {
        let seq = ramp("ramp", 3, 12).build().unwrap();
        assert_eq!(seq.frame_period(), 10);
        assert_eq!(seq.len() as i32, seq.key_end() - seq.key_start() + 1);
    }

    #[test]
    fn rejects_reversed_frames() {
        let err = Sequence::builder("bad").frames(5, 2).none().build().unwrap_err();
        assert!(matches!(err, AnimaError::InvalidFrameRange { .. }));
    }

    #[test]
    fn rejects_mismatched_windows() {
        let err = ramp("bad", 0, 4).keys(0, 2).build().unwrap_err();
        assert!(matches!(err, AnimaError::WindowMismatch { keys: 3, frames: 5, .. }));
    }

    #[test]
    fn rejects_short_keyframe_list() {
        let err = Sequence::builder("short")
            .frames(0, 3)
            .none()
            .none()
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            AnimaError::KeyframeCount {
                expected: 4,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty() {
        let err = Sequence::builder("empty").build().unwrap_err();
        assert!(matches!(err, AnimaError::EmptySequence(_)));
    }

    #[test]
    fn json_roundtrip_keeps_content() {
        let seq = ramp("json", 0, 2).build().unwrap();
        let json = serde_json::to_string(&SequenceDesc::from(&seq)).unwrap();
        assert_eq!(Sequence::from_json(&json).unwrap(), seq);
    }

    #[test]
    fn json_without_key_window_uses_frame_window() {
        let json = r#"{
            "name": "blink",
            "frame_start": 1,
            "frame_end": 2,
            "frame_rate": 24.0,
            "keyframes": [
                { "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] },
                { "position": [0.0, 1.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] }
            ]
        }"#;
        let seq = Sequence::from_json(json).unwrap();
        assert_eq!((seq.key_start(), seq.key_end()), (1, 2));
        assert_eq!(seq.frame_rate(), 24.0);
    }

    #[test]
    fn rejects_window_wider_than_i32() {
        let json = format!(
            r#"{{
                "name": "huge",
                "frame_start": {},
                "frame_end": {},
                "frame_rate": 30.0,
                "keyframes": [
                    {{ "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] }}
                ]
            }}"#,
            i32::MIN,
            i32::MAX
        );
        let err = Sequence::from_json(&json).unwrap_err();
        assert!(matches!(err, AnimaError::InvalidFrameRange { .. }));
    }

    #[test]
    fn extreme_key_window_is_an_error() {
        let err = Sequence::builder("far")
            .frames(0, 0)
            .keys(i32::MAX, i32::MIN)
            .none()
            .build()
            .unwrap_err();
        assert!(matches!(err, AnimaError::InvalidFrameRange { .. }));

        let err = Sequence::builder("far")
            .frames(i32::MIN + 1, -1)
            .keys(0, 10)
            .none()
            .build()
            .unwrap_err();
        assert!(matches!(err, AnimaError::WindowMismatch { .. }));
    }

    #[test]
    fn smooth_sample_at_max_cursor_does_not_overflow() {
        let seq = Sequence::builder("edge")
            .frames(i32::MAX - 1, i32::MAX)
            .none()
            .none()
            .build()
            .unwrap();
        assert!(seq.sample(f32::MAX, true).is_some());
    }
}
