//! Keyframe playback.
//!
//! - [`Sequence`]: immutable keyframe track with frame-range metadata
//! - [`SequenceRepository`]: shared, lazily built sequences keyed by identity
//! - [`AnimaPart`]: one animated node with its own cursor, mode and speed
//! - [`AnimaController`]: owns the parts of one animated object and fans
//!   playback commands out to them

pub mod keyframe;
pub mod sequence;
pub mod repository;
pub mod playback;
pub mod part;
pub mod wrapper;
pub mod controller;

pub use keyframe::{Interpolatable, Keyframe};
pub use sequence::{Sequence, SequenceBuilder, SequenceDesc};
pub use repository::{SequenceRepository, SharedSequence};
pub use playback::Playback;
pub use part::{AnimaPart, PartCallback};
pub use wrapper::PartMut;
pub use controller::AnimaController;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle of a part inside its controller.
    pub struct PartKey;
}
