#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Procedural keyframe animation for hierarchies of visual parts attached to
//! a host game entity.
//!
//! The host reports elapsed time to an [`AnimaController`], which forwards it
//! to each [`AnimaPart`]; every part advances its cursor through its assigned
//! [`Sequence`] and pushes the resulting local transform back through the
//! [`HostAdapter`].

pub mod errors;
pub mod host;
pub mod settings;
pub mod utils;
pub mod animation;

pub use errors::{AnimaError, Result};
pub use host::{ColorHsv, HostAdapter, VisualHandle};
pub use settings::{ControllerSettings, PartOptions};
pub use utils::time::ElapsedClock;
pub use animation::{
    AnimaController, AnimaPart, Keyframe, PartKey, PartMut, Playback, Sequence, SequenceBuilder,
    SequenceRepository, SharedSequence,
};
