use serde::{Deserialize, Serialize};

/// Playback mode of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Playback {
    /// Not advancing. Passing it to `play` is the same as `stop`.
    #[default]
    Halt,
    /// Play until the cursor leaves the frame window, then halt.
    Once,
    /// Wrap around at the window border forever.
    Loop,
    /// Wrap around and invert the part speed at every border crossing.
    PingPong,
}

impl Playback {
    #[inline]
    #[must_use]
    pub fn is_playing(self) -> bool {
        self != Playback::Halt
    }
}
