use crate::audio::Band;

/// Everything the controller can be asked to do from the keyboard, the
/// playlist view or a desktop media key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    TogglePlay,
    Play,
    Pause,
    Stop,
    Next,
    Prev,
    PlayAt(usize),
    ToggleShuffle,
    ToggleRepeat,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    SeekForward,
    SeekBackward,
    GainUp(Band),
    GainDown(Band),
    MoveTrack { from: usize, to: usize },
}
