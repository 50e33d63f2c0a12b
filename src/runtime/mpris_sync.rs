use crate::mpris::MprisHandle;
use crate::player::{MediaState, PlaybackState};

use super::PlayerController;

pub fn update_mpris(mpris: &MprisHandle, controller: &PlayerController) {
    let track = controller.current_track();
    let index = track.map(|_| controller.current_index());
    mpris.set_track_metadata(index, track);
    mpris.set_playback(match controller.state() {
        PlaybackState::Playing => MediaState::Playing,
        PlaybackState::Paused => MediaState::Paused,
        PlaybackState::Stopped => MediaState::Stopped,
    });
}
