use crate::mpris::MprisHandle;
use crate::player::PlayerInfo;

/// Push the full engine snapshot into the MPRIS shared state.
pub fn update_mpris(mpris: &MprisHandle, info: &PlayerInfo) {
    mpris.set_playback(&info.state);
    mpris.set_track(info.track.as_ref());
    mpris.set_position(info.position);
    mpris.set_volume(info.volume);
}
