use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crate::track::TrackId;

fn make_track() -> Track {
    Track {
        id: TrackId::first().next(),
        path: PathBuf::from("/tmp/music/test.mp3"),
        title: "Test Title".to_string(),
        artist: "Test Artist".to_string(),
        duration: Duration::from_micros(1_234_567),
        artwork: Some(PathBuf::from("/tmp/vivace-artwork-2.jpg")),
        tags: vec!["Test Album".to_string(), "Ambient".to_string()],
        bpm: 0.0,
        key: "-".to_string(),
        waveform: Vec::new(),
    }
}

#[test]
fn set_track_sets_and_clears_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    let track = make_track();
    handle.set_track(Some(&track));

    {
        let s = state.lock().unwrap();
        assert_eq!(s.title.as_deref(), Some("Test Title"));
        assert_eq!(s.artist.as_deref(), Some("Test Artist"));
        assert!(s.url.as_deref().unwrap().contains("/tmp/music/test.mp3"));
        assert!(s.art_url.as_deref().unwrap().starts_with("file://"));
        assert_eq!(s.length_micros, Some(1_234_567));
        assert_eq!(s.comments, vec!["Test Album", "Ambient"]);
        assert_eq!(
            s.track_id.as_deref(),
            Some("/org/mpris/MediaPlayer2/track/2")
        );
    }

    handle.set_track(None);
    {
        let s = state.lock().unwrap();
        assert_eq!(s.title, None);
        assert_eq!(s.artist, None);
        assert_eq!(s.url, None);
        assert_eq!(s.art_url, None);
        assert_eq!(s.length_micros, None);
        assert!(s.comments.is_empty());
        assert!(s.track_id.is_none());
    }
}

#[test]
fn playback_status_maps_state_to_spec_strings() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    for (playback, expected) in [
        (PlaybackState::Idle, "Stopped"),
        (PlaybackState::Loading, "Stopped"),
        (PlaybackState::Ready, "Stopped"),
        (PlaybackState::Playing, "Playing"),
        (PlaybackState::Paused, "Paused"),
        (PlaybackState::Stopped, "Stopped"),
        (PlaybackState::Error("x".into()), "Stopped"),
    ] {
        state.lock().unwrap().playback = playback;
        assert_eq!(iface.playback_status(), expected);
    }
}

#[test]
fn metadata_includes_expected_keys_when_present() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, _rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface {
        tx,
        state: state.clone(),
    };

    let handle = MprisHandle {
        state: state.clone(),
    };
    handle.set_track(Some(&make_track()));

    let map = iface.metadata();
    for k in [
        "mpris:trackid",
        "xesam:title",
        "xesam:artist",
        "xesam:comment",
        "xesam:url",
        "mpris:length",
        "mpris:artUrl",
    ] {
        assert!(map.contains_key(k), "missing key: {k}");
    }
}

#[test]
fn open_uri_translates_file_urls_to_load_commands() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.open_uri("file:///music/track.flac");
    match rx.try_recv().unwrap() {
        ControlCmd::Load(path) => assert_eq!(path, PathBuf::from("/music/track.flac")),
        other => panic!("unexpected command: {other:?}"),
    }

    // Non-file URIs are ignored.
    iface.open_uri("https://example.com/stream");
    assert!(rx.try_recv().is_err());
}

#[test]
fn seek_and_set_position_convert_micros_to_seconds() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (tx, rx) = mpsc::channel::<ControlCmd>();
    let iface = PlayerIface { tx, state };

    iface.seek(-5_000_000);
    match rx.try_recv().unwrap() {
        ControlCmd::SeekBy(s) => assert_eq!(s, -5.0),
        other => panic!("unexpected command: {other:?}"),
    }

    let path = ObjectPath::try_from("/org/mpris/MediaPlayer2/track/1").unwrap();
    iface.set_position(path, 2_500_000);
    match rx.try_recv().unwrap() {
        ControlCmd::SetPosition(s) => assert_eq!(s, 2.5),
        other => panic!("unexpected command: {other:?}"),
    }
}
