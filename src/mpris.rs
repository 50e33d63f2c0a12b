//! MPRIS service on the session bus: media keys in, transport state and
//! track metadata out.

use std::collections::HashMap;
use std::sync::mpsc::{self, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::bridge::{HostEvent, MediaControl};
use crate::library::Track;
use crate::player::{MediaState, WindowAction};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.tunebox";
// How often the service checks for state to announce.
const NOTIFY_POLL: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct SharedState {
    playback: MediaState,
    title: Option<String>,
    artist: Vec<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<ObjectPath<'static>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            playback: MediaState::Stopped,
            title: None,
            artist: Vec::new(),
            url: None,
            length_micros: None,
            track_id: None,
        }
    }
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
    notify: Sender<()>,
}

impl MprisHandle {
    /// A handle with no service behind it.
    #[cfg(test)]
    pub(crate) fn detached() -> Self {
        let (notify, _) = mpsc::channel();
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
            notify,
        }
    }

    pub fn set_playback(&self, playback: MediaState) {
        let changed = match self.state.lock() {
            Ok(mut s) if s.playback != playback => {
                s.playback = playback;
                true
            }
            _ => false,
        };
        if changed {
            let _ = self.notify.send(());
        }
    }

    /// Publish the track at playlist position `index`, or clear the metadata.
    pub fn set_track_metadata(&self, index: Option<usize>, track: Option<&Track>) {
        let track_id = index.and_then(|i| ObjectPath::try_from(format!("{OBJECT_PATH}/track/{i}")).ok());
        let changed = match self.state.lock() {
            Ok(mut s) => {
                if s.track_id == track_id && s.url == track.map(file_url) {
                    false
                } else {
                    s.track_id = track_id;
                    s.title = track.map(|t| t.title.clone().unwrap_or_else(|| t.display.clone()));
                    s.artist = track.and_then(|t| t.artist.clone()).into_iter().collect();
                    s.url = track.map(file_url);
                    s.length_micros = track
                        .and_then(|t| t.duration)
                        .map(|d| d.as_micros().min(i64::MAX as u128) as i64);
                    true
                }
            }
            Err(_) => false,
        };
        if changed {
            let _ = self.notify.send(());
        }
    }
}

fn file_url(track: &Track) -> String {
    format!("file://{}", track.path.display())
}

fn owned<'a>(value: impl Into<Value<'a>>) -> Option<OwnedValue> {
    OwnedValue::try_from(value.into()).ok()
}

struct RootIface {
    tx: Sender<HostEvent>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // A terminal cannot be raised.
    }

    fn quit(&self) {
        let _ = self.tx.send(HostEvent::Window(WindowAction::Close));
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "tunebox"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<HostEvent>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn send(&self, control: MediaControl) {
        debug!(?control, "mpris control");
        let _ = self.tx.send(HostEvent::Media(control));
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(MediaControl::Next);
    }

    fn previous(&self) {
        self.send(MediaControl::Previous);
    }

    fn play(&self) {
        self.send(MediaControl::Play);
    }

    fn pause(&self) {
        self.send(MediaControl::Pause);
    }

    fn play_pause(&self) {
        self.send(MediaControl::PlayPause);
    }

    fn stop(&self) {
        self.send(MediaControl::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.playback {
            MediaState::Stopped => "Stopped",
            MediaState::Playing => "Playing",
            MediaState::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        let mut put = |key: &str, value: Option<OwnedValue>| {
            if let Some(v) = value {
                map.insert(key.to_string(), v);
            }
        };
        put("mpris:trackid", s.track_id.clone().and_then(owned));
        put("xesam:title", owned(s.title.clone().unwrap_or_default()));
        if !s.artist.is_empty() {
            put("xesam:artist", owned(s.artist.clone()));
        }
        put("xesam:url", s.url.clone().and_then(owned));
        put("mpris:length", s.length_micros.and_then(owned));
        map
    }
}

pub fn spawn_mpris(tx: Sender<HostEvent>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let (notify_tx, notify_rx) = mpsc::channel::<()>();

    let state_for_thread = state.clone();
    std::thread::spawn(move || {
        block_on(async move {
            let connection = match Connection::session().await {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "MPRIS: failed to connect to session bus");
                    return;
                }
            };

            if let Err(e) = connection.request_name(BUS_NAME).await {
                warn!(error = %e, "MPRIS: failed to acquire name");
                return;
            }

            let object_server = connection.object_server();

            if let Err(e) = object_server.at(OBJECT_PATH, RootIface { tx: tx.clone() }).await {
                warn!(error = %e, "MPRIS: failed to register root iface");
                return;
            }

            if let Err(e) = object_server
                .at(
                    OBJECT_PATH,
                    PlayerIface {
                        tx,
                        state: state_for_thread,
                    },
                )
                .await
            {
                warn!(error = %e, "MPRIS: failed to register player iface");
                return;
            }

            let iface_ref = match object_server.interface::<_, PlayerIface>(OBJECT_PATH).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "MPRIS: player iface vanished");
                    return;
                }
            };

            // Emit PropertiesChanged whenever the handle reports a change.
            loop {
                Timer::after(NOTIFY_POLL).await;
                let mut changed = false;
                loop {
                    match notify_rx.try_recv() {
                        Ok(()) => changed = true,
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
                if changed {
                    let iface = iface_ref.get().await;
                    let emitter = iface_ref.signal_emitter();
                    if let Err(e) = iface.playback_status_changed(emitter).await {
                        debug!(error = %e, "MPRIS: status signal failed");
                    }
                    if let Err(e) = iface.metadata_changed(emitter).await {
                        debug!(error = %e, "MPRIS: metadata signal failed");
                    }
                }
            }
        });
    });

    MprisHandle {
        state,
        notify: notify_tx,
    }
}

#[cfg(test)]
mod tests;
