//! Owns the persisted settings and keeps both halves of the bidirectional
//! binding honest: shell-originated changes are written back to disk, and
//! external edits are picked up by a polling watcher and fanned out to the
//! actors that care.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use notify::{Config as NotifyConfig, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, instrument, warn};

use crate::actor::{overview, rotation};
use crate::common::config::Settings;

pub type Sender = crate::actor::Sender<Event>;
pub type Receiver = crate::actor::Receiver<Event>;

#[derive(Debug)]
pub enum Event {
    /// The settings file changed on disk.
    FileChanged,
    /// Shell-originated change; persisted without echoing back to the
    /// originator.
    SetOrientationLock(bool),
}

pub struct SettingsStore {
    file: PathBuf,
    settings: Settings,
    receiver: Receiver,
    rotation_tx: rotation::Sender,
    overview_tx: overview::Sender,
}

impl SettingsStore {
    pub fn new(
        file: PathBuf,
        settings: Settings,
        receiver: Receiver,
        rotation_tx: rotation::Sender,
        overview_tx: overview::Sender,
    ) -> Self {
        Self { file, settings, receiver, rotation_tx, overview_tx }
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.receiver.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    #[instrument(name = "settings::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::FileChanged => self.reload(),
            Event::SetOrientationLock(locked) => self.set_orientation_lock(locked),
        }
    }

    fn reload(&mut self) {
        let mut reloaded = match Settings::read(&self.file) {
            Ok(settings) => settings,
            Err(err) => {
                // Keep the last good settings in effect.
                warn!(%err, "ignoring unreadable settings file");
                return;
            }
        };
        for issue in reloaded.validate() {
            warn!(%issue, "settings issue");
        }
        let fixes = reloaded.auto_fix_values();
        if fixes > 0 {
            info!(fixes, "auto-fixed settings values");
        }

        if reloaded == self.settings {
            debug!("settings unchanged");
            return;
        }
        info!("settings reloaded");

        if reloaded.shell.orientation_lock != self.settings.shell.orientation_lock {
            self.rotation_tx.send(rotation::Event::SettingsChanged {
                orientation_lock: reloaded.shell.orientation_lock,
            });
        }
        if reloaded.apps != self.settings.apps
            || reloaded.shell.search_debounce_ms != self.settings.shell.search_debounce_ms
        {
            self.overview_tx.send(overview::Event::SettingsChanged(reloaded.clone()));
        }
        if reloaded.keys != self.settings.keys {
            // Bindings are read at dispatch time by the shell front-end.
            info!("key bindings changed");
        }

        self.settings = reloaded;
    }

    fn set_orientation_lock(&mut self, locked: bool) {
        if self.settings.shell.orientation_lock == locked {
            return;
        }
        self.settings.shell.orientation_lock = locked;
        if let Err(err) = self.settings.save(&self.file) {
            warn!(%err, "failed to persist orientation lock");
        }
    }
}

/// Watch the settings file for external edits, feeding [`Event::FileChanged`]
/// into the store. Runs on its own thread; content comparison keeps
/// self-inflicted writes from looking like a stream of changes.
pub fn spawn_watcher(file: PathBuf, settings_tx: Sender) {
    thread::Builder::new()
        .name("settings-watcher".to_string())
        .spawn(move || {
            if let Err(err) = watch(&file, settings_tx) {
                warn!(%err, "settings-watcher exited");
            }
        })
        .expect("failed to spawn settings-watcher thread");
}

fn watch(file: &PathBuf, settings_tx: Sender) -> notify::Result<()> {
    let (tx, rx) = std::sync::mpsc::channel::<notify::Result<notify::Event>>();

    let mut watcher = PollWatcher::new(
        move |result| {
            let _ = tx.send(result);
        },
        NotifyConfig::default()
            .with_poll_interval(Duration::from_secs(1))
            .with_compare_contents(true),
    )?;

    watcher.watch(file, RecursiveMode::NonRecursive)?;

    info!("watching {:?}", file);

    for result in rx {
        match result {
            Ok(event) => {
                if is_relevant(file, &event) {
                    debug!("change detected: {:?}", event.kind);
                    settings_tx.send(Event::FileChanged);
                } else {
                    debug!("ignoring unrelated event: {:?}", event.kind);
                }
            }
            Err(err) => warn!("watch error: {err:?}"),
        }
    }

    Ok(())
}

fn is_relevant(file: &PathBuf, event: &notify::Event) -> bool {
    match event.kind {
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
            .paths
            .iter()
            .any(|p| p == file || p.file_name() == file.file_name()),
        _ => false,
    }
}
