//! Reconciles the accelerometer reading, the orientation-lock setting and
//! the lockscreen state into the screen transform, holding a claim on the
//! sensor only while the reading can actually be used.

use tracing::{debug, info, instrument, warn};

use crate::actor::broadcast::{BroadcastSender, ShellEvent};
use crate::actor::settings;
use crate::sys::sensor::{Orientation, SensorProxy, SensorReply, Transform};

pub type Sender = crate::actor::Sender<Event>;
pub type Receiver = crate::actor::Receiver<Event>;

#[derive(Debug)]
pub enum Event {
    /// Raw `accelerometer-orientation` reading from the daemon.
    OrientationChanged(String),
    /// The daemon's `has-accelerometer` signal.
    AccelerometerPresent(bool),
    LockscreenLocked(bool),
    /// The lock was toggled from inside the shell; persisted back to the
    /// settings file.
    SetOrientationLocked(bool),
    ToggleOrientationLocked,
    /// The persisted `orientation-lock` setting changed externally.
    SettingsChanged { orientation_lock: bool },
    SensorReply(SensorReply),
}

/// Claim handshake with the sensor daemon.
///
/// The two pending states double as the in-flight-request flag: while one of
/// them is current no further request is issued, and the desired claim state
/// is re-evaluated when the daemon answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimState {
    SensorReleased,
    ClaimPending,
    SensorClaimed,
    ReleasePending,
}

/// Whether sensor-driven rotation is possible. `Off` (no accelerometer)
/// leaves the user with the manual toggle; it is a mode, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    #[default]
    Off,
    Sensor,
}

pub struct Rotation<P: SensorProxy> {
    proxy: P,
    receiver: Receiver,
    broadcast: BroadcastSender,
    settings_tx: settings::Sender,
    claim: ClaimState,
    mode: RotationMode,
    orientation_locked: bool,
    lockscreen_locked: bool,
    last_reading: Option<Orientation>,
    transform: Option<Transform>,
}

impl<P: SensorProxy> Rotation<P> {
    pub fn new(
        proxy: P,
        orientation_locked: bool,
        broadcast: BroadcastSender,
        settings_tx: settings::Sender,
        receiver: Receiver,
    ) -> Self {
        Self {
            proxy,
            receiver,
            broadcast,
            settings_tx,
            claim: ClaimState::SensorReleased,
            mode: RotationMode::default(),
            orientation_locked,
            lockscreen_locked: false,
            last_reading: None,
            transform: None,
        }
    }

    pub async fn run(mut self) {
        while let Some((span, event)) = self.receiver.recv().await {
            let _guard = span.enter();
            self.handle_event(event);
        }
    }

    /// Transform last applied; 0° until a reading has ever been matched.
    pub fn transform(&self) -> Transform { self.transform.unwrap_or_default() }

    pub fn claim_state(&self) -> ClaimState { self.claim }

    pub fn mode(&self) -> RotationMode { self.mode }

    pub fn orientation_locked(&self) -> bool { self.orientation_locked }

    #[instrument(name = "rotation::handle_event", skip(self))]
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::OrientationChanged(reading) => self.on_orientation_changed(&reading),
            Event::AccelerometerPresent(present) => self.on_accelerometer_present(present),
            Event::LockscreenLocked(locked) => self.on_lockscreen_locked(locked),
            Event::SetOrientationLocked(locked) => self.set_orientation_locked(locked, true),
            Event::ToggleOrientationLocked => {
                self.set_orientation_locked(!self.orientation_locked, true)
            }
            Event::SettingsChanged { orientation_lock } => {
                self.set_orientation_locked(orientation_lock, false)
            }
            Event::SensorReply(reply) => self.on_sensor_reply(reply),
        }
    }

    fn on_orientation_changed(&mut self, reading: &str) {
        match reading.parse::<Orientation>() {
            Ok(orientation) => {
                debug!(%orientation, "orientation changed");
                self.last_reading = Some(orientation);
                self.match_orientation();
            }
            // Leave the transform as is; the daemon may grow new readings.
            Err(_) => warn!(reading, "unknown accelerometer orientation"),
        }
    }

    fn on_accelerometer_present(&mut self, present: bool) {
        let mode = if present { RotationMode::Sensor } else { RotationMode::Off };
        if mode == self.mode {
            return;
        }
        debug!(?mode, "accelerometer presence changed");
        self.mode = mode;
        self.broadcast.send(ShellEvent::AutoRotateAvailable { available: present });
        self.reconcile();
    }

    fn on_lockscreen_locked(&mut self, locked: bool) {
        if locked == self.lockscreen_locked {
            return;
        }
        debug!(locked, "lockscreen state changed");
        self.lockscreen_locked = locked;
        self.reconcile();
        if !locked {
            // Re-sync to the reading the sensor settled on while we were
            // not allowed to rotate.
            self.match_orientation();
        }
    }

    fn set_orientation_locked(&mut self, locked: bool, persist: bool) {
        if locked == self.orientation_locked {
            return;
        }
        debug!(locked, "orientation lock changed");
        self.orientation_locked = locked;
        if persist {
            self.settings_tx.send(settings::Event::SetOrientationLock(locked));
        }
        self.broadcast.send(ShellEvent::OrientationLockChanged { locked });
        self.match_orientation();
    }

    fn desired_claim(&self) -> bool {
        // No sensor access while the device is locked, saves power.
        !self.lockscreen_locked && self.mode == RotationMode::Sensor
    }

    fn reconcile(&mut self) {
        let want = self.desired_claim();
        match self.claim {
            ClaimState::SensorReleased if want => {
                debug!("claiming accelerometer");
                self.claim = ClaimState::ClaimPending;
                self.proxy.claim_accelerometer();
            }
            ClaimState::SensorClaimed if !want => {
                debug!("releasing accelerometer");
                self.claim = ClaimState::ReleasePending;
                self.proxy.release_accelerometer();
            }
            // A request is in flight; re-evaluated when the reply arrives.
            _ => {}
        }
    }

    fn on_sensor_reply(&mut self, reply: SensorReply) {
        match reply {
            SensorReply::ClaimFinished(result) => {
                if self.claim != ClaimState::ClaimPending {
                    warn!(state = ?self.claim, "stray claim reply");
                    return;
                }
                match result {
                    Ok(()) => {
                        debug!("claimed accelerometer");
                        self.claim = ClaimState::SensorClaimed;
                        self.match_orientation();
                        // Inputs may have flipped while the claim was in
                        // flight.
                        self.reconcile();
                    }
                    Err(err) => {
                        // Not retried; the next lock/unlock or presence
                        // change attempts a fresh claim.
                        warn!(%err, "failed to claim accelerometer");
                        self.claim = ClaimState::SensorReleased;
                    }
                }
            }
            SensorReply::ReleaseFinished(result) => {
                if self.claim != ClaimState::ReleasePending {
                    warn!(state = ?self.claim, "stray release reply");
                    return;
                }
                match result {
                    Ok(()) => debug!("released accelerometer"),
                    // Best effort; the daemon drops stale claims on its own.
                    Err(err) => warn!(%err, "failed to release accelerometer"),
                }
                self.claim = ClaimState::SensorReleased;
                self.reconcile();
            }
        }
    }

    /// Match the screen transform to the sensor reading. No-op while the
    /// orientation is locked, while the lockscreen is up, or without a
    /// claimed sensor.
    fn match_orientation(&mut self) {
        if self.orientation_locked
            || self.lockscreen_locked
            || self.claim != ClaimState::SensorClaimed
        {
            return;
        }
        let Some(reading) = self.last_reading else {
            return;
        };
        let transform = match reading {
            Orientation::Normal => Transform::Normal,
            Orientation::RightUp => Transform::Rotate90,
            Orientation::BottomUp => Transform::Rotate180,
            Orientation::LeftUp => Transform::Rotate270,
            // The sensor cannot tell; keep whatever we had.
            Orientation::Undefined => return,
        };
        if self.transform() == transform {
            // The visible transform is already right; just record the match.
            self.transform = Some(transform);
            return;
        }
        info!(%transform, "rotating");
        self.transform = Some(transform);
        self.broadcast.send(ShellEvent::TransformChanged { transform });
    }

    fn release_on_teardown(&mut self) {
        if matches!(self.claim, ClaimState::SensorClaimed | ClaimState::ClaimPending) {
            debug!("releasing accelerometer on teardown");
            self.proxy.release_accelerometer_blocking();
            self.claim = ClaimState::SensorReleased;
        }
    }
}

impl<P: SensorProxy> Drop for Rotation<P> {
    fn drop(&mut self) {
        // The event loop is gone at this point, so the async handshake is
        // not an option anymore; release synchronously, best effort.
        self.release_on_teardown();
    }
}
