//! Collaborator interface to the daemon owning the accelerometer.
//!
//! The shell never talks to the hardware directly: it asks the daemon to
//! claim or release the accelerometer and listens for reading changes. Both
//! requests are non-blocking; their outcome arrives later as a
//! [`SensorReply`] event on the requester's own loop.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Raw orientation reading reported by the sensor daemon.
///
/// Parsed from the daemon's wire strings ("normal", "right-up", ...);
/// anything else fails to parse and is treated as an unknown reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Orientation {
    Normal,
    RightUp,
    BottomUp,
    LeftUp,
    /// The daemon cannot tell (device lying flat, sensor settling).
    Undefined,
}

/// Quarter-turn screen rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Transform {
    pub fn degrees(self) -> u16 {
        match self {
            Transform::Normal => 0,
            Transform::Rotate90 => 90,
            Transform::Rotate180 => 180,
            Transform::Rotate270 => 270,
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor daemon rejected the request: {0}")]
    Rejected(String),
    #[error("sensor daemon unreachable: {0}")]
    Unreachable(String),
}

/// Outcome of an asynchronous claim or release request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorReply {
    ClaimFinished(Result<(), SensorError>),
    ReleaseFinished(Result<(), SensorError>),
}

/// Handle to the sensor daemon.
///
/// `claim_accelerometer` and `release_accelerometer` return immediately; the
/// daemon's answer is delivered to the caller as a [`SensorReply`] event, so
/// at most one request should be outstanding per caller.
pub trait SensorProxy {
    fn claim_accelerometer(&mut self);
    fn release_accelerometer(&mut self);
    /// Best-effort synchronous release for teardown, when there is no loop
    /// left to deliver a reply to.
    fn release_accelerometer_blocking(&mut self);
}

/// Stand-in proxy for running without a sensor daemon: every request is
/// granted immediately by looping a success reply back to the caller.
pub struct LoopbackSensor {
    replies: crate::actor::Sender<crate::actor::rotation::Event>,
}

impl LoopbackSensor {
    pub fn new(replies: crate::actor::Sender<crate::actor::rotation::Event>) -> Self {
        Self { replies }
    }

    fn reply(&self, reply: SensorReply) {
        self.replies.send(crate::actor::rotation::Event::SensorReply(reply));
    }
}

impl SensorProxy for LoopbackSensor {
    fn claim_accelerometer(&mut self) { self.reply(SensorReply::ClaimFinished(Ok(()))); }

    fn release_accelerometer(&mut self) { self.reply(SensorReply::ReleaseFinished(Ok(()))); }

    fn release_accelerometer_blocking(&mut self) {}
}
