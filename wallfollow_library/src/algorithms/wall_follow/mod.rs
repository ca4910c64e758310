//! Wall-follow controller
//!
//! Keeps a stand-off distance from a wall using one forward range reading
//! and escapes corners with a timed reverse-then-forward maneuver.
//!
//! The controller is driven by two input events and answers each with a
//! [`Decision`]:
//!
//! - [`on_sample`](WallFollowController::on_sample) for every range sample
//! - [`on_tick`](WallFollowController::on_tick) for every escape timer tick
//!
//! It never touches transport or timers itself. A decision asks the host to
//! arm or cancel the escape timer, naming the session it belongs to; the
//! host owns the timer handle.
//!
//! While a corner escape runs, the controller is sensor-blind: samples are
//! ignored until the maneuver has completed.

pub mod escape;

pub use escape::{EscapePhase, EscapeSession, EscapeTiming, SessionId};

use crate::algorithms::range_classifier::{InvalidSample, RangeClassifier, Zone, ZoneBands};
use crate::messages::{CmdVel, RangeSample};
use std::fmt;

/// Top-level controller mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    NormalFollow,
    CornerEscape,
}

/// Cruise and turn speeds the command table is built from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    pub forward_speed: f32, // m/s
    pub turn_speed: f32,    // rad/s
}

/// Persistent controller state
///
/// Mode, phase and deadline all derive from the optional escape session, so
/// a phase exists exactly when the mode is [`Mode::CornerEscape`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerState {
    escape: Option<EscapeSession>,
}

impl ControllerState {
    pub fn mode(&self) -> Mode {
        match self.escape {
            Some(_) => Mode::CornerEscape,
            None => Mode::NormalFollow,
        }
    }

    pub fn escape_phase(&self) -> Option<EscapePhase> {
        self.escape.as_ref().map(EscapeSession::phase)
    }

    pub fn phase_deadline(&self) -> Option<f64> {
        self.escape.as_ref().map(EscapeSession::deadline)
    }

    pub fn session(&self) -> Option<&EscapeSession> {
        self.escape.as_ref()
    }
}

/// What the host should do with the escape timer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerRequest {
    Keep,
    Arm { session: SessionId, period_secs: f64 },
    Cancel { session: SessionId },
}

/// What happened on one invocation, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// A steering command was produced for a valid sample
    Steer { zone: Zone, distance: f32 },
    /// The sample could not be used
    Invalid(InvalidSample),
    /// The sample arrived during a corner escape
    Ignored,
    /// A corner was detected and the escape session armed
    EscapeStarted { session: SessionId, distance: f32 },
    /// A command for the ongoing escape phase was produced
    EscapeStep { phase: EscapePhase },
    /// Reversing expired; driving forward from the next tick
    ReverseComplete,
    /// The maneuver finished and normal following resumes
    EscapeComplete { session: SessionId },
    /// A timer tick arrived with no escape running
    StaleTick,
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlEvent::Steer { zone, distance } => match zone {
                Zone::TooClose => write!(f, "Too close ({:.2}), turning RIGHT", distance),
                Zone::TooFar => write!(f, "Too far ({:.2}), turning LEFT", distance),
                Zone::OnTarget => write!(f, "Good distance ({:.2}), going STRAIGHT", distance),
                Zone::CornerThreat => write!(f, "Corner ahead ({:.2})", distance),
            },
            ControlEvent::Invalid(reason) => write!(f, "{}", reason),
            ControlEvent::Ignored => f.write_str("Sample ignored during corner escape"),
            ControlEvent::EscapeStarted { session, distance } => {
                write!(f, "CORNER AVOID ({:.2}), starting {}", distance, session)
            }
            ControlEvent::EscapeStep { phase } => match phase {
                EscapePhase::Reversing => f.write_str("Reversing right during corner escape"),
                EscapePhase::DrivingForward => {
                    f.write_str("Driving forward after corner escape")
                }
            },
            ControlEvent::ReverseComplete => {
                f.write_str("Finished reversing, now driving FORWARD")
            }
            ControlEvent::EscapeComplete { session } => write!(f, "Corner complete ({})", session),
            ControlEvent::StaleTick => f.write_str("Escape tick without an active escape"),
        }
    }
}

/// Result of one controller invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub command: Option<CmdVel>,
    pub timer: TimerRequest,
    pub event: ControlEvent,
}

impl Decision {
    fn command(command: CmdVel, event: ControlEvent) -> Self {
        Self {
            command: Some(command),
            timer: TimerRequest::Keep,
            event,
        }
    }

    fn silent(event: ControlEvent) -> Self {
        Self {
            command: None,
            timer: TimerRequest::Keep,
            event,
        }
    }
}

/// Wall-following controller with corner escape
#[derive(Debug, Clone)]
pub struct WallFollowController {
    classifier: RangeClassifier,
    speeds: SpeedProfile,
    timing: EscapeTiming,
    state: ControllerState,
    next_session: u64,
}

impl WallFollowController {
    /// Create a controller in normal-follow mode
    pub fn new(bands: ZoneBands, speeds: SpeedProfile, timing: EscapeTiming) -> Self {
        Self {
            classifier: RangeClassifier::new(bands),
            speeds,
            timing,
            state: ControllerState::default(),
            next_session: 1,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn escape_phase(&self) -> Option<EscapePhase> {
        self.state.escape_phase()
    }

    pub fn phase_deadline(&self) -> Option<f64> {
        self.state.phase_deadline()
    }

    pub fn bands(&self) -> &ZoneBands {
        self.classifier.bands()
    }

    pub fn timing(&self) -> &EscapeTiming {
        &self.timing
    }

    pub fn speeds(&self) -> &SpeedProfile {
        &self.speeds
    }

    /// Handle one range sample received at `now`.
    pub fn on_sample(&mut self, sample: RangeSample, now: f64) -> Decision {
        if self.state.escape.is_some() {
            return Decision::silent(ControlEvent::Ignored);
        }

        let zone = match self.classifier.classify(sample) {
            Ok(zone) => zone,
            Err(reason) => {
                tracing::debug!("{}", reason);
                return Decision::silent(ControlEvent::Invalid(reason));
            }
        };

        let distance = sample.distance;
        let SpeedProfile {
            forward_speed,
            turn_speed,
        } = self.speeds;

        let command = match zone {
            Zone::CornerThreat => return self.begin_escape(distance, now),
            // Too close: veer right
            Zone::TooClose => CmdVel::new(forward_speed / 2.0, -turn_speed),
            // Too far: veer left, gentler than the right turn
            Zone::TooFar => CmdVel::new(forward_speed / 2.0, turn_speed / 3.0),
            Zone::OnTarget => CmdVel::new(forward_speed, 0.0),
        };

        let event = ControlEvent::Steer { zone, distance };
        tracing::debug!("{} -> {}", event, command);
        Decision::command(command, event)
    }

    /// Handle a scan that carried no forward beam.
    pub fn on_empty_scan(&mut self) -> Decision {
        if self.state.escape.is_some() {
            return Decision::silent(ControlEvent::Ignored);
        }
        tracing::debug!("{}", InvalidSample::EmptyScan);
        Decision::silent(ControlEvent::Invalid(InvalidSample::EmptyScan))
    }

    /// Handle one escape timer tick at `now`.
    pub fn on_tick(&mut self, now: f64) -> Decision {
        let Some(session) = self.state.escape.as_mut() else {
            return Decision::silent(ControlEvent::StaleTick);
        };

        let SpeedProfile {
            forward_speed,
            turn_speed,
        } = self.speeds;

        match session.phase() {
            EscapePhase::Reversing if session.is_expired(now) => {
                session.enter_forward_phase(now, &self.timing);
                tracing::debug!(
                    "Finished reversing, driving forward until {:.2}",
                    session.deadline()
                );
                Decision::silent(ControlEvent::ReverseComplete)
            }
            EscapePhase::Reversing => Decision::command(
                CmdVel::new(-forward_speed, -turn_speed),
                ControlEvent::EscapeStep {
                    phase: EscapePhase::Reversing,
                },
            ),
            EscapePhase::DrivingForward if session.is_expired(now) => {
                let id = session.id();
                self.state.escape = None;
                tracing::debug!("Corner complete ({}), resuming wall following", id);
                Decision {
                    command: None,
                    timer: TimerRequest::Cancel { session: id },
                    event: ControlEvent::EscapeComplete { session: id },
                }
            }
            EscapePhase::DrivingForward => Decision::command(
                CmdVel::new(forward_speed / 2.0, -turn_speed),
                ControlEvent::EscapeStep {
                    phase: EscapePhase::DrivingForward,
                },
            ),
        }
    }

    fn begin_escape(&mut self, distance: f32, now: f64) -> Decision {
        let id = SessionId(self.next_session);
        self.next_session += 1;

        let session = EscapeSession::begin(id, now, &self.timing);
        tracing::debug!(
            "CORNER AVOID at {:.2}m, reversing until {:.2}",
            distance,
            session.deadline()
        );
        self.state.escape = Some(session);

        Decision {
            command: None,
            timer: TimerRequest::Arm {
                session: id,
                period_secs: self.timing.tick_period_secs,
            },
            event: ControlEvent::EscapeStarted {
                session: id,
                distance,
            },
        }
    }
}
