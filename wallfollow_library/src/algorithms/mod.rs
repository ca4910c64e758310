//! Control algorithms
//!
//! - `range_classifier`: forward range reading to distance zone
//! - `wall_follow`: the wall-follow controller and its corner escape

pub mod range_classifier;
pub mod wall_follow;

pub use range_classifier::{InvalidSample, RangeClassifier, Zone, ZoneBands};
pub use wall_follow::{
    ControlEvent, ControllerState, Decision, EscapePhase, EscapeSession, EscapeTiming, Mode,
    SessionId, SpeedProfile, TimerRequest, WallFollowController,
};
