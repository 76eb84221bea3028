//! Modal state carried across a translation
//!
//! The controller keeps every word it has seen until the word is overridden,
//! so a parameter is only written when it would change what the controller
//! already holds. Two comparison classes exist:
//!
//! - tolerant: changed when the two values print differently at 3 fractional
//!   digits (linear/circular positions, drilling-cycle Q-parameters)
//! - exact: raw `f64` equality (feed, speed, arc radius, rapid positions)
//!
//! An unset previous value always counts as changed.

use crate::vocab::CycleParam;

/// Fractional digits kept on output and by the tolerant comparison
pub const PRECISION: i32 = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub feed: Option<f64>,
    pub speed: Option<f64>,
    pub radius: Option<f64>,
    pub cycle: Option<CycleParams>,
    /// Raw end point of the last move, whether or not its words were written
    pub last_point: Option<[f64; 3]>,
}

impl ModalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State right after the positioning rapid to `point`
    pub fn seeded(point: [f64; 3]) -> Self {
        Self {
            x: Some(point[0]),
            y: Some(point[1]),
            z: Some(point[2]),
            last_point: Some(point),
            ..Self::default()
        }
    }
}

/// The eight logical parameters of a drilling cycle definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleParams {
    pub clearance: f64,
    pub feed_to: f64,
    pub plunge_feed: f64,
    pub step: f64,
    pub pre_feed_dwell: f64,
    pub dwell: f64,
    pub surface_z: f64,
    pub retract_delta: f64,
}

impl CycleParams {
    pub fn get(&self, param: CycleParam) -> f64 {
        match param {
            CycleParam::Clearance => self.clearance,
            CycleParam::FeedTo => self.feed_to,
            CycleParam::PlungeFeed => self.plunge_feed,
            CycleParam::Step => self.step,
            CycleParam::PreFeedDwell => self.pre_feed_dwell,
            CycleParam::Dwell => self.dwell,
            CycleParam::SurfaceZ => self.surface_z,
            CycleParam::RetractDelta => self.retract_delta,
        }
    }

    /// True when any parameter differs from `previous` under the tolerant rule
    pub fn differs_from(&self, previous: Option<&CycleParams>) -> bool {
        match previous {
            None => true,
            Some(prev) => CycleParam::ORDER
                .iter()
                .any(|&p| tolerant_changed(self.get(p), Some(prev.get(p)))),
        }
    }
}

/// Tolerant comparison: changed when the values would be written differently
pub fn tolerant_changed(current: f64, previous: Option<f64>) -> bool {
    match previous {
        None => true,
        Some(prev) => format_value(current) != format_value(prev),
    }
}

/// Exact comparison: changed on any raw difference
pub fn exact_changed(current: f64, previous: Option<f64>) -> bool {
    previous != Some(current)
}

/// Render a value with up to 3 fractional digits, trailing zeros and a
/// trailing decimal point stripped.
pub fn format_value(value: f64) -> String {
    let fixed = format!("{:.*}", PRECISION as usize, value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Spindle speeds are written as integers (truncated)
pub fn format_speed(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}
