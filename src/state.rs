//! Immutable parameter snapshots.
//!
//! A snapshot captures one parameter's value(s) at a point in time. Snapshots
//! are value types: interpolation always produces a fresh snapshot and never
//! touches live parameter storage. The save-string format is the line/token
//! format of the animation session files: `%.2f` numbers, comma separators
//! for grouped values, a trailing `true`/`false` link token.

use crate::error::{TweenkitError, TweenkitResult};
use crate::math::Lerp;

pub trait ParamState: Sized {
    /// Linear blend between `self` (progress 0) and `end` (progress 1).
    /// Pure; returns a new snapshot.
    fn interpolate(&self, end: &Self, progress: f64) -> Self;

    /// Serializes to the textual session format, rounded to 2 decimals.
    fn to_save_string(&self) -> String;
}

/// Snapshot of a single scalar range parameter.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RangeState(pub f64);

impl ParamState for RangeState {
    fn interpolate(&self, end: &Self, progress: f64) -> Self {
        check_progress(progress);
        Self(f64::lerp(&self.0, &end.0, progress))
    }

    fn to_save_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl RangeState {
    pub fn parse(s: &str) -> TweenkitResult<Self> {
        let v: f64 = s
            .trim()
            .parse()
            .map_err(|_| TweenkitError::parse(format!("invalid range value '{s}'")))?;
        Ok(Self(v))
    }
}

/// Snapshot of an angle parameter, stored in intuitive degrees (0..360,
/// counter-clockwise) so that interpolation reads naturally.
///
/// Interpolation is a plain linear blend, deliberately NOT shortest-arc:
/// tweening from 10 to 350 degrees sweeps the long way through 180. A caller
/// animating a near-full rotation must split it into multiple keyframes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AngleState(pub f64);

impl ParamState for AngleState {
    fn interpolate(&self, end: &Self, progress: f64) -> Self {
        check_progress(progress);
        Self(f64::lerp(&self.0, &end.0, progress))
    }

    fn to_save_string(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl AngleState {
    pub fn parse(s: &str) -> TweenkitResult<Self> {
        let v: f64 = s
            .trim()
            .parse()
            .map_err(|_| TweenkitError::parse(format!("invalid angle value '{s}'")))?;
        Ok(Self(v))
    }
}

/// Snapshot of a grouped range parameter: one value per child slider plus
/// the link flag.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupedRangeState {
    pub values: Vec<f64>,
    pub linked: bool,
}

impl ParamState for GroupedRangeState {
    fn interpolate(&self, end: &Self, progress: f64) -> Self {
        check_progress(progress);
        assert_eq!(
            self.values.len(),
            end.values.len(),
            "grouped snapshots with different child counts"
        );
        // The link flag is not time-varying: the end state's flag wins.
        Self {
            values: <Vec<f64> as Lerp>::lerp(&self.values, &end.values, progress),
            linked: end.linked,
        }
    }

    fn to_save_string(&self) -> String {
        let mut s = String::new();
        for value in &self.values {
            s.push_str(&format!("{value:.2},"));
        }
        s.push_str(if self.linked { "true" } else { "false" });
        s
    }
}

impl GroupedRangeState {
    /// Parses `child_count` comma-separated values followed by an optional
    /// link token. Legacy files omit the token; `default_linked` applies.
    pub fn parse(s: &str, child_count: usize, default_linked: bool) -> TweenkitResult<Self> {
        let mut tokens = s.split(',').map(str::trim);

        let mut values = Vec::with_capacity(child_count);
        for i in 0..child_count {
            let token = tokens.next().ok_or_else(|| {
                TweenkitError::parse(format!("expected {child_count} values, found {i}"))
            })?;
            let v: f64 = token
                .parse()
                .map_err(|_| TweenkitError::parse(format!("invalid group value '{token}'")))?;
            values.push(v);
        }

        let linked = match tokens.next() {
            None | Some("") => default_linked,
            Some(token) => match token.to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(TweenkitError::parse(format!("invalid link token '{other}'")));
                }
            },
        };

        Ok(Self { values, linked })
    }
}

/// Tagged union over the snapshot variants, used where a filter's whole
/// configuration is handled uniformly (tweening, persistence).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParamValueState {
    Range(RangeState),
    Angle(AngleState),
    GroupedRange(GroupedRangeState),
}

impl ParamValueState {
    /// Variant-checked interpolation. Mixing variants is a programming
    /// error and fails fast.
    pub fn interpolate(&self, end: &Self, progress: f64) -> Self {
        match (self, end) {
            (Self::Range(a), Self::Range(b)) => Self::Range(a.interpolate(b, progress)),
            (Self::Angle(a), Self::Angle(b)) => Self::Angle(a.interpolate(b, progress)),
            (Self::GroupedRange(a), Self::GroupedRange(b)) => {
                Self::GroupedRange(a.interpolate(b, progress))
            }
            _ => panic!("interpolating snapshots of different variants"),
        }
    }

    pub fn to_save_string(&self) -> String {
        match self {
            Self::Range(s) => s.to_save_string(),
            Self::Angle(s) => s.to_save_string(),
            Self::GroupedRange(s) => s.to_save_string(),
        }
    }
}

fn check_progress(progress: f64) {
    assert!(
        (0.0..=1.0).contains(&progress),
        "progress {progress} outside [0,1]"
    );
}
