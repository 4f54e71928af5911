//! Live, mutable filter parameters.
//!
//! Live params are the GUI-facing side of the model. The GUI itself is an
//! external collaborator reached through two narrow contracts:
//!
//! - [`AdjustmentListener`]: invoked exactly once per committed (triggering)
//!   change, never during silent or view-only updates.
//! - [`ParamView`]: an attached view that must mirror the model value. A
//!   "no trigger" write syncs the view without firing the listener; a
//!   "no view" write (batch replay) touches neither.

use std::f64::consts::PI;
use std::rc::Rc;

use crate::error::TweenkitResult;
use crate::math::{atan2_to_intuitive_degrees, atan2_to_intuitive_radians, intuitive_degrees_to_atan2};
use crate::rng::SmallRng;
use crate::state::{AngleState, ParamValueState, RangeState};

/// Committed-change callback, shared by all params of one filter.
pub type AdjustmentListener = Rc<dyn Fn()>;

/// View-binding hook. Model-level only; no widget types leak in here.
pub trait ParamView {
    fn value_changed(&self, value: f64);
}

/// Common surface of all live parameters.
pub trait FilterParam {
    fn name(&self) -> &str;

    /// Whether this parameter participates in tween animation.
    fn is_animatable(&self) -> bool;

    fn set_adjustment_listener(&mut self, listener: AdjustmentListener);

    /// Captures the current value(s) into an immutable snapshot.
    fn copy_state(&self) -> ParamValueState;

    /// Pushes a snapshot back into the live parameter. With `update_view`
    /// the attached view is synced (listener stays silent); without it the
    /// model updates silently for batch replay.
    fn load_state(&mut self, state: &ParamValueState, update_view: bool);

    /// Parses one token sequence of the session save format.
    fn load_save_string(&mut self, saved: &str) -> TweenkitResult<()>;

    fn randomize(&mut self, rng: &mut SmallRng);

    /// Restores the default value; fires the listener once if `trigger`.
    fn reset(&mut self, trigger: bool);

    fn has_default(&self) -> bool;
}

/// A bounded scalar parameter (one slider).
pub struct RangeParam {
    name: String,
    min: f64,
    max: f64,
    default: f64,
    value: f64,
    listener: Option<AdjustmentListener>,
    view: Option<Rc<dyn ParamView>>,
}

impl RangeParam {
    pub fn new(name: impl Into<String>, min: f64, default: f64, max: f64) -> Self {
        assert!(min < max, "range must be non-empty");
        assert!(
            (min..=max).contains(&default),
            "default outside [min, max]"
        );
        Self {
            name: name.into(),
            min,
            max,
            default,
            value: default,
            listener: None,
            view: None,
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn attach_view(&mut self, view: Rc<dyn ParamView>) {
        self.view = Some(view);
    }

    /// Committed change: clamps, syncs the view, and fires the listener
    /// if `trigger` and the value actually changed.
    pub fn set_value(&mut self, value: f64, trigger: bool) {
        let changed = self.write(value);
        self.sync_view();
        if changed && trigger {
            self.fire();
        }
    }

    /// Updates value and view without firing the listener.
    pub fn set_value_no_trigger(&mut self, value: f64) {
        self.write(value);
        self.sync_view();
    }

    /// Silent batch-replay write: no listener, no view sync.
    pub fn set_value_no_view(&mut self, value: f64) {
        self.write(value);
    }

    /// Distance to the reachable bound, used by group normalization.
    pub(crate) fn room_to_min(&self) -> f64 {
        self.value - self.min
    }

    pub(crate) fn room_to_max(&self) -> f64 {
        self.max - self.value
    }

    fn write(&mut self, value: f64) -> bool {
        let clamped = value.clamp(self.min, self.max);
        let changed = clamped != self.value;
        self.value = clamped;
        changed
    }

    fn sync_view(&self) {
        if let Some(view) = &self.view {
            view.value_changed(self.value);
        }
    }

    fn fire(&self) {
        if let Some(listener) = &self.listener {
            listener();
        }
    }
}

impl FilterParam for RangeParam {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_animatable(&self) -> bool {
        true
    }

    fn set_adjustment_listener(&mut self, listener: AdjustmentListener) {
        self.listener = Some(listener);
    }

    fn copy_state(&self) -> ParamValueState {
        ParamValueState::Range(RangeState(self.value))
    }

    fn load_state(&mut self, state: &ParamValueState, update_view: bool) {
        let ParamValueState::Range(range) = state else {
            panic!("loading a non-range snapshot into '{}'", self.name);
        };
        if update_view {
            self.set_value_no_trigger(range.0);
        } else {
            self.set_value_no_view(range.0);
        }
    }

    fn load_save_string(&mut self, saved: &str) -> TweenkitResult<()> {
        let state = RangeState::parse(saved)?;
        self.set_value_no_trigger(state.0);
        Ok(())
    }

    fn randomize(&mut self, rng: &mut SmallRng) {
        let v = rng.gen_range_f64(self.min, self.max);
        self.set_value_no_trigger(v);
    }

    fn reset(&mut self, trigger: bool) {
        self.set_value(self.default, trigger);
    }

    fn has_default(&self) -> bool {
        self.value == self.default
    }
}

/// An angle parameter. Stores the `atan2` convention internally (-PI..PI,
/// y axis pointing down) and exposes "intuitive" degrees (0..360,
/// counter-clockwise) for snapshots, so interpolating between snapshots
/// reads the way a direction dial does.
pub struct AngleParam {
    name: String,
    /// atan2 radians
    angle: f64,
    default: f64,
    listener: Option<AdjustmentListener>,
    view: Option<Rc<dyn ParamView>>,
}

impl AngleParam {
    pub fn new(name: impl Into<String>, default_radians: f64) -> Self {
        Self {
            name: name.into(),
            angle: default_radians,
            default: default_radians,
            listener: None,
            view: None,
        }
    }

    pub fn attach_view(&mut self, view: Rc<dyn ParamView>) {
        self.view = Some(view);
    }

    /// Sets the raw atan2 angle. The listener is fired on `trigger` even if
    /// the angle did not change: after a run of non-triggering drag events
    /// the committing mouse-up may arrive with the final value already set.
    pub fn set_value(&mut self, radians: f64, trigger: bool) {
        if self.angle != radians {
            self.angle = radians;
            self.sync_view();
        }
        if trigger {
            if let Some(listener) = &self.listener {
                listener();
            }
        }
    }

    pub fn set_value_in_degrees(&mut self, degrees: f64, trigger: bool) {
        self.set_value(intuitive_degrees_to_atan2(degrees), trigger);
    }

    /// The raw atan2 value.
    pub fn value_in_radians(&self) -> f64 {
        self.angle
    }

    /// Intuitive degrees: 0..360, counter-clockwise.
    pub fn value_in_degrees(&self) -> f64 {
        atan2_to_intuitive_degrees(self.angle)
    }

    /// 0..2*PI in the intuitive direction.
    pub fn value_in_intuitive_radians(&self) -> f64 {
        atan2_to_intuitive_radians(self.angle)
    }

    fn sync_view(&self) {
        if let Some(view) = &self.view {
            view.value_changed(self.angle);
        }
    }
}

impl FilterParam for AngleParam {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_animatable(&self) -> bool {
        true
    }

    fn set_adjustment_listener(&mut self, listener: AdjustmentListener) {
        self.listener = Some(listener);
    }

    fn copy_state(&self) -> ParamValueState {
        // Snapshots hold intuitive degrees to keep interpolation intuitive.
        ParamValueState::Angle(AngleState(self.value_in_degrees()))
    }

    fn load_state(&mut self, state: &ParamValueState, update_view: bool) {
        let ParamValueState::Angle(angle) = state else {
            panic!("loading a non-angle snapshot into '{}'", self.name);
        };
        let radians = intuitive_degrees_to_atan2(angle.0);
        if self.angle != radians {
            self.angle = radians;
            if update_view {
                self.sync_view();
            }
        }
    }

    fn load_save_string(&mut self, saved: &str) -> TweenkitResult<()> {
        let state = AngleState::parse(saved)?;
        self.set_value_in_degrees(state.0, false);
        Ok(())
    }

    fn randomize(&mut self, rng: &mut SmallRng) {
        let v = rng.gen_range_f64(-PI, PI);
        self.set_value(v, false);
    }

    fn reset(&mut self, trigger: bool) {
        self.set_value(self.default, trigger);
    }

    fn has_default(&self) -> bool {
        self.angle == self.default
    }
}
