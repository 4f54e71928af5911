//! A filter's full configurable parameter set.
//!
//! `ParamSet` owns the live params in declaration order; `FilterState` is
//! the ordered snapshot of the animatable subset. The session text format
//! is one `name=tokens` line per animatable parameter.

use crate::error::{TweenkitError, TweenkitResult};
use crate::group::GroupedRangeParam;
use crate::param::{AdjustmentListener, AngleParam, FilterParam, RangeParam};
use crate::rng::SmallRng;
use crate::state::ParamValueState;

/// Union of the live parameter kinds a filter can declare.
pub enum Param {
    Range(RangeParam),
    Angle(AngleParam),
    GroupedRange(GroupedRangeParam),
}

impl Param {
    fn as_filter_param(&self) -> &dyn FilterParam {
        match self {
            Self::Range(p) => p,
            Self::Angle(p) => p,
            Self::GroupedRange(p) => p,
        }
    }

    fn as_filter_param_mut(&mut self) -> &mut dyn FilterParam {
        match self {
            Self::Range(p) => p,
            Self::Angle(p) => p,
            Self::GroupedRange(p) => p,
        }
    }
}

impl FilterParam for Param {
    fn name(&self) -> &str {
        self.as_filter_param().name()
    }

    fn is_animatable(&self) -> bool {
        self.as_filter_param().is_animatable()
    }

    fn set_adjustment_listener(&mut self, listener: AdjustmentListener) {
        self.as_filter_param_mut().set_adjustment_listener(listener);
    }

    fn copy_state(&self) -> ParamValueState {
        self.as_filter_param().copy_state()
    }

    fn load_state(&mut self, state: &ParamValueState, update_view: bool) {
        self.as_filter_param_mut().load_state(state, update_view);
    }

    fn load_save_string(&mut self, saved: &str) -> TweenkitResult<()> {
        self.as_filter_param_mut().load_save_string(saved)
    }

    fn randomize(&mut self, rng: &mut SmallRng) {
        self.as_filter_param_mut().randomize(rng);
    }

    fn reset(&mut self, trigger: bool) {
        self.as_filter_param_mut().reset(trigger);
    }

    fn has_default(&self) -> bool {
        self.as_filter_param().has_default()
    }
}

/// The live parameters of one filter, in declaration order.
pub struct ParamSet {
    params: Vec<Param>,
    listener: Option<AdjustmentListener>,
}

impl ParamSet {
    pub fn new(params: Vec<Param>) -> Self {
        let names: Vec<&str> = params.iter().map(|p| p.name()).collect();
        for (i, name) in names.iter().enumerate() {
            assert!(
                !names[..i].contains(name),
                "duplicate parameter name '{name}'"
            );
        }
        Self {
            params,
            listener: None,
        }
    }

    pub fn set_adjustment_listener(&mut self, listener: AdjustmentListener) {
        for param in &mut self.params {
            param.set_adjustment_listener(listener.clone());
        }
        self.listener = Some(listener);
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Param> {
        self.params.iter_mut().find(|p| p.name() == name)
    }

    /// Snapshots the animatable subset, in declaration order.
    pub fn copy_state(&self) -> FilterState {
        let entries = self
            .params
            .iter()
            .filter(|p| p.is_animatable())
            .map(|p| (p.name().to_string(), p.copy_state()))
            .collect();
        FilterState { entries }
    }

    /// Pushes a snapshot back into the live params. Entry order must match
    /// the declaration order of the animatable subset.
    pub fn load_state_from(&mut self, state: &FilterState, update_view: bool) {
        let mut entries = state.entries.iter();
        for param in &mut self.params {
            if !param.is_animatable() {
                continue;
            }
            let (name, value) = entries
                .next()
                .unwrap_or_else(|| panic!("snapshot missing entry for '{}'", param.name()));
            assert_eq!(name, param.name(), "snapshot entry order mismatch");
            param.load_state(value, update_view);
        }
        assert!(entries.next().is_none(), "snapshot has surplus entries");
    }

    /// Applies a saved session text. Unknown lines are skipped with a
    /// warning so older files with since-removed params still load.
    pub fn load_save_text(&mut self, text: &str) -> TweenkitResult<()> {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (name, tokens) = line
                .split_once('=')
                .ok_or_else(|| TweenkitError::parse(format!("malformed line '{line}'")))?;
            match self.get_mut(name.trim()) {
                Some(param) => param.load_save_string(tokens)?,
                None => tracing::warn!(name = name.trim(), "skipping unknown parameter"),
            }
        }
        Ok(())
    }

    pub fn randomize(&mut self, rng: &mut SmallRng) {
        for param in &mut self.params {
            param.randomize(rng);
        }
    }

    /// Resets every param silently, then fires one aggregate notification.
    pub fn reset(&mut self, trigger: bool) {
        for param in &mut self.params {
            param.reset(false);
        }
        if trigger {
            if let Some(listener) = &self.listener {
                listener();
            }
        }
    }

    pub fn has_default(&self) -> bool {
        self.params.iter().all(Param::has_default)
    }
}

/// Ordered snapshot of a filter's animatable parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FilterState {
    entries: Vec<(String, ParamValueState)>,
}

impl FilterState {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValueState> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Pointwise interpolation. Both snapshots must come from the same
    /// filter: same entries, same order.
    pub fn interpolate(&self, end: &FilterState, progress: f64) -> FilterState {
        assert_eq!(
            self.entries.len(),
            end.entries.len(),
            "interpolating snapshots of different filters"
        );
        let entries = self
            .entries
            .iter()
            .zip(&end.entries)
            .map(|((name, a), (end_name, b))| {
                assert_eq!(name, end_name, "snapshot entry order mismatch");
                (name.clone(), a.interpolate(b, progress))
            })
            .collect();
        FilterState { entries }
    }

    /// One `name=tokens` line per parameter, in snapshot order.
    pub fn to_save_text(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            out.push_str(name);
            out.push('=');
            out.push_str(&value.to_save_string());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AngleState, GroupedRangeState, RangeState};
    use std::cell::Cell;
    use std::rc::Rc;

    fn blur_params() -> ParamSet {
        ParamSet::new(vec![
            Param::Range(RangeParam::new("Radius", 0.0, 10.0, 100.0)),
            Param::Angle(AngleParam::new("Direction", 0.0)),
            Param::GroupedRange(GroupedRangeParam::new("Detail", 0.0, 50.0, 100.0)),
        ])
    }

    #[test]
    fn copy_state_preserves_declaration_order() {
        let set = blur_params();
        let state = set.copy_state();
        assert_eq!(state.len(), 3);
        assert_eq!(state.get("Radius"), Some(&ParamValueState::Range(RangeState(10.0))));
        assert!(matches!(
            state.get("Direction"),
            Some(ParamValueState::Angle(_))
        ));
    }

    #[test]
    fn state_round_trip_through_live_params() {
        let mut set = blur_params();
        if let Some(Param::Range(p)) = set.get_mut("Radius") {
            p.set_value(42.0, false);
        }
        let state = set.copy_state();

        let mut other = blur_params();
        other.load_state_from(&state, false);
        assert_eq!(other.copy_state(), state);
    }

    #[test]
    fn save_text_round_trip() {
        let mut set = blur_params();
        if let Some(Param::Range(p)) = set.get_mut("Radius") {
            p.set_value(42.25, false);
        }
        if let Some(Param::Angle(p)) = set.get_mut("Direction") {
            p.set_value_in_degrees(270.0, false);
        }
        let text = set.copy_state().to_save_text();

        let mut other = blur_params();
        other.load_save_text(&text).unwrap();

        let a = set.copy_state();
        let b = other.copy_state();
        match (a.get("Radius"), b.get("Radius")) {
            (
                Some(ParamValueState::Range(RangeState(x))),
                Some(ParamValueState::Range(RangeState(y))),
            ) => assert!((x - y).abs() < 0.01),
            _ => panic!("missing Radius"),
        }
        match (a.get("Direction"), b.get("Direction")) {
            (
                Some(ParamValueState::Angle(AngleState(x))),
                Some(ParamValueState::Angle(AngleState(y))),
            ) => assert!((x - y).abs() < 0.01),
            _ => panic!("missing Direction"),
        }
    }

    #[test]
    fn save_text_skips_unknown_parameters() {
        let mut set = blur_params();
        set.load_save_text("Radius=5.00\nRemovedParam=1.00\n").unwrap();
        assert_eq!(
            set.copy_state().get("Radius"),
            Some(&ParamValueState::Range(RangeState(5.0)))
        );
    }

    #[test]
    fn save_text_rejects_malformed_lines() {
        let mut set = blur_params();
        assert!(set.load_save_text("Radius 5.00").is_err());
    }

    #[test]
    fn filter_state_interpolation_is_pointwise() {
        let a = FilterState {
            entries: vec![
                ("Radius".into(), ParamValueState::Range(RangeState(0.0))),
                (
                    "Detail".into(),
                    ParamValueState::GroupedRange(GroupedRangeState {
                        values: vec![0.0, 20.0],
                        linked: false,
                    }),
                ),
            ],
        };
        let b = FilterState {
            entries: vec![
                ("Radius".into(), ParamValueState::Range(RangeState(10.0))),
                (
                    "Detail".into(),
                    ParamValueState::GroupedRange(GroupedRangeState {
                        values: vec![10.0, 40.0],
                        linked: false,
                    }),
                ),
            ],
        };

        let mid = a.interpolate(&b, 0.5);
        assert_eq!(mid.get("Radius"), Some(&ParamValueState::Range(RangeState(5.0))));
        assert_eq!(
            mid.get("Detail"),
            Some(&ParamValueState::GroupedRange(GroupedRangeState {
                values: vec![5.0, 30.0],
                linked: false,
            }))
        );
    }

    #[test]
    #[should_panic]
    fn interpolation_rejects_mismatched_filters() {
        let a = FilterState {
            entries: vec![("Radius".into(), ParamValueState::Range(RangeState(0.0)))],
        };
        let b = FilterState {
            entries: vec![("Amount".into(), ParamValueState::Range(RangeState(1.0)))],
        };
        let _ = a.interpolate(&b, 0.5);
    }

    #[test]
    fn reset_fires_one_aggregate_notification() {
        let mut set = blur_params();
        let count = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&count);
        set.set_adjustment_listener(Rc::new(move || c.set(c.get() + 1)));

        if let Some(Param::Range(p)) = set.get_mut("Radius") {
            p.set_value(42.0, true);
        }
        assert_eq!(count.get(), 1);

        set.reset(true);
        assert_eq!(count.get(), 2);
        assert!(set.has_default());
    }

    #[test]
    fn filter_state_json_round_trip() {
        let state = blur_params().copy_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: FilterState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
