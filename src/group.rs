//! Grouped range parameters: N sliders that either move together (linked)
//! or keep their sum at 100 (auto-normalized). The two modes are mutually
//! exclusive on one group.
//!
//! Sibling coordination is an explicit propagation step performed by the
//! owning group on every committed child write. There is no listener graph
//! between children, so a correction pass cannot notify itself into a storm;
//! the `normalizing` flag remains as a guard against re-entering the group
//! API while a correction is in flight.

use std::rc::Rc;

use crate::error::TweenkitResult;
use crate::param::{AdjustmentListener, FilterParam, ParamView, RangeParam};
use crate::rng::SmallRng;
use crate::state::{GroupedRangeState, ParamValueState};

pub struct GroupedRangeParam {
    name: String,
    children: Vec<RangeParam>,
    linked: bool,
    linked_by_default: bool,
    linkable: bool,
    auto_normalizable: bool,
    auto_normalization_enabled: bool,
    normalizing: bool,
    listener: Option<AdjustmentListener>,
}

impl GroupedRangeParam {
    /// Two linked children, "Horizontal" and "Vertical", sharing one range.
    pub fn new(name: impl Into<String>, min: f64, default: f64, max: f64) -> Self {
        Self::with_link(name, min, default, max, true)
    }

    pub fn with_link(
        name: impl Into<String>,
        min: f64,
        default: f64,
        max: f64,
        linked: bool,
    ) -> Self {
        Self::with_child_names(name, &["Horizontal", "Vertical"], min, default, max, linked)
    }

    /// Any number of children sharing one range.
    pub fn with_child_names(
        name: impl Into<String>,
        child_names: &[&str],
        min: f64,
        default: f64,
        max: f64,
        linked: bool,
    ) -> Self {
        let children = child_names
            .iter()
            .map(|n| RangeParam::new(*n, min, default, max))
            .collect();
        Self::from_children(name, children, linked)
    }

    /// The most generic constructor: children may differ in their ranges.
    /// Linking only makes sense when the ranges match.
    pub fn from_children(
        name: impl Into<String>,
        children: Vec<RangeParam>,
        linked: bool,
    ) -> Self {
        assert!(children.len() >= 2, "a group needs at least two children");
        Self {
            name: name.into(),
            children,
            linked,
            linked_by_default: linked,
            linkable: true,
            auto_normalizable: false,
            auto_normalization_enabled: false,
            normalizing: false,
            listener: None,
        }
    }

    /// Keeps the sum of the children at 100 so they can be read as
    /// percentages. Mutually exclusive with linking.
    pub fn auto_normalized(mut self) -> Self {
        assert!(!self.linked_by_default, "a normalized group cannot be linked");
        assert!(
            self.sum_of_values() == 100.0,
            "initial values of a normalized group must sum to 100"
        );
        self.linkable = false;
        self.linked = false;
        self.auto_normalizable = true;
        self.auto_normalization_enabled = true;
        self
    }

    pub fn not_linkable(mut self) -> Self {
        self.linkable = false;
        self.linked = false;
        self
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    pub fn child(&self, index: usize) -> &RangeParam {
        &self.children[index]
    }

    pub fn value(&self, index: usize) -> f64 {
        self.children[index].value()
    }

    pub fn attach_child_view(&mut self, index: usize, view: Rc<dyn ParamView>) {
        self.children[index].attach_view(view);
    }

    pub fn is_linked(&self) -> bool {
        self.linkable && self.linked
    }

    pub fn is_linkable(&self) -> bool {
        self.linkable
    }

    pub fn set_linked(&mut self, linked: bool) {
        if self.linkable {
            self.linked = linked;
        }
    }

    pub fn is_auto_normalization_enabled(&self) -> bool {
        self.auto_normalization_enabled
    }

    pub fn set_auto_normalization_enabled(&mut self, enable: bool, force: bool) {
        assert!(self.auto_normalizable, "group is not auto-normalizable");
        if !self.auto_normalization_enabled && enable && force {
            self.normalize_now();
        }
        self.auto_normalization_enabled = enable;
    }

    /// Committed change of one child. Linked propagation or normalization
    /// runs first; the group listener fires at most once.
    pub fn set_value(&mut self, index: usize, value: f64, trigger: bool) {
        assert!(!self.normalizing, "re-entrant group mutation");

        let before = self.children[index].value();
        self.children[index].set_value_no_trigger(value);
        let changed = self.children[index].value() != before;

        if self.is_linked() {
            self.propagate_link(index);
        } else if changed && self.auto_normalization_enabled {
            self.auto_normalize(index);
        }

        if changed && trigger {
            self.fire();
        }
    }

    /// Mirrors the source child's value to every sibling with
    /// non-triggering writes.
    fn propagate_link(&mut self, source: usize) {
        let value = self.children[source].value();
        for (i, child) in self.children.iter_mut().enumerate() {
            if i != source {
                child.set_value_no_trigger(value);
            }
        }
    }

    /// Weighted-move correction: the siblings absorb `sum - 100`
    /// proportionally to the room they have left in the needed direction,
    /// so a slider near its bound moves less. When no sibling has any room
    /// left the correction falls back to an equal split, clamped to each
    /// child's range (the invariant may then be unreachable; the values are
    /// left clamped).
    fn auto_normalize(&mut self, source: usize) {
        self.normalizing = true;

        let diff = self.sum_of_values() - 100.0;
        if diff == 0.0 {
            self.normalizing = false;
            return;
        }
        tracing::trace!(group = %self.name, diff, "normalizing");

        // Room depends on the direction: the siblings have to shrink when
        // the sum is too big, grow when it is too small.
        let room = |child: &RangeParam| {
            if diff > 0.0 {
                child.room_to_min()
            } else {
                child.room_to_max()
            }
        };

        // first pass: total room available among the siblings
        let mut sum_of_spaces_left = 0.0;
        for (i, child) in self.children.iter().enumerate() {
            if i != source {
                sum_of_spaces_left += room(child);
            }
        }

        // second pass: distribute the difference
        if sum_of_spaces_left == 0.0 {
            let correction = diff / (self.children.len() - 1) as f64;
            for (i, child) in self.children.iter_mut().enumerate() {
                if i != source {
                    let new_value = child.value() - correction;
                    child.set_value_no_trigger(new_value);
                }
            }
        } else {
            for (i, child) in self.children.iter_mut().enumerate() {
                if i != source {
                    let space_left = if diff > 0.0 {
                        child.room_to_min()
                    } else {
                        child.room_to_max()
                    };
                    let correction = diff * space_left / sum_of_spaces_left;
                    let new_value = child.value() - correction;
                    child.set_value_no_trigger(new_value);
                }
            }
        }

        self.normalizing = false;
    }

    /// Equal-split correction, used when normalization is force re-enabled
    /// after being off.
    fn normalize_now(&mut self) {
        let diff = self.sum_of_values() - 100.0;
        if diff != 0.0 {
            let correction = diff / self.children.len() as f64;
            for child in &mut self.children {
                let new_value = child.value() - correction;
                child.set_value_no_trigger(new_value);
            }
        }
    }

    pub fn sum_of_values(&self) -> f64 {
        self.children.iter().map(RangeParam::value).sum()
    }

    fn fire(&self) {
        if let Some(listener) = &self.listener {
            listener();
        }
    }
}

impl FilterParam for GroupedRangeParam {
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
        let values = self.children.iter().map(RangeParam::value).collect();
        ParamValueState::GroupedRange(GroupedRangeState {
            values,
            linked: self.is_linked(),
        })
    }

    fn load_state(&mut self, state: &ParamValueState, update_view: bool) {
        let ParamValueState::GroupedRange(gr) = state else {
            panic!("loading a non-group snapshot into '{}'", self.name);
        };
        assert_eq!(
            gr.values.len(),
            self.children.len(),
            "snapshot child count mismatch for '{}'",
            self.name
        );

        let was_normalized = self.auto_normalization_enabled;
        self.auto_normalization_enabled = false;

        // the link flag has to be set before the values
        self.set_linked(gr.linked);
        for (child, &value) in self.children.iter_mut().zip(&gr.values) {
            if update_view {
                child.set_value_no_trigger(value);
            } else {
                child.set_value_no_view(value);
            }
        }

        self.auto_normalization_enabled = was_normalized;
    }

    fn load_save_string(&mut self, saved: &str) -> TweenkitResult<()> {
        let state =
            GroupedRangeState::parse(saved, self.children.len(), self.linked_by_default)?;
        self.load_state(&ParamValueState::GroupedRange(state), true);
        Ok(())
    }

    fn randomize(&mut self, rng: &mut SmallRng) {
        if self.is_linked() {
            // one write, mirrored by the link propagation
            self.children[0].randomize(rng);
            self.propagate_link(0);
        } else {
            // independent children; a sum-to-100 invariant is deliberately
            // not preserved here, callers re-normalize if they need it
            for child in &mut self.children {
                child.randomize(rng);
            }
        }
    }

    fn reset(&mut self, trigger: bool) {
        // bulk reset must not pay a cross-correction per child
        let was_normalized = self.auto_normalization_enabled;
        self.auto_normalization_enabled = false;

        for child in &mut self.children {
            child.reset(false);
        }

        // exactly one aggregate notification
        if trigger {
            self.fire();
        }

        self.linked = self.linked_by_default;
        self.auto_normalization_enabled = was_normalized;
    }

    fn has_default(&self) -> bool {
        if self.is_linked() != (self.linkable && self.linked_by_default) {
            return false;
        }
        self.children.iter().all(RangeParam::has_default)
    }
}
