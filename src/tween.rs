//! Tween animation between two filter-parameter snapshots, and the staged
//! session that collects them.
//!
//! A session walks a fixed stage order: select the filter, adjust and commit
//! the initial settings, adjust and commit the final settings, then the
//! output settings. Each commit validates the stage it belongs to; out of
//! order commits are refused. The GUI pages driving a session, and the
//! renderer consuming the interpolated states, are external collaborators.

use crate::error::{TweenkitError, TweenkitResult};
use crate::paramset::{FilterState, ParamSet};

/// Two keyframe snapshots plus the frame count between them.
#[derive(Clone, Debug, Default)]
pub struct TweenAnimation {
    initial: Option<FilterState>,
    final_state: Option<FilterState>,
    num_frames: u64,
}

impl TweenAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember_initial_state(&mut self, params: &ParamSet) {
        self.initial = Some(params.copy_state());
    }

    pub fn remember_final_state(&mut self, params: &ParamSet) {
        self.final_state = Some(params.copy_state());
    }

    pub fn initial_state(&self) -> Option<&FilterState> {
        self.initial.as_ref()
    }

    pub fn final_state(&self) -> Option<&FilterState> {
        self.final_state.as_ref()
    }

    pub fn set_num_frames(&mut self, num_frames: u64) -> TweenkitResult<()> {
        if num_frames < 2 {
            return Err(TweenkitError::validation(
                "a tween needs at least 2 frames",
            ));
        }
        self.num_frames = num_frames;
        Ok(())
    }

    pub fn num_frames(&self) -> u64 {
        self.num_frames
    }

    /// Progress of `frame` in [0,1]; frame 0 is the initial snapshot, the
    /// last frame is the final snapshot.
    pub fn progress_for_frame(&self, frame: u64) -> TweenkitResult<f64> {
        if self.num_frames < 2 {
            return Err(TweenkitError::validation("frame count not configured"));
        }
        if frame >= self.num_frames {
            return Err(TweenkitError::validation(format!(
                "frame {frame} out of range (num_frames = {})",
                self.num_frames
            )));
        }
        Ok(frame as f64 / (self.num_frames - 1) as f64)
    }

    /// The interpolated snapshot for one frame. Pure; no live params are
    /// touched.
    pub fn interpolated_state(&self, frame: u64) -> TweenkitResult<FilterState> {
        let initial = self
            .initial
            .as_ref()
            .ok_or_else(|| TweenkitError::validation("initial state not captured"))?;
        let final_state = self
            .final_state
            .as_ref()
            .ok_or_else(|| TweenkitError::validation("final state not captured"))?;
        let progress = self.progress_for_frame(frame)?;
        Ok(initial.interpolate(final_state, progress))
    }

    /// Pushes the interpolated snapshot for one frame into the live params,
    /// silently (batch replay: no listener, no view sync).
    #[tracing::instrument(skip(self, params))]
    pub fn apply_frame(&self, frame: u64, params: &mut ParamSet) -> TweenkitResult<()> {
        let state = self.interpolated_state(frame)?;
        params.load_state_from(&state, false);
        Ok(())
    }
}

/// The fixed page order of a tween session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStage {
    SelectFilter,
    InitialSettings,
    FinalSettings,
    OutputSettings,
    Done,
}

impl SessionStage {
    pub fn next(self) -> Option<SessionStage> {
        match self {
            Self::SelectFilter => Some(Self::InitialSettings),
            Self::InitialSettings => Some(Self::FinalSettings),
            Self::FinalSettings => Some(Self::OutputSettings),
            Self::OutputSettings => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Collects the two keyframe snapshots and the output settings in stage
/// order, then hands out the finished [`TweenAnimation`].
pub struct TweenSession {
    stage: SessionStage,
    filter_name: Option<String>,
    animation: TweenAnimation,
}

impl TweenSession {
    pub fn new() -> Self {
        Self {
            stage: SessionStage::SelectFilter,
            filter_name: None,
            animation: TweenAnimation::new(),
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn filter_name(&self) -> Option<&str> {
        self.filter_name.as_deref()
    }

    fn expect_stage(&self, expected: SessionStage) -> TweenkitResult<()> {
        if self.stage != expected {
            return Err(TweenkitError::validation(format!(
                "commit for {expected:?} while in {:?}",
                self.stage
            )));
        }
        Ok(())
    }

    fn advance(&mut self) {
        // next() is None only from Done, where every commit is refused first
        self.stage = self.stage.next().unwrap();
    }

    pub fn commit_filter(&mut self, name: impl Into<String>) -> TweenkitResult<()> {
        self.expect_stage(SessionStage::SelectFilter)?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TweenkitError::validation("filter name must be non-empty"));
        }
        self.filter_name = Some(name);
        self.advance();
        Ok(())
    }

    pub fn commit_initial(&mut self, params: &ParamSet) -> TweenkitResult<()> {
        self.expect_stage(SessionStage::InitialSettings)?;
        self.animation.remember_initial_state(params);
        self.advance();
        Ok(())
    }

    pub fn commit_final(&mut self, params: &ParamSet) -> TweenkitResult<()> {
        self.expect_stage(SessionStage::FinalSettings)?;
        self.animation.remember_final_state(params);
        self.advance();
        Ok(())
    }

    pub fn commit_output(&mut self, num_frames: u64) -> TweenkitResult<()> {
        self.expect_stage(SessionStage::OutputSettings)?;
        self.animation.set_num_frames(num_frames)?;
        self.advance();
        tracing::debug!(
            filter = self.filter_name.as_deref().unwrap_or(""),
            num_frames,
            "tween session ready"
        );
        Ok(())
    }

    /// The finished animation; only available once every stage committed.
    pub fn into_animation(self) -> TweenkitResult<TweenAnimation> {
        if self.stage != SessionStage::Done {
            return Err(TweenkitError::validation(format!(
                "session still in {:?}",
                self.stage
            )));
        }
        Ok(self.animation)
    }
}

impl Default for TweenSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::RangeParam;
    use crate::paramset::Param;
    use crate::state::{ParamValueState, RangeState};

    fn single_param_set(value: f64) -> ParamSet {
        let mut p = RangeParam::new("Amount", 0.0, 0.0, 100.0);
        p.set_value(value, false);
        ParamSet::new(vec![Param::Range(p)])
    }

    fn two_keyframe_animation(from: f64, to: f64, frames: u64) -> TweenAnimation {
        let mut anim = TweenAnimation::new();
        anim.remember_initial_state(&single_param_set(from));
        anim.remember_final_state(&single_param_set(to));
        anim.set_num_frames(frames).unwrap();
        anim
    }

    fn amount(state: &FilterState) -> f64 {
        match state.get("Amount") {
            Some(ParamValueState::Range(RangeState(v))) => *v,
            _ => panic!("missing Amount"),
        }
    }

    #[test]
    fn endpoints_reproduce_keyframes() {
        let anim = two_keyframe_animation(10.0, 90.0, 5);
        assert_eq!(amount(&anim.interpolated_state(0).unwrap()), 10.0);
        assert_eq!(amount(&anim.interpolated_state(4).unwrap()), 90.0);
    }

    #[test]
    fn intermediate_frames_are_linear() {
        let anim = two_keyframe_animation(0.0, 100.0, 5);
        assert_eq!(amount(&anim.interpolated_state(1).unwrap()), 25.0);
        assert_eq!(amount(&anim.interpolated_state(2).unwrap()), 50.0);
        assert_eq!(amount(&anim.interpolated_state(3).unwrap()), 75.0);
    }

    #[test]
    fn apply_frame_pushes_silently() {
        let anim = two_keyframe_animation(0.0, 100.0, 3);
        let mut live = single_param_set(42.0);
        anim.apply_frame(1, &mut live).unwrap();
        assert_eq!(amount(&live.copy_state()), 50.0);
    }

    #[test]
    fn out_of_range_frame_is_refused() {
        let anim = two_keyframe_animation(0.0, 100.0, 3);
        assert!(anim.interpolated_state(3).is_err());
    }

    #[test]
    fn too_few_frames_are_refused() {
        let mut anim = TweenAnimation::new();
        assert!(anim.set_num_frames(1).is_err());
    }

    #[test]
    fn session_walks_stages_in_order() {
        let mut session = TweenSession::new();
        assert_eq!(session.stage(), SessionStage::SelectFilter);

        session.commit_filter("Gaussian Blur").unwrap();
        assert_eq!(session.stage(), SessionStage::InitialSettings);

        session.commit_initial(&single_param_set(0.0)).unwrap();
        session.commit_final(&single_param_set(80.0)).unwrap();
        session.commit_output(9).unwrap();
        assert_eq!(session.stage(), SessionStage::Done);

        let anim = session.into_animation().unwrap();
        assert_eq!(amount(&anim.interpolated_state(4).unwrap()), 40.0);
    }

    #[test]
    fn out_of_order_commit_is_refused() {
        let mut session = TweenSession::new();
        assert!(session.commit_initial(&single_param_set(0.0)).is_err());
        assert!(session.commit_output(5).is_err());

        session.commit_filter("Motion Blur").unwrap();
        assert!(session.commit_final(&single_param_set(0.0)).is_err());
    }

    #[test]
    fn unfinished_session_yields_no_animation() {
        let mut session = TweenSession::new();
        session.commit_filter("Motion Blur").unwrap();
        assert!(session.into_animation().is_err());
    }

    #[test]
    fn empty_filter_name_is_refused() {
        let mut session = TweenSession::new();
        assert!(session.commit_filter("  ").is_err());
        assert_eq!(session.stage(), SessionStage::SelectFilter);
    }
}
