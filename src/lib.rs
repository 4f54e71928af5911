#![forbid(unsafe_code)]

pub mod comp;
pub mod edit;
pub mod error;
pub mod group;
pub mod math;
pub mod param;
pub mod paramset;
pub mod rng;
pub mod state;
pub mod tween;

pub use comp::{Canvas, CompEvent, Composition, Handle, Image, Layer, LayerKind, Mask, Selection};
pub use edit::{
    CanvasChangeEdit, DeleteMaskEdit, DeselectEdit, Edit, EditState, HandleMovedEdit, ImageEdit,
    MultiLayerBackup, MultiLayerEdit, SelectionChangeEdit,
};
pub use error::{TweenkitError, TweenkitResult};
pub use group::GroupedRangeParam;
pub use param::{AdjustmentListener, AngleParam, FilterParam, ParamView, RangeParam};
pub use paramset::{FilterState, Param, ParamSet};
pub use rng::SmallRng;
pub use state::{AngleState, GroupedRangeState, ParamState, ParamValueState, RangeState};
pub use tween::{SessionStage, TweenAnimation, TweenSession};
