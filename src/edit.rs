//! Reversible edits on a [`Composition`].
//!
//! Each edit is a command object capturing enough "before" state to reverse
//! one completed user operation. Lifecycle per edit:
//! `applied -> (undone <-> applied) -> dead`. `die` is terminal and releases
//! captured heavyweight state (old images, old masks).
//!
//! The undo stack holding these edits is an external collaborator. It must
//! check `can_undo`/`can_redo` before invoking; undoing an edit that reports
//! `can_undo() == false` is refused with an error, while calling `undo` in
//! the wrong lifecycle phase (twice in a row, or after `die`) is a
//! programming error and panics.

use crate::comp::{Canvas, Composition, Handle, Image, Mask, Selection};
use crate::error::{TweenkitError, TweenkitResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditState {
    /// The operation's effect is present in the composition.
    Applied,
    Undone,
    /// Disposed; captured resources released, no further undo/redo.
    Dead,
}

pub trait Edit {
    fn name(&self) -> &str;

    fn state(&self) -> EditState;

    fn can_undo(&self) -> bool {
        self.state() == EditState::Applied
    }

    fn can_redo(&self) -> bool {
        self.state() == EditState::Undone
    }

    /// Restores the exact observable state from before the operation.
    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()>;

    /// Reproduces the exact post-operation state.
    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()>;

    /// Terminal disposal. Must be called at most once.
    fn die(&mut self);
}

/// Shared lifecycle bookkeeping embedded in every edit.
#[derive(Clone, Debug)]
struct EditBase {
    name: String,
    state: EditState,
}

impl EditBase {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: EditState::Applied,
        }
    }

    fn begin_undo(&mut self) {
        assert_eq!(
            self.state,
            EditState::Applied,
            "undo of '{}' in state {:?}",
            self.name,
            self.state
        );
        self.state = EditState::Undone;
        tracing::debug!(edit = %self.name, "undo");
    }

    fn begin_redo(&mut self) {
        assert_eq!(
            self.state,
            EditState::Undone,
            "redo of '{}' in state {:?}",
            self.name,
            self.state
        );
        self.state = EditState::Applied;
        tracing::debug!(edit = %self.name, "redo");
    }

    fn die(&mut self) {
        assert_ne!(self.state, EditState::Dead, "'{}' died twice", self.name);
        self.state = EditState::Dead;
    }
}

/// The deletion of a layer mask. Keeps the removed mask alive so undo can
/// re-attach it; ownership shuttles between the edit and the composition,
/// so no copy is ever made.
pub struct DeleteMaskEdit {
    base: EditBase,
    layer: usize,
    old_mask: Option<Mask>,
}

impl DeleteMaskEdit {
    /// `old_mask` is the mask the completed operation removed.
    pub fn new(comp: &Composition, layer: usize, old_mask: Mask) -> Self {
        assert!(!comp.layer(layer).has_mask(), "mask still present");
        Self {
            base: EditBase::new("Delete Layer Mask"),
            layer,
            old_mask: Some(old_mask),
        }
    }
}

impl Edit for DeleteMaskEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();

        let mask = self.old_mask.take().expect("mask already re-attached");
        comp.add_mask(self.layer, mask);
        comp.refresh_mask_thumbnail(self.layer);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();

        self.old_mask = comp.take_mask(self.layer);
        assert!(self.old_mask.is_some(), "mask vanished between undo and redo");
        comp.refresh_thumbnail(self.layer);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
        self.old_mask = None;
    }
}

/// The movement of a draggable point.
pub struct HandleMovedEdit {
    base: EditBase,
    handle_id: String,
    before: Handle,
    after: Handle,
}

impl HandleMovedEdit {
    /// Captures the current (post-move) position as the redo target.
    pub fn new(
        name: impl Into<String>,
        comp: &Composition,
        handle_id: impl Into<String>,
        before: Handle,
    ) -> Self {
        let handle_id = handle_id.into();
        let after = comp
            .handle(&handle_id)
            .unwrap_or_else(|| panic!("unknown handle '{handle_id}'"));
        assert!(before != after, "handle did not move");
        Self {
            base: EditBase::new(name),
            handle_id,
            before,
            after,
        }
    }
}

impl Edit for HandleMovedEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();
        comp.move_handle(&self.handle_id, self.before);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();
        comp.move_handle(&self.handle_id, self.after);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
    }
}

/// Replacement of an image layer's raster content. The edit always holds
/// the image that is currently *not* in the composition; undo and redo are
/// the same swap.
pub struct ImageEdit {
    base: EditBase,
    layer: usize,
    stored: Option<Image>,
}

impl ImageEdit {
    pub fn new(name: impl Into<String>, layer: usize, before: Image) -> Self {
        Self {
            base: EditBase::new(name),
            layer,
            stored: Some(before),
        }
    }

    fn swap(&mut self, comp: &mut Composition) {
        let image = self.stored.take().expect("image released");
        self.stored = Some(comp.replace_layer_image(self.layer, image));
        comp.refresh_thumbnail(self.layer);
    }
}

impl Edit for ImageEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();
        self.swap(comp);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();
        self.swap(comp);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
        self.stored = None;
    }
}

/// A canvas resize. Undo and redo are the same size swap.
pub struct CanvasChangeEdit {
    base: EditBase,
    before: Canvas,
}

impl CanvasChangeEdit {
    pub fn new(before: Canvas) -> Self {
        Self {
            base: EditBase::new("Canvas Change"),
            before,
        }
    }

    fn swap(&mut self, comp: &mut Composition) {
        self.before = comp.resize_canvas(self.before);
    }
}

impl Edit for CanvasChangeEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();
        self.swap(comp);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();
        self.swap(comp);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
    }
}

/// A selection shape replacement.
pub struct SelectionChangeEdit {
    base: EditBase,
    before: Option<Selection>,
}

impl SelectionChangeEdit {
    pub fn new(before: Option<Selection>) -> Self {
        Self {
            base: EditBase::new("Selection Change"),
            before,
        }
    }

    fn swap(&mut self, comp: &mut Composition) {
        self.before = comp.set_selection(self.before);
    }
}

impl Edit for SelectionChangeEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();
        self.swap(comp);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();
        self.swap(comp);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
    }
}

/// A dropped selection (deselect as part of a crop-like operation).
pub struct DeselectEdit {
    base: EditBase,
    old_selection: Option<Selection>,
}

impl DeselectEdit {
    pub fn new(old_selection: Selection) -> Self {
        Self {
            base: EditBase::new("Deselect"),
            old_selection: Some(old_selection),
        }
    }
}

impl Edit for DeselectEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_undo();
        comp.set_selection(self.old_selection.take());
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        self.base.begin_redo();
        self.old_selection = comp.set_selection(None);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();
        self.old_selection = None;
    }
}

/// Before-state captured ahead of an operation that can affect multiple
/// layers (resize, crop, flip, rotation). The image content is captured only
/// when the composition has exactly one image layer; with more, the
/// resulting [`MultiLayerEdit`] reports itself non-undoable.
pub struct MultiLayerBackup {
    layer: Option<usize>,
    before_image: Option<Image>,
    before_canvas: Canvas,
    saved_selection: Option<Selection>,
}

impl MultiLayerBackup {
    pub fn capture(comp: &Composition) -> Self {
        let layer = comp.single_image_layer();
        let before_image = layer.map(|i| match &comp.layer(i).kind {
            crate::comp::LayerKind::Image { image } => image.clone(),
            crate::comp::LayerKind::Shape => unreachable!(),
        });
        Self {
            layer,
            before_image,
            before_canvas: comp.canvas(),
            saved_selection: comp.selection(),
        }
    }

    pub fn has_saved_selection(&self) -> bool {
        self.saved_selection.is_some()
    }
}

/// An operation affecting multiple layers, assembled from sub-edits after
/// the operation completed. Undoable only when the composition had a single
/// image layer at capture time; otherwise `can_undo`/`can_redo` are
/// permanently false, regardless of position in the undo stack.
///
/// Delegation order is fixed and identical for undo and redo:
/// image, canvas, selection, deselect.
pub struct MultiLayerEdit {
    base: EditBase,
    layer: Option<usize>,
    image_edit: Option<ImageEdit>,
    canvas_edit: Option<CanvasChangeEdit>,
    selection_edit: Option<SelectionChangeEdit>,
    deselect_edit: Option<DeselectEdit>,
}

impl MultiLayerEdit {
    pub fn new(name: impl Into<String>, comp: &Composition, backup: MultiLayerBackup) -> Self {
        let name = name.into();

        let image_edit = match (backup.layer, backup.before_image) {
            (Some(layer), Some(before)) => Some(ImageEdit::new(name.clone(), layer, before)),
            _ => None,
        };

        let canvas_edit = (backup.before_canvas != comp.canvas())
            .then(|| CanvasChangeEdit::new(backup.before_canvas));

        let mut selection_edit = None;
        let mut deselect_edit = None;
        if comp.selection().is_some() {
            selection_edit = Some(SelectionChangeEdit::new(backup.saved_selection));
        } else if let Some(old) = backup.saved_selection {
            // the operation dropped the selection entirely
            deselect_edit = Some(DeselectEdit::new(old));
        }

        Self {
            base: EditBase::new(name),
            layer: backup.layer,
            image_edit,
            canvas_edit,
            selection_edit,
            deselect_edit,
        }
    }

    fn refresh_caches(&self, comp: &mut Composition) {
        comp.notify_full_image_change();
        if let Some(layer) = self.layer {
            comp.refresh_thumbnail(layer);
            comp.refresh_mask_thumbnail(layer);
        }
    }
}

impl Edit for MultiLayerEdit {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn state(&self) -> EditState {
        self.base.state
    }

    fn can_undo(&self) -> bool {
        self.image_edit.is_some() && self.state() == EditState::Applied
    }

    fn can_redo(&self) -> bool {
        self.image_edit.is_some() && self.state() == EditState::Undone
    }

    fn undo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        if self.image_edit.is_none() {
            return Err(TweenkitError::edit(format!(
                "'{}' is not undoable (multiple image layers at capture time)",
                self.base.name
            )));
        }
        self.base.begin_undo();

        if let Some(edit) = &mut self.image_edit {
            edit.undo(comp)?;
        }
        if let Some(edit) = &mut self.canvas_edit {
            edit.undo(comp)?;
        }
        if let Some(edit) = &mut self.selection_edit {
            edit.undo(comp)?;
        }
        if let Some(edit) = &mut self.deselect_edit {
            edit.undo(comp)?;
        }

        self.refresh_caches(comp);
        Ok(())
    }

    fn redo(&mut self, comp: &mut Composition) -> TweenkitResult<()> {
        if self.image_edit.is_none() {
            return Err(TweenkitError::edit(format!(
                "'{}' is not redoable (multiple image layers at capture time)",
                self.base.name
            )));
        }
        self.base.begin_redo();

        if let Some(edit) = &mut self.image_edit {
            edit.redo(comp)?;
        }
        if let Some(edit) = &mut self.canvas_edit {
            edit.redo(comp)?;
        }
        if let Some(edit) = &mut self.selection_edit {
            edit.redo(comp)?;
        }
        if let Some(edit) = &mut self.deselect_edit {
            edit.redo(comp)?;
        }

        self.refresh_caches(comp);
        Ok(())
    }

    fn die(&mut self) {
        self.base.die();

        if let Some(edit) = &mut self.image_edit {
            edit.die();
        }
        if let Some(edit) = &mut self.canvas_edit {
            edit.die();
        }
        if let Some(edit) = &mut self.selection_edit {
            edit.die();
        }
        if let Some(edit) = &mut self.deselect_edit {
            edit.die();
        }
    }
}
