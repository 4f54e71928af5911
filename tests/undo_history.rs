//! Drives the edit objects the way an undo-stack manager would: strict
//! undo/redo alternation guarded by capability queries, and disposal when
//! edits are evicted.

use tweenkit::{
    Canvas, Composition, DeleteMaskEdit, Edit, EditState, Handle, HandleMovedEdit, Image, Layer,
    Mask, MultiLayerBackup, MultiLayerEdit, Selection,
};

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas {
        width: w,
        height: h,
    }
}

fn fresh_comp() -> Composition {
    let mut comp = Composition::new("sunset.pxc", canvas(16, 16));
    comp.add_layer(
        Layer::image("background", Image::blank(16, 16)).with_mask(Mask {
            image: Image::blank(16, 16),
        }),
    );
    comp.put_handle("path.anchor.0", Handle { x: 2.0, y: 2.0 });
    comp
}

#[test]
fn linear_stack_replays_in_reverse_order() {
    let mut comp = fresh_comp();
    let mut stack: Vec<Box<dyn Edit>> = Vec::new();

    // operation 1: delete the mask
    let mask = comp.take_mask(0).unwrap();
    stack.push(Box::new(DeleteMaskEdit::new(&comp, 0, mask)));

    // operation 2: move a handle
    comp.move_handle("path.anchor.0", Handle { x: 9.0, y: 9.0 });
    stack.push(Box::new(HandleMovedEdit::new(
        "Move Handle",
        &comp,
        "path.anchor.0",
        Handle { x: 2.0, y: 2.0 },
    )));

    // undo everything, newest first
    for edit in stack.iter_mut().rev() {
        assert!(edit.can_undo());
        edit.undo(&mut comp).unwrap();
    }
    assert!(comp.layer(0).has_mask());
    assert_eq!(comp.handle("path.anchor.0"), Some(Handle { x: 2.0, y: 2.0 }));

    // redo everything, oldest first
    for edit in stack.iter_mut() {
        assert!(edit.can_redo());
        edit.redo(&mut comp).unwrap();
    }
    assert!(!comp.layer(0).has_mask());
    assert_eq!(comp.handle("path.anchor.0"), Some(Handle { x: 9.0, y: 9.0 }));
}

#[test]
fn eviction_disposes_edits() {
    let mut comp = fresh_comp();
    let mask = comp.take_mask(0).unwrap();
    let mut edit = DeleteMaskEdit::new(&comp, 0, mask);

    // stack trimmed: the edit is evicted and disposed
    edit.die();
    assert_eq!(edit.state(), EditState::Dead);
    assert!(!edit.can_undo());
    assert!(!edit.can_redo());
}

#[test]
fn capability_gated_composite_stays_inert_in_the_stack() {
    let mut comp = fresh_comp();
    comp.add_layer(Layer::image("overlay", Image::blank(16, 16)));

    let backup = MultiLayerBackup::capture(&comp);
    comp.resize_canvas(canvas(8, 8));
    let mut edit = MultiLayerEdit::new("Resize", &comp, backup);

    // two image layers at capture time: permanently non-undoable
    assert!(!edit.can_undo());
    assert!(!edit.can_redo());
    assert!(edit.undo(&mut comp).is_err());

    // the refusal left the composition alone
    assert_eq!(comp.canvas(), canvas(8, 8));
}

#[test]
fn crop_with_selection_round_trips_through_the_stack() {
    let mut comp = Composition::new("crop-me", canvas(16, 16));
    comp.add_layer(Layer::image("background", Image::blank(16, 16)));
    comp.set_selection(Some(Selection {
        x: 4.0,
        y: 4.0,
        width: 8.0,
        height: 8.0,
    }));

    let backup = MultiLayerBackup::capture(&comp);
    comp.replace_layer_image(0, Image::blank(8, 8));
    comp.resize_canvas(canvas(8, 8));
    comp.set_selection(None);

    let mut edit = MultiLayerEdit::new("Crop", &comp, backup);

    edit.undo(&mut comp).unwrap();
    assert_eq!(comp.canvas(), canvas(16, 16));
    assert_eq!(
        comp.selection(),
        Some(Selection {
            x: 4.0,
            y: 4.0,
            width: 8.0,
            height: 8.0,
        })
    );

    edit.redo(&mut comp).unwrap();
    assert_eq!(comp.canvas(), canvas(8, 8));
    assert_eq!(comp.selection(), None);

    edit.die();
    assert_eq!(edit.state(), EditState::Dead);
}
