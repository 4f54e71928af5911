//! A minimal layered composition: the state the edit model operates on.
//!
//! Rendering, repainting and widgets are external; the model only records
//! [`CompEvent`]s that an observer (normally the GUI shell) drains and
//! reacts to, and bumps per-layer thumbnail versions so stale icon caches
//! are detectable.

use std::collections::BTreeMap;

/// Opaque raster payload. Pixel processing is out of scope; the model only
/// moves these around and releases them when edits are disposed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }
}

/// A grayscale layer mask.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mask {
    pub image: Image,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// A rectangular selection on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Selection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A draggable point of a path or shape, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Handle {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerKind {
    Image { image: Image },
    Shape,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub name: String,
    pub kind: LayerKind,
    mask: Option<Mask>,
    thumbnail_version: u64,
}

impl Layer {
    pub fn image(name: impl Into<String>, image: Image) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Image { image },
            mask: None,
            thumbnail_version: 0,
        }
    }

    pub fn shape(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: LayerKind::Shape,
            mask: None,
            thumbnail_version: 0,
        }
    }

    pub fn with_mask(mut self, mask: Mask) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn is_image_layer(&self) -> bool {
        matches!(self.kind, LayerKind::Image { .. })
    }

    pub fn mask(&self) -> Option<&Mask> {
        self.mask.as_ref()
    }

    pub fn has_mask(&self) -> bool {
        self.mask.is_some()
    }

    /// Monotonic counter; a bump invalidates any cached thumbnail.
    pub fn thumbnail_version(&self) -> u64 {
        self.thumbnail_version
    }
}

/// Model-level notifications, drained by the observing shell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompEvent {
    FullImageChanged,
    LayerThumbnailRefreshed { layer: usize },
    MaskThumbnailRefreshed { layer: usize },
    MaskDeleted { layer: usize },
    MaskAdded { layer: usize },
    PathChanged,
    SelectionChanged,
    CanvasResized,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Composition {
    pub name: String,
    canvas: Canvas,
    layers: Vec<Layer>,
    selection: Option<Selection>,
    handles: BTreeMap<String, Handle>,
    #[serde(skip)]
    events: Vec<CompEvent>,
}

impl Composition {
    pub fn new(name: impl Into<String>, canvas: Canvas) -> Self {
        Self {
            name: name.into(),
            canvas,
            layers: Vec::new(),
            selection: None,
            handles: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn add_layer(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        self.layers.len() - 1
    }

    pub fn layer(&self, index: usize) -> &Layer {
        &self.layers[index]
    }

    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn num_image_layers(&self) -> usize {
        self.layers.iter().filter(|l| l.is_image_layer()).count()
    }

    /// The only image layer, if there is exactly one.
    pub fn single_image_layer(&self) -> Option<usize> {
        let mut found = None;
        for (i, layer) in self.layers.iter().enumerate() {
            if layer.is_image_layer() {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }
        found
    }

    /// Removes and returns the mask of a layer.
    pub fn take_mask(&mut self, layer: usize) -> Option<Mask> {
        let mask = self.layers[layer].mask.take();
        if mask.is_some() {
            self.record(CompEvent::MaskDeleted { layer });
        }
        mask
    }

    pub fn add_mask(&mut self, layer: usize, mask: Mask) {
        assert!(
            self.layers[layer].mask.is_none(),
            "layer '{}' already has a mask",
            self.layers[layer].name
        );
        self.layers[layer].mask = Some(mask);
        self.record(CompEvent::MaskAdded { layer });
    }

    /// Swaps in a new image for an image layer, returning the old one.
    pub fn replace_layer_image(&mut self, layer: usize, image: Image) -> Image {
        match &mut self.layers[layer].kind {
            LayerKind::Image { image: current } => std::mem::replace(current, image),
            LayerKind::Shape => panic!("layer '{}' has no image", self.layers[layer].name),
        }
    }

    pub fn resize_canvas(&mut self, canvas: Canvas) -> Canvas {
        let old = self.canvas;
        self.canvas = canvas;
        self.record(CompEvent::CanvasResized);
        old
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) -> Option<Selection> {
        let old = self.selection;
        self.selection = selection;
        self.record(CompEvent::SelectionChanged);
        old
    }

    pub fn handle(&self, id: &str) -> Option<Handle> {
        self.handles.get(id).copied()
    }

    pub fn put_handle(&mut self, id: impl Into<String>, handle: Handle) {
        self.handles.insert(id.into(), handle);
    }

    /// Moves a handle and reports the path change.
    pub fn move_handle(&mut self, id: &str, to: Handle) {
        let slot = self
            .handles
            .get_mut(id)
            .unwrap_or_else(|| panic!("unknown handle '{id}'"));
        *slot = to;
        self.record(CompEvent::PathChanged);
    }

    /// Invalidates the layer's cached thumbnail.
    pub fn refresh_thumbnail(&mut self, layer: usize) {
        self.layers[layer].thumbnail_version += 1;
        self.record(CompEvent::LayerThumbnailRefreshed { layer });
    }

    /// Invalidates the thumbnail of the layer's mask, if present.
    pub fn refresh_mask_thumbnail(&mut self, layer: usize) {
        if self.layers[layer].mask.is_some() {
            self.layers[layer].thumbnail_version += 1;
            self.record(CompEvent::MaskThumbnailRefreshed { layer });
        }
    }

    pub fn notify_full_image_change(&mut self) {
        self.record(CompEvent::FullImageChanged);
    }

    fn record(&mut self, event: CompEvent) {
        self.events.push(event);
    }

    /// Drains the pending model notifications.
    pub fn take_events(&mut self) -> Vec<CompEvent> {
        std::mem::take(&mut self.events)
    }
}
