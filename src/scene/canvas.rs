use crate::assets::color::Color;
use crate::assets::decode::fit_within;
use crate::foundation::core::{DROP_MAX_SIZE, LayerId, Point, SlideAspect, SlideGrid, Size, Vec2};
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::geometry::view::ViewTransform;
use crate::scene::layer::{Layer, LayerKind, LayerPatch, ShapeKind, TextLayer};
use crate::scene::stack::{LayerStack, ZMove};
use crate::scene::template;

/// Where toolbar-added text and uploaded images land.
pub const TOOLBAR_ORIGIN: Point = Point::new(100.0, 100.0);
/// Where toolbar-added shapes land.
pub const SHAPE_ORIGIN: Point = Point::new(150.0, 150.0);
/// Edge of a toolbar-added shape.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;
/// Wrap width of toolbar-added text.
pub const DEFAULT_TEXT_WIDTH: f64 = 200.0;
/// Content of toolbar-added text.
pub const DEFAULT_TEXT: &str = "Double click to edit";

/// Stage view of a fresh editor: zoomed out to half size, offset from the corner.
pub const INITIAL_VIEW: ViewTransform = ViewTransform {
    pan: Vec2::new(100.0, 100.0),
    zoom: 0.5,
};

/// Editing session state: slide grid, background, stage view, layers and selection.
///
/// All mutation goes through the methods below. Each call either applies fully or leaves the
/// state untouched, so a reader between calls never sees a half-applied change.
///
/// Loading a serialized state validates the slide grid, view and layer ids; selected ids that
/// name no layer are dropped.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "CanvasStateRaw")]
pub struct CanvasState {
    slides: SlideGrid,
    background: Color,
    view: ViewTransform,
    layers: LayerStack,
    selection: Vec<LayerId>,
}

#[derive(serde::Deserialize)]
struct CanvasStateRaw {
    slides: SlideGrid,
    background: Color,
    view: ViewTransform,
    layers: LayerStack,
    #[serde(default)]
    selection: Vec<LayerId>,
}

impl From<CanvasStateRaw> for CanvasState {
    fn from(raw: CanvasStateRaw) -> Self {
        let mut state = Self {
            slides: raw.slides,
            background: raw.background,
            view: raw.view,
            layers: raw.layers,
            selection: Vec::new(),
        };
        state.set_selection(raw.selection);
        state
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            slides: SlideGrid::default(),
            background: Color::WHITE,
            view: INITIAL_VIEW,
            layers: LayerStack::new(),
            selection: Vec::new(),
        }
    }
}

impl CanvasState {
    /// Fresh editor state: 3 square slides on white, no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide grid.
    pub fn slides(&self) -> SlideGrid {
        self.slides
    }

    /// Canvas background.
    pub fn background(&self) -> Color {
        self.background
    }

    /// Stage view.
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Look up a layer.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Selected ids, in selection order. Every entry names a layer in the stack.
    pub fn selection(&self) -> &[LayerId] {
        &self.selection
    }

    /// `true` when `id` is selected.
    pub fn is_selected(&self, id: &LayerId) -> bool {
        self.selection.contains(id)
    }

    /// Change the number of slides. Layers beyond the new strip are kept.
    pub fn set_slide_count(&mut self, count: u32) -> CarouselResult<()> {
        self.slides = SlideGrid::new(count, self.slides.aspect)?;
        tracing::debug!(count, "slide count changed");
        Ok(())
    }

    /// Switch the slide height preset.
    pub fn set_aspect(&mut self, aspect: SlideAspect) {
        self.slides.aspect = aspect;
    }

    /// Change the canvas background.
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Replace the stage view wholesale.
    pub fn set_view(&mut self, view: ViewTransform) -> CarouselResult<()> {
        self.view = ViewTransform::new(view.pan, view.zoom)?;
        Ok(())
    }

    /// Set the stage zoom, keeping the pan.
    pub fn set_zoom(&mut self, zoom: f64) -> CarouselResult<()> {
        self.view = ViewTransform::new(self.view.pan, zoom)?;
        Ok(())
    }

    /// Set the stage pan, keeping the zoom.
    pub fn set_pan(&mut self, pan: Vec2) -> CarouselResult<()> {
        self.view = ViewTransform::new(pan, self.view.zoom)?;
        Ok(())
    }

    /// One wheel notch over the stage at screen position `pointer`.
    ///
    /// Returns `false` (view unchanged) when the step would leave the zoom range.
    pub fn wheel_zoom(&mut self, pointer: Point, delta_y: f64) -> bool {
        match self.view.zoom_at(pointer, delta_y) {
            Some(view) => {
                self.view = view;
                true
            }
            None => false,
        }
    }

    /// Append a layer on top. Returns `false` when its id is already taken.
    pub fn add_layer(&mut self, layer: Layer) -> bool {
        self.layers.add(layer)
    }

    /// Append several layers on top, in order. Returns how many were added.
    pub fn add_layers(&mut self, layers: impl IntoIterator<Item = Layer>) -> usize {
        self.layers.add_all(layers)
    }

    /// Patch a layer in place. `Ok(false)` for an unknown id.
    pub fn update_layer(&mut self, id: &LayerId, patch: &LayerPatch) -> CarouselResult<bool> {
        self.layers.update(id, patch)
    }

    /// Delete a layer and drop it from the selection. Unknown ids are a no-op.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        let removed = self.layers.remove(id);
        if removed.is_some() {
            self.selection.retain(|s| s != id);
        } else {
            tracing::debug!(%id, "remove of unknown layer ignored");
        }
        removed
    }

    /// Change z-order. Returns `true` when the order changed.
    pub fn move_layer(&mut self, id: &LayerId, mv: ZMove) -> bool {
        self.layers.move_layer(id, mv)
    }

    /// Replace the selection, silently skipping ids not in the stack and repeated ids.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        let mut next: Vec<LayerId> = Vec::new();
        for id in ids {
            if self.layers.contains(&id) && !next.contains(&id) {
                next.push(id);
            }
        }
        self.selection = next;
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Expand a catalog template onto slide `slide_index` using the current slide size.
    ///
    /// Returns the ids of the created layers; an unknown template adds nothing.
    pub fn apply_template(&mut self, template_id: &str, slide_index: u32) -> Vec<LayerId> {
        if slide_index >= self.slides.count {
            tracing::debug!(
                slide_index,
                count = self.slides.count,
                "template applied past the last slide"
            );
        }
        let layers = template::apply_template(
            template_id,
            slide_index,
            self.slides.slide_width(),
            self.slides.slide_height(),
        );
        let ids: Vec<LayerId> = layers.iter().map(|l| l.id.clone()).collect();
        self.layers.add_all(layers);
        tracing::info!(template_id, slide_index, added = ids.len(), "template applied");
        ids
    }

    /// Place an image dropped at screen position `pointer`.
    ///
    /// The frame is the natural size scaled down to fit [`DROP_MAX_SIZE`] and is centered on the
    /// drop point in canvas space.
    pub fn place_dropped_image(
        &mut self,
        pointer: Point,
        natural: Size,
        source: impl Into<String>,
    ) -> CarouselResult<LayerId> {
        let size = fit_within(natural, DROP_MAX_SIZE)?;
        let at = self.view.screen_to_canvas(pointer);
        let layer = Layer::image(
            at.x - size.width / 2.0,
            at.y - size.height / 2.0,
            size.width,
            size.height,
            Some(source.into()),
        );
        Ok(self.push_new(layer))
    }

    /// Place an uploaded image at [`TOOLBAR_ORIGIN`], fitted to [`DROP_MAX_SIZE`].
    pub fn upload_image(
        &mut self,
        natural: Size,
        source: impl Into<String>,
    ) -> CarouselResult<LayerId> {
        let size = fit_within(natural, DROP_MAX_SIZE)?;
        let layer = Layer::image(
            TOOLBAR_ORIGIN.x,
            TOOLBAR_ORIGIN.y,
            size.width,
            size.height,
            Some(source.into()),
        );
        Ok(self.push_new(layer))
    }

    /// Add the default text box.
    pub fn add_text(&mut self) -> LayerId {
        let mut text = TextLayer::new(DEFAULT_TEXT);
        text.width = Some(DEFAULT_TEXT_WIDTH);
        self.push_new(Layer::new(
            TOOLBAR_ORIGIN.x,
            TOOLBAR_ORIGIN.y,
            LayerKind::Text(text),
        ))
    }

    /// Add a default-sized shape.
    pub fn add_shape(&mut self, shape: ShapeKind) -> LayerId {
        self.push_new(Layer::shape(
            SHAPE_ORIGIN.x,
            SHAPE_ORIGIN.y,
            shape,
            DEFAULT_SHAPE_SIZE,
            DEFAULT_SHAPE_SIZE,
        ))
    }

    /// Finish a transform-handle gesture: apply `patch`, then fold the resulting scale into the
    /// frame size of image layers.
    pub fn commit_transform(&mut self, id: &LayerId, patch: &LayerPatch) -> CarouselResult<bool> {
        let Some(layer) = self.layers.get(id) else {
            return Ok(false);
        };
        let mut next = patch.apply(layer)?;
        next.bake_scale();
        Ok(self.layers.replace_with(id, |_| next))
    }

    /// One wheel notch over an image frame in crop mode.
    pub fn crop_wheel(&mut self, id: &LayerId, delta_y: f64) -> CarouselResult<bool> {
        let Some(layer) = self.layers.get(id) else {
            return Ok(false);
        };
        let LayerKind::Image(img) = &layer.kind else {
            return Err(CarouselError::validation(format!(
                "crop zoom needs an image layer, \"{id}\" is {}",
                layer.kind_name()
            )));
        };
        let zoom = img.crop.wheel(delta_y).zoom;
        self.layers.update(id, &LayerPatch::crop_zoom(zoom))
    }

    /// Layers whose horizontal extent overlaps slide `index`. Unsized layers (unwrapped text)
    /// belong to the slide holding their left edge.
    pub fn layers_on_slide(&self, index: u32) -> Vec<&Layer> {
        let slide = self.slides.slide_bounds(index);
        self.layers
            .iter()
            .filter(|l| match l.bounds() {
                Some(b) => b.x0 < slide.x1 && b.x1 > slide.x0,
                None => l.x >= slide.x0 && l.x < slide.x1,
            })
            .collect()
    }

    fn push_new(&mut self, layer: Layer) -> LayerId {
        let id = layer.id.clone();
        tracing::debug!(%id, kind = layer.kind_name(), x = layer.x, y = layer.y, "layer added");
        self.layers.add(layer);
        id
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/canvas.rs"]
mod tests;
