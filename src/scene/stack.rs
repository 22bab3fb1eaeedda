use crate::foundation::core::LayerId;
use crate::foundation::error::{CarouselError, CarouselResult};
use crate::scene::layer::{Layer, LayerPatch};

/// Relative or absolute z-order move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZMove {
    /// Swap with the next layer above.
    Up,
    /// Swap with the next layer below.
    Down,
    /// Move to the end (drawn last).
    Top,
    /// Move to the start (drawn first).
    Bottom,
}

/// Ordered layer sequence; later entries draw above earlier ones.
///
/// Every operation that names an id tolerates ids that are not present and leaves the sequence
/// unchanged in that case.
///
/// Deserializes from a plain layer array; a repeated id rejects the whole array.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(try_from = "Vec<Layer>")]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl serde::Serialize for LayerStack {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.layers.serialize(serializer)
    }
}

impl TryFrom<Vec<Layer>> for LayerStack {
    type Error = CarouselError;

    fn try_from(layers: Vec<Layer>) -> Result<Self, Self::Error> {
        let mut stack = Self::new();
        for layer in layers {
            let id = layer.id.clone();
            if !stack.add(layer) {
                return Err(CarouselError::validation(format!(
                    "duplicate layer id \"{id}\""
                )));
            }
        }
        Ok(stack)
    }
}

impl LayerStack {
    /// Empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// `true` when there are no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Layer> {
        self.layers.iter()
    }

    /// Borrow as a slice, bottom to top.
    pub fn as_slice(&self) -> &[Layer] {
        &self.layers
    }

    /// Ids bottom to top.
    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    /// Position of `id`, 0 being the bottom.
    pub fn index_of(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }

    /// `true` when `id` is in the stack.
    pub fn contains(&self, id: &LayerId) -> bool {
        self.index_of(id).is_some()
    }

    /// Look up a layer.
    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    /// Append on top. A layer whose id is already present replaces nothing and is dropped,
    /// keeping ids unique; returns whether it was added.
    pub fn add(&mut self, layer: Layer) -> bool {
        if self.contains(&layer.id) {
            tracing::warn!(id = %layer.id, "duplicate layer id ignored");
            return false;
        }
        self.layers.push(layer);
        true
    }

    /// Append several layers on top, in order. Returns how many were added.
    pub fn add_all(&mut self, layers: impl IntoIterator<Item = Layer>) -> usize {
        layers.into_iter().map(|l| self.add(l)).filter(|&a| a).count()
    }

    /// Delete `id`. Returns the removed layer.
    pub fn remove(&mut self, id: &LayerId) -> Option<Layer> {
        let idx = self.index_of(id)?;
        Some(self.layers.remove(idx))
    }

    /// Apply a z-order move. Returns `true` when the order changed.
    pub fn move_layer(&mut self, id: &LayerId, mv: ZMove) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let last = self.layers.len() - 1;
        match mv {
            ZMove::Up => {
                if idx == last {
                    return false;
                }
                self.layers.swap(idx, idx + 1);
            }
            ZMove::Down => {
                if idx == 0 {
                    return false;
                }
                self.layers.swap(idx, idx - 1);
            }
            ZMove::Top => {
                if idx == last {
                    return false;
                }
                let layer = self.layers.remove(idx);
                self.layers.push(layer);
            }
            ZMove::Bottom => {
                if idx == 0 {
                    return false;
                }
                let layer = self.layers.remove(idx);
                self.layers.insert(0, layer);
            }
        }
        true
    }

    /// Swap with the successor.
    pub fn move_up(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, ZMove::Up)
    }

    /// Swap with the predecessor.
    pub fn move_down(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, ZMove::Down)
    }

    /// Relocate to the end.
    pub fn move_to_top(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, ZMove::Top)
    }

    /// Relocate to the start.
    pub fn move_to_bottom(&mut self, id: &LayerId) -> bool {
        self.move_layer(id, ZMove::Bottom)
    }

    /// Patch `id` in place, keeping its identity and position.
    ///
    /// `Ok(false)` when the id is unknown. On error the layer is unchanged.
    pub fn update(&mut self, id: &LayerId, patch: &LayerPatch) -> CarouselResult<bool> {
        let Some(idx) = self.index_of(id) else {
            return Ok(false);
        };
        let patched = patch.apply(&self.layers[idx])?;
        self.layers[idx] = patched;
        Ok(true)
    }

    /// Replace `id` with the result of `f`, keeping its position. The replacement keeps the id.
    pub(crate) fn replace_with(&mut self, id: &LayerId, f: impl FnOnce(&Layer) -> Layer) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let mut next = f(&self.layers[idx]);
        next.id = id.clone();
        self.layers[idx] = next;
        true
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stack.rs"]
mod tests;
