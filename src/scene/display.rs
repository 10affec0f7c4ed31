use std::sync::Arc;

use glam::Vec3;

use super::graph::SceneGraph;
use super::handle::SceneHandle;
use super::node::{Node, NodeId};

/// Decoded equirectangular environment map, linear RGBA
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentTexture {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl EnvironmentTexture {
    /// Mean colour, used as a flat fallback background
    pub fn average_color(&self) -> Vec3 {
        if self.pixels.is_empty() {
            return Vec3::ZERO;
        }
        let sum = self
            .pixels
            .iter()
            .fold(Vec3::ZERO, |acc, p| acc + Vec3::new(p[0], p[1], p[2]));
        sum / self.pixels.len() as f32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Color(Vec3),
    /// Vertical gradient, `top` at the upper edge
    Gradient { top: Vec3, bottom: Vec3 },
    Environment(Arc<EnvironmentTexture>),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color(Vec3::splat(0.12))
    }
}

/// Everything the renderer draws: the model plus overlay helpers
#[derive(Debug, Default)]
pub struct Scene {
    overlays: SceneGraph,
    model: Option<SceneHandle>,
    model_visible: bool,
    pub background: Background,
    pub environment: Option<Arc<EnvironmentTexture>>,
    changed: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            model_visible: true,
            ..Self::default()
        }
    }

    pub fn model(&self) -> Option<&SceneHandle> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut SceneHandle> {
        self.model.as_mut()
    }

    /// Replace the model, returning the previous one
    pub fn set_model(&mut self, model: SceneHandle) -> Option<SceneHandle> {
        self.changed = true;
        self.model.replace(model)
    }

    pub fn take_model(&mut self) -> Option<SceneHandle> {
        let model = self.model.take();
        if model.is_some() {
            self.changed = true;
        }
        model
    }

    pub fn is_model_visible(&self) -> bool {
        self.model_visible && self.model.is_some()
    }

    pub fn set_model_visible(&mut self, visible: bool) {
        if self.model_visible != visible {
            self.model_visible = visible;
            self.changed = true;
        }
    }

    pub fn overlays(&self) -> &SceneGraph {
        &self.overlays
    }

    /// Direct access; structural edits should go through add/remove so the
    /// change flag is raised
    pub fn overlays_mut(&mut self) -> &mut SceneGraph {
        &mut self.overlays
    }

    pub fn add_overlay(&mut self, node: Node) -> NodeId {
        self.changed = true;
        self.overlays.add(node)
    }

    pub fn add_overlay_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.changed = true;
        self.overlays.add_child(parent, node)
    }

    pub fn remove_overlay(&mut self, id: NodeId) -> bool {
        let removed = self.overlays.remove(id) > 0;
        self.changed |= removed;
        removed
    }

    pub fn set_overlay_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.overlays.get_mut(id) {
            if node.visible != visible {
                node.visible = visible;
                self.changed = true;
            }
        }
    }

    /// True once per batch of child add/remove or visibility changes
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn clear_overlays(&mut self) {
        if !self.overlays.is_empty() {
            self.overlays.clear();
            self.changed = true;
        }
    }
}
