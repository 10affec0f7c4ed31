use std::any::Any;

use anyhow::Result;

use crate::config::rgb;
use crate::math::AABB;
use crate::plugin::{CaptureResult, Plugin, PluginContext, SceneData, Viewport};
use crate::scene::{LineSet, Node, NodeId, NodeKind, Scene};

const SELECTED_BOX_COLOR: u32 = 0x002fa7;

/// Viewport height at which the outline is one pixel wide
const REFERENCE_HEIGHT: f32 = 540.0;

/// Box outline around the last clicked mesh
#[derive(Debug, Default)]
pub struct SelectedOutline {
    selected: Option<NodeId>,
    outline: Option<NodeId>,
    thickness: u32,
    hidden: bool,
}

fn world_box(scene: &Scene, id: NodeId) -> Option<AABB> {
    let model = scene.model()?;
    let local = model.graph.get(id)?.local_bounds()?;
    Some(local.transformed(&model.graph.world_matrix(id)))
}

impl SelectedOutline {
    pub const NAME: &'static str = "Effects.Selected.Outline";

    pub fn new() -> Self {
        Self {
            thickness: 1,
            ..Self::default()
        }
    }

    /// Model node currently highlighted
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn thickness(&self) -> u32 {
        self.thickness
    }

    pub fn outline(&self) -> Option<NodeId> {
        self.outline
    }

    fn clear(&mut self, scene: &mut Scene) {
        self.selected = None;
        super::remove_overlay(scene, &mut self.outline);
    }

    fn select(&mut self, scene: &mut Scene, id: NodeId) {
        self.clear(scene);
        let Some(aabb) = world_box(scene, id) else {
            return;
        };
        let outline = scene.add_overlay(Node::lines(
            Self::NAME,
            LineSet::new(aabb.edges().to_vec(), rgb(SELECTED_BOX_COLOR)).with_width(self.thickness),
        ));
        scene.set_overlay_visible(outline, !self.hidden);
        self.selected = Some(id);
        self.outline = Some(outline);
    }
}

impl Plugin for SelectedOutline {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.thickness = thickness_for(ctx.viewport);
        Ok(())
    }

    /// A new model invalidates the selection
    fn update(&mut self, ctx: &mut PluginContext<'_>, _data: &SceneData) -> Result<()> {
        self.clear(ctx.scene);
        Ok(())
    }

    fn render(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        let (Some(selected), Some(outline)) = (self.selected, self.outline) else {
            return Ok(());
        };
        let Some(aabb) = world_box(ctx.scene, selected) else {
            self.clear(ctx.scene);
            return Ok(());
        };
        if let Some(NodeKind::Lines(lines)) = ctx.scene.overlays_mut().get_mut(outline).map(|n| &mut n.kind) {
            lines.segments = aabb.edges().to_vec();
        }
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.hidden = false;
        if let Some(outline) = self.outline {
            ctx.scene.set_overlay_visible(outline, true);
        }
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.hidden = true;
        if let Some(outline) = self.outline {
            ctx.scene.set_overlay_visible(outline, false);
        }
        Ok(())
    }

    fn capture(&mut self, ctx: &mut PluginContext<'_>, capture: &CaptureResult) -> Result<()> {
        match capture.nearest() {
            Some(hit) if Some(hit.node) == self.selected => {}
            Some(hit) => {
                log::debug!("[plugin:{}] selected {:?}", Self::NAME, hit.node);
                self.select(ctx.scene, hit.node);
                ctx.activate();
            }
            None if self.selected.is_some() => {
                self.clear(ctx.scene);
                ctx.activate();
            }
            None => {}
        }
        Ok(())
    }

    fn resize(&mut self, ctx: &mut PluginContext<'_>, viewport: Viewport) -> Result<()> {
        self.thickness = thickness_for(viewport);
        if let Some(outline) = self.outline {
            if let Some(NodeKind::Lines(lines)) = ctx.scene.overlays_mut().get_mut(outline).map(|n| &mut n.kind) {
                lines.width = self.thickness;
            }
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.clear(ctx.scene);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn thickness_for(viewport: Viewport) -> u32 {
    ((viewport.height as f32 / REFERENCE_HEIGHT).round() as u32).max(1)
}
