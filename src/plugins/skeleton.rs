use std::any::Any;
use std::collections::HashSet;

use anyhow::Result;
use glam::Vec3;

use crate::config::rgb;
use crate::plugin::{Plugin, PluginContext, SceneData};
use crate::scene::{LineSet, Node, NodeId, NodeKind, SceneGraph, Skeleton};

const BONE_COLOR: u32 = 0x00ff66;

/// Bone segments for every skinned mesh, following clip playback
#[derive(Debug, Default)]
pub struct SkeletonHelper {
    skeletons: Vec<Skeleton>,
    lines: Option<NodeId>,
    hidden: bool,
}

/// One segment from each joint's parent joint to the joint
pub fn bone_segments(graph: &SceneGraph, skeletons: &[Skeleton]) -> Vec<[Vec3; 2]> {
    let matrices = graph.world_matrices();
    let position = |id: NodeId| matrices[id.index()].w_axis.truncate();
    let mut segments = Vec::new();
    for skeleton in skeletons {
        let joints: HashSet<NodeId> = skeleton.joints.iter().copied().collect();
        for joint in &skeleton.joints {
            let Some(parent) = graph.get(*joint).and_then(|n| n.parent()) else {
                continue;
            };
            if joints.contains(&parent) {
                segments.push([position(parent), position(*joint)]);
            }
        }
    }
    segments
}

impl SkeletonHelper {
    pub const NAME: &'static str = "Helpers.Skeleton";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.lines
    }
}

impl Plugin for SkeletonHelper {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, data: &SceneData) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.lines);
        self.skeletons = data.classification.skeletons.clone();
        if self.skeletons.is_empty() {
            return Ok(());
        }
        let segments = match ctx.scene.model() {
            Some(model) => bone_segments(&model.graph, &self.skeletons),
            None => Vec::new(),
        };
        let lines = ctx
            .scene
            .add_overlay(Node::lines(Self::NAME, LineSet::new(segments, rgb(BONE_COLOR))));
        ctx.scene.set_overlay_visible(lines, !self.hidden);
        self.lines = Some(lines);
        Ok(())
    }

    fn render(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        let Some(id) = self.lines.filter(|_| !self.hidden) else {
            return Ok(());
        };
        let Some(model) = ctx.scene.model() else {
            return Ok(());
        };
        let segments = bone_segments(&model.graph, &self.skeletons);
        if let Some(NodeKind::Lines(lines)) = ctx.scene.overlays_mut().get_mut(id).map(|n| &mut n.kind) {
            lines.segments = segments;
        }
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.hidden = false;
        if let Some(lines) = self.lines {
            ctx.scene.set_overlay_visible(lines, true);
        }
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.hidden = true;
        if let Some(lines) = self.lines {
            ctx.scene.set_overlay_visible(lines, false);
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.lines);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
