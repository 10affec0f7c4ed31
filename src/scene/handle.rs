use chrono::{DateTime, Local};
use glam::Vec3;

use super::classify::Classification;
use super::graph::SceneGraph;
use super::node::{Node, NodeId};
use crate::math::AABB;

/// Camera distance per unit of the largest box extent
pub const FIT_FACTOR: f32 = 3.0;

/// Used when a model has no extent at all
pub const MIN_FIT_DISTANCE: f32 = 1.0;

/// Framing data derived from a model's bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub aabb: AABB,
    pub center: Vec3,
    pub size: Vec3,
    pub fit_distance: f32,
}

impl Bounds {
    pub fn from_aabb(aabb: AABB) -> Self {
        let fit = aabb.max_extent() * FIT_FACTOR;
        Self {
            aabb,
            center: aabb.center(),
            size: aabb.size(),
            fit_distance: if fit > 0.0 { fit } else { MIN_FIT_DISTANCE },
        }
    }

    /// Degenerate bounds at the origin
    pub fn empty() -> Self {
        Self::from_aabb(AABB::new(Vec3::ZERO, Vec3::ZERO))
    }
}

/// Sole owner of the displayed model
#[derive(Debug, Clone)]
pub struct SceneHandle {
    pub graph: SceneGraph,
    pub root: NodeId,
    pub bounds: Bounds,
    pub classification: Classification,
    pub clip_names: Vec<String>,
    pub source: Option<String>,
    pub loaded_at: DateTime<Local>,
}

impl SceneHandle {
    /// Wrap the loaded roots under one model root and derive bounds and classification
    pub fn new(mut graph: SceneGraph, source: Option<String>) -> Self {
        let root = graph.wrap_roots(Node::group("Model"));
        let bounds = graph.bounds().map_or_else(Bounds::empty, Bounds::from_aabb);
        let classification = Classification::of(&graph);
        Self {
            graph,
            root,
            bounds,
            classification,
            clip_names: Vec::new(),
            source,
            loaded_at: Local::now(),
        }
    }

    /// Recompute classification after nodes changed kind or were added
    pub fn reclassify(&mut self) {
        self.classification = Classification::of(&self.graph);
    }

    /// Recompute bounds and classification after nodes were grafted in
    pub fn refresh(&mut self) {
        self.bounds = self.graph.bounds().map_or_else(Bounds::empty, Bounds::from_aabb);
        self.reclassify();
    }

    /// World position of the model root
    pub fn position(&self) -> Vec3 {
        self.graph
            .get(self.root)
            .map_or(Vec3::ZERO, |node| node.transform.translation)
    }
}
