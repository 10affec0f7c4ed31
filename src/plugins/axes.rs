use std::any::Any;

use anyhow::Result;
use glam::Vec3;

use crate::plugin::{Plugin, PluginContext, SceneData};
use crate::scene::{LineSet, Node, NodeId, Transform};

const AXES: [(&str, Vec3, Vec3); 3] = [
    ("Axis_X", Vec3::X, Vec3::new(1.0, 0.0, 0.0)),
    ("Axis_Y", Vec3::Y, Vec3::new(0.0, 1.0, 0.0)),
    ("Axis_Z", Vec3::Z, Vec3::new(0.0, 0.0, 1.0)),
];

/// Red/green/blue tripod at the origin
#[derive(Debug)]
pub struct AxesHelper {
    tripod: Option<NodeId>,
    scale: Vec3,
    visible: bool,
}

impl AxesHelper {
    pub const NAME: &'static str = "Helpers.Axes";

    pub fn new() -> Self {
        Self {
            tripod: None,
            scale: Vec3::ONE,
            visible: true,
        }
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn node(&self) -> Option<NodeId> {
        self.tripod
    }
}

impl Default for AxesHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for AxesHelper {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        if self.tripod.is_some() {
            return Ok(());
        }
        let tripod = ctx.scene.add_overlay(Node::group(Self::NAME));
        for (name, axis, color) in AXES {
            ctx.scene.add_overlay_child(tripod, Node::lines(name, LineSet::new(vec![[Vec3::ZERO, axis]], color)));
        }
        self.tripod = Some(tripod);
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, data: &SceneData) -> Result<()> {
        let Some(bounds) = data.bounds else {
            return Ok(());
        };
        let scale = Vec3::splat(bounds.size.max_element().max(f32::EPSILON) * 2.0);
        if scale == self.scale {
            return Ok(());
        }
        self.scale = scale;
        if let Some(node) = self.tripod.and_then(|id| ctx.scene.overlays_mut().get_mut(id)) {
            node.transform = Transform {
                scale,
                ..Transform::IDENTITY
            };
        }
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = true;
        if let Some(tripod) = self.tripod {
            ctx.scene.set_overlay_visible(tripod, true);
        }
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = false;
        if let Some(tripod) = self.tripod {
            ctx.scene.set_overlay_visible(tripod, false);
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.tripod);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::AABB;
    use crate::plugins::testing::Fixture;
    use crate::scene::Bounds;

    #[test]
    fn initialize_is_idempotent() {
        let mut fx = Fixture::new();
        let mut axes = AxesHelper::new();
        axes.initialize(&mut fx.ctx()).unwrap();
        axes.initialize(&mut fx.ctx()).unwrap();
        assert_eq!(fx.scene.overlays().len(), 4);
    }

    #[test]
    fn tripod_is_twice_the_largest_extent() {
        let mut fx = Fixture::new();
        let mut axes = AxesHelper::new();
        axes.initialize(&mut fx.ctx()).unwrap();
        let data = SceneData {
            bounds: Some(Bounds::from_aabb(AABB::new(Vec3::ZERO, Vec3::new(1.0, 3.0, 2.0)))),
            ..SceneData::default()
        };
        axes.update(&mut fx.ctx(), &data).unwrap();

        assert_eq!(axes.scale(), Vec3::splat(6.0));
        let node = fx.scene.overlays().get(axes.node().unwrap()).unwrap();
        assert_eq!(node.transform.scale, Vec3::splat(6.0));
    }
}
