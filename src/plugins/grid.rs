use std::any::Any;

use anyhow::Result;
use glam::Vec3;

use crate::config::rgb;
use crate::plugin::{Plugin, PluginContext, SceneData};
use crate::scene::{LineSet, Node, NodeId, Transform};

/// Ground grid drawn under the model
#[derive(Debug)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub grid_color: u32,
    pub center_line_color: u32,
    grid: Option<NodeId>,
    visible: bool,
}

impl Default for GridHelper {
    fn default() -> Self {
        Self {
            size: 200.0,
            divisions: 10,
            grid_color: 0x999999,
            center_line_color: 0xcccccc,
            grid: None,
            visible: true,
        }
    }
}

/// Square grid on the XZ plane centred at the origin
pub fn grid_lines(size: f32, divisions: u32) -> Vec<[Vec3; 2]> {
    let divisions = divisions.max(1);
    let half = size / 2.0;
    let step = size / divisions as f32;
    let mut segments = Vec::with_capacity(2 * (divisions as usize + 1));
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        segments.push([Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)]);
        segments.push([Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)]);
    }
    segments
}

impl GridHelper {
    pub const NAME: &'static str = "Helpers.Grid";

    pub fn node(&self) -> Option<NodeId> {
        self.grid
    }
}

impl Plugin for GridHelper {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, data: &SceneData) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.grid);

        // Fine lines first so the coarse ones draw over them
        let mut transform = Transform::IDENTITY;
        if let Some(bounds) = data.bounds {
            transform.scale = Vec3::splat(bounds.fit_distance * 2.0 / self.size);
            transform.translation = Vec3::new(bounds.center.x, bounds.aabb.min.y, bounds.center.z);
        }
        let grid = ctx.scene.add_overlay(Node::group(Self::NAME).with_transform(transform));
        ctx.scene.add_overlay_child(
            grid,
            Node::lines(
                "Grid_Fine",
                LineSet::new(grid_lines(self.size, self.divisions * 5), rgb(self.center_line_color)),
            ),
        );
        ctx.scene.add_overlay_child(
            grid,
            Node::lines(
                "Grid_Coarse",
                LineSet::new(grid_lines(self.size, self.divisions), rgb(self.grid_color)),
            ),
        );
        ctx.scene.set_overlay_visible(grid, self.visible);
        self.grid = Some(grid);
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = true;
        if let Some(grid) = self.grid {
            ctx.scene.set_overlay_visible(grid, true);
        }
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = false;
        if let Some(grid) = self.grid {
            ctx.scene.set_overlay_visible(grid, false);
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.grid);
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
    use crate::plugins::testing::Fixture;
    use crate::scene::Bounds;
    use crate::math::AABB;
    use approx::assert_relative_eq;

    #[test]
    fn line_count_follows_divisions() {
        let lines = grid_lines(200.0, 10);
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[0], [Vec3::new(-100.0, 0.0, -100.0), Vec3::new(100.0, 0.0, -100.0)]);
    }

    #[test]
    fn update_scales_grid_to_model() {
        let mut fx = Fixture::new();
        let mut grid = GridHelper::default();
        let bounds = Bounds::from_aabb(AABB::new(Vec3::splat(-1.0), Vec3::splat(1.0)));
        let data = SceneData {
            bounds: Some(bounds),
            ..SceneData::default()
        };
        grid.update(&mut fx.ctx(), &data).unwrap();
        let node = fx.scene.overlays().get(grid.node().unwrap()).unwrap();
        assert_relative_eq!(node.transform.scale.x, 12.0 / 200.0);
        assert_eq!(node.transform.translation, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(node.children().len(), 2);

        grid.update(&mut fx.ctx(), &data).unwrap();
        assert_eq!(fx.scene.overlays().roots().len(), 1);
    }

    #[test]
    fn hidden_grid_stays_hidden_across_updates() {
        let mut fx = Fixture::new();
        let mut grid = GridHelper::default();
        grid.hide(&mut fx.ctx()).unwrap();
        grid.update(&mut fx.ctx(), &SceneData::default()).unwrap();
        assert!(!fx.scene.overlays().is_visible(grid.node().unwrap()));
    }
}
