use std::any::Any;

use anyhow::Result;
use glam::Vec3;

use crate::config::{rgb, LightingOptions};
use crate::plugin::{Plugin, PluginContext, SceneData};
use crate::scene::{Light, LightKind, Node, NodeId, Transform};

/// Unit offsets of the directional lights: front, back-left, top-right
const DIRECTIONAL_OFFSETS: [Vec3; 3] = [
    Vec3::new(0.0, 0.5, 1.0),
    Vec3::new(-1.0, 0.5, -1.0),
    Vec3::new(1.0, 1.0, 0.0),
];

/// Default lighting for models that bring none of their own
#[derive(Debug)]
pub struct Lighter {
    options: LightingOptions,
    rig: Option<NodeId>,
    visible: bool,
}

impl Lighter {
    pub const NAME: &'static str = "Lighter";

    pub fn new(options: LightingOptions) -> Self {
        Self {
            options,
            rig: None,
            visible: true,
        }
    }

    /// Whether the default rig is currently in the scene
    pub fn is_installed(&self) -> bool {
        self.rig.is_some()
    }

    pub fn rig(&self) -> Option<NodeId> {
        self.rig
    }

    fn install(&mut self, ctx: &mut PluginContext<'_>, distance: f32) {
        let rig = ctx.scene.add_overlay(Node::group("Lighter"));
        ctx.scene.add_overlay_child(
            rig,
            Node::light(
                "Ambient_Light",
                Light {
                    kind: LightKind::Ambient,
                    color: rgb(self.options.ambient_color),
                    intensity: self.options.ambient_intensity,
                },
            ),
        );
        for (i, offset) in DIRECTIONAL_OFFSETS.iter().enumerate() {
            let light = Node::light(
                format!("Directional_Light {}", i + 1),
                Light {
                    kind: LightKind::Directional,
                    color: rgb(self.options.directional_color),
                    intensity: self.options.directional_intensity,
                },
            )
            .with_transform(Transform::from_translation(*offset * distance));
            ctx.scene.add_overlay_child(rig, light);
        }
        ctx.scene.set_overlay_visible(rig, self.visible);
        self.rig = Some(rig);
    }
}

impl Plugin for Lighter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, data: &SceneData) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.rig);
        if data.classification.has_lights() {
            log::debug!("[plugin:{}] model brings its own lights", Self::NAME);
            return Ok(());
        }
        let distance = data.bounds.map_or(10.0, |b| b.fit_distance);
        self.install(ctx, distance);
        Ok(())
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = true;
        if let Some(rig) = self.rig {
            ctx.scene.set_overlay_visible(rig, true);
        }
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.visible = false;
        if let Some(rig) = self.rig {
            ctx.scene.set_overlay_visible(rig, false);
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        super::remove_overlay(ctx.scene, &mut self.rig);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
