use std::any::Any;

use anyhow::Result;

use crate::config::{rgb, BackgroundOptions};
use crate::plugin::{Plugin, PluginContext, SceneData, Viewport};
use crate::scene::{Background, Scene};

/// Two-colour vertical gradient behind the model
#[derive(Debug)]
pub struct BackgroundShader {
    colors: BackgroundOptions,
    aspect: f32,
    /// Background in place before this plugin took over
    previous: Option<Background>,
}

impl BackgroundShader {
    pub const NAME: &'static str = "Shaders.Background";

    pub fn new(colors: BackgroundOptions) -> Self {
        Self {
            colors,
            aspect: 1.0,
            previous: None,
        }
    }

    pub fn colors(&self) -> BackgroundOptions {
        self.colors
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn is_shown(&self) -> bool {
        self.previous.is_some()
    }

    pub fn set_colors(&mut self, scene: &mut Scene, colors: BackgroundOptions) {
        self.colors = colors;
        if self.is_shown() {
            self.apply(scene);
        }
    }

    fn gradient(&self) -> Background {
        Background::Gradient {
            top: rgb(self.colors.color1),
            bottom: rgb(self.colors.color2),
        }
    }

    fn apply(&mut self, scene: &mut Scene) {
        let previous = std::mem::replace(&mut scene.background, self.gradient());
        if self.previous.is_none() {
            self.previous = Some(previous);
        }
    }

    fn restore(&mut self, scene: &mut Scene) {
        if let Some(previous) = self.previous.take() {
            scene.background = previous;
        }
    }
}

impl Plugin for BackgroundShader {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        let viewport = ctx.viewport;
        self.resize(ctx, viewport)
    }

    fn update(&mut self, ctx: &mut PluginContext<'_>, _data: &SceneData) -> Result<()> {
        self.show(ctx)
    }

    fn show(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.apply(ctx.scene);
        Ok(())
    }

    fn hide(&mut self, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.restore(ctx.scene);
        Ok(())
    }

    fn resize(&mut self, _ctx: &mut PluginContext<'_>, viewport: Viewport) -> Result<()> {
        if viewport.height > 0 {
            self.aspect = viewport.width as f32 / viewport.height as f32;
        }
        Ok(())
    }

    fn dispose(mut self: Box<Self>, ctx: &mut PluginContext<'_>) -> Result<()> {
        self.restore(ctx.scene);
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
    use glam::Vec3;

    #[test]
    fn show_and_hide_swap_the_background() {
        let mut fx = Fixture::new();
        let original = fx.scene.background.clone();
        let mut shader = BackgroundShader::new(BackgroundOptions {
            color1: 0xffffff,
            color2: 0x000000,
        });

        shader.show(&mut fx.ctx()).unwrap();
        shader.show(&mut fx.ctx()).unwrap();
        assert_eq!(
            fx.scene.background,
            Background::Gradient { top: Vec3::ONE, bottom: Vec3::ZERO }
        );

        shader.hide(&mut fx.ctx()).unwrap();
        assert_eq!(fx.scene.background, original);
    }

    #[test]
    fn set_colors_applies_only_while_shown() {
        let mut fx = Fixture::new();
        let original = fx.scene.background.clone();
        let mut shader = BackgroundShader::new(BackgroundOptions::default());
        let red = BackgroundOptions { color1: 0xff0000, color2: 0xff0000 };

        shader.set_colors(&mut fx.scene, red);
        assert_eq!(fx.scene.background, original);

        shader.show(&mut fx.ctx()).unwrap();
        assert_eq!(
            fx.scene.background,
            Background::Gradient { top: Vec3::X, bottom: Vec3::X }
        );
    }

    #[test]
    fn resize_tracks_aspect() {
        let mut fx = Fixture::new();
        let mut shader = BackgroundShader::new(BackgroundOptions::default());
        shader.initialize(&mut fx.ctx()).unwrap();
        assert!((shader.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }
}
