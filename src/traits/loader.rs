use crate::loader::{LoadHandle, LoadedScene};
use crate::scene::{EnvironmentTexture, SceneGraph};

/// Resolves model and environment URLs asynchronously
///
/// Every handle reports zero or more progress events and then exactly one result.
pub trait AssetLoader {
    /// Model plus its animation clips
    fn load_scene(&mut self, url: &str) -> LoadHandle<LoadedScene>;

    /// Standalone object without clips
    fn load_object(&mut self, url: &str) -> LoadHandle<SceneGraph>;

    /// Equirectangular environment map
    fn load_environment(&mut self, url: &str) -> LoadHandle<EnvironmentTexture>;
}
