// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::{CameraOverrides, ViewerOptions, ViewerOverrides};
use crate::error::Result;
use crate::shell::Startup;

#[derive(Parser, Debug, Clone)]
#[command(name = "model-viewer")]
#[command(about = "Interactive glTF and OBJ model viewer", long_about = None)]
pub struct Cli {
    /// Model to open (.gltf, .glb or .obj)
    pub model: Option<String>,

    /// JSON options file merged over the defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Extra model added to the loaded one
    #[arg(long)]
    pub object: Option<String>,

    /// Seconds of drawing after the last interaction
    #[arg(long = "life-time")]
    pub life_time: Option<f32>,

    /// Vertical field of view in degrees
    #[arg(long)]
    pub fov: Option<f32>,

    /// Initial camera position as x,y,z
    #[arg(long = "camera-position", value_parser = parse_vec3, allow_hyphen_values = true)]
    pub camera_position: Option<[f32; 3]>,

    /// Equirectangular .hdr environment map
    #[arg(long)]
    pub environment: Option<String>,

    /// Also show the environment map as the background
    #[arg(long = "environment-background", requires = "environment")]
    pub environment_background: bool,

    /// Disable UI elements
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Draw every material as wireframe
    #[arg(long)]
    pub wireframe: bool,

    /// Log at info level unless RUST_LOG says otherwise
    #[arg(long, short)]
    pub verbose: bool,
}

fn parse_vec3(value: &str) -> std::result::Result<[f32; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    <[f32; 3]>::try_from(parts).map_err(|parts| format!("expected x,y,z, got {} values", parts.len()))
}

impl Cli {
    /// Flags as overrides; absent flags leave the base untouched
    pub fn to_overrides(&self) -> ViewerOverrides {
        let camera = (self.fov.is_some() || self.camera_position.is_some()).then(|| CameraOverrides {
            fov: self.fov,
            position: self.camera_position,
            ..CameraOverrides::default()
        });
        ViewerOverrides {
            life_time: self.life_time,
            camera,
            wireframe: self.wireframe.then_some(true),
            ..ViewerOverrides::default()
        }
    }

    /// Config file (or defaults) with the flags merged on top
    pub fn options(&self) -> Result<ViewerOptions> {
        let base = match &self.config {
            Some(path) => ViewerOptions::from_json_file(path)?,
            None => ViewerOptions::default(),
        };
        let options = base.merge(&self.to_overrides());
        options.validate()?;
        Ok(options)
    }

    pub fn startup(&self) -> Startup {
        Startup {
            model: self.model.clone(),
            object: self.object.clone(),
            environment: self.environment.clone(),
            environment_background: self.environment_background,
            show_panel: !self.no_ui,
        }
    }
}
