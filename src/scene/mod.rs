mod classify;
mod display;
mod graph;
mod handle;
mod node;

pub use classify::{Classification, Skeleton};
pub use display::{Background, EnvironmentTexture, Scene};
pub use graph::SceneGraph;
pub use handle::{Bounds, SceneHandle, FIT_FACTOR, MIN_FIT_DISTANCE};
pub use node::{
    CameraNode, ColorSpace, Geometry, Light, LightKind, LineSet, Material, MaterialKind, Mesh,
    Node, NodeId, NodeKind, SceneObject, Skin, TextureRef, Transform,
};
