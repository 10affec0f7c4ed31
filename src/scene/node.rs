use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::math::AABB;

/// Stable index of a node inside one `SceneGraph`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Local translation, rotation and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Colour space tag carried by textures and the output surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Srgb,
    Linear,
}

/// Triangle soup with optional index buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self { positions, indices }
    }

    /// Axis-aligned box centred at the origin
    pub fn cuboid(size: Vec3) -> Self {
        let h = size * 0.5;
        let positions = AABB::new(-h, h).corners().to_vec();
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self::new(positions, Some(indices))
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Triangles in local space; out-of-range indices are skipped
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let count = self.triangle_count();
        (0..count).filter_map(move |i| {
            let corner = |k: usize| -> Option<Vec3> {
                let index = match &self.indices {
                    Some(indices) => *indices.get(i * 3 + k)? as usize,
                    None => i * 3 + k,
                };
                self.positions.get(index).copied()
            };
            Some([corner(0)?, corner(1)?, corner(2)?])
        })
    }

    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.positions.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureRef {
    pub name: String,
    pub color_space: ColorSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Basic,
    Lambert,
    Phong,
    Standard,
    Physical,
}

impl MaterialKind {
    /// Kinds that have an emissive term
    pub fn is_lit(self) -> bool {
        !matches!(self, MaterialKind::Basic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    pub color: Vec3,
    pub emissive: Vec3,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    pub wireframe: bool,
    pub map: Option<TextureRef>,
    pub emissive_map: Option<TextureRef>,
}

impl Material {
    pub fn standard(color: Vec3) -> Self {
        Self {
            name: String::new(),
            kind: MaterialKind::Standard,
            color,
            emissive: Vec3::ZERO,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            wireframe: false,
            map: None,
            emissive_map: None,
        }
    }

    pub fn textures_mut(&mut self) -> impl Iterator<Item = &mut TextureRef> {
        self.map.iter_mut().chain(self.emissive_map.iter_mut())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(Vec3::splat(0.8))
    }
}

/// Joint list of a skinned mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    pub joints: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub skin: Option<Skin>,
    pub morph_targets: usize,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry: Arc::new(geometry),
            material,
            skin: None,
            morph_targets: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
    Spot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Vec3,
    pub intensity: f32,
}

/// Camera authored inside a model file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraNode {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

/// Line segments for helpers and indicators
#[derive(Debug, Clone, PartialEq)]
pub struct LineSet {
    pub segments: Vec<[Vec3; 2]>,
    pub color: Vec3,
    /// Stroke width in pixels
    pub width: u32,
}

impl LineSet {
    pub fn new(segments: Vec<[Vec3; 2]>, color: Vec3) -> Self {
        Self {
            segments,
            color,
            width: 1,
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width.max(1);
        self
    }
}

/// What a node is; one variant per capability
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    Light(Light),
    Camera(CameraNode),
    Lines(LineSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    pub fn lines(name: impl Into<String>, lines: LineSet) -> Self {
        Self::new(name, NodeKind::Lines(lines))
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Local-space extent of the node's own geometry
    pub fn local_bounds(&self) -> Option<AABB> {
        match &self.kind {
            NodeKind::Mesh(mesh) => mesh.geometry.bounds(),
            NodeKind::Lines(lines) => AABB::from_points(lines.segments.iter().flatten().copied()),
            _ => None,
        }
    }
}

/// Capability queries used when classifying a loaded scene
pub trait SceneObject {
    fn is_light(&self) -> bool;
    fn is_camera(&self) -> bool;
    fn is_mesh(&self) -> bool;
    fn is_skinned(&self) -> bool;
    fn has_morph_targets(&self) -> bool;
}

impl SceneObject for Node {
    fn is_light(&self) -> bool {
        matches!(self.kind, NodeKind::Light(_))
    }

    fn is_camera(&self) -> bool {
        matches!(self.kind, NodeKind::Camera(_))
    }

    fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    fn is_skinned(&self) -> bool {
        self.as_mesh().is_some_and(|mesh| mesh.skin.is_some())
    }

    fn has_morph_targets(&self) -> bool {
        self.as_mesh().is_some_and(|mesh| mesh.morph_targets > 0)
    }
}
