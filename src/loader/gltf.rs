use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use glam::{Quat, Vec3};

use crate::animation::{AnimationClip, Channel, Interpolation, Keyframes};
use crate::camera::DEFAULT_FAR;
use crate::error::LoadError;
use crate::scene::{
    CameraNode, ColorSpace, Geometry, Light, LightKind, Material, MaterialKind, Mesh, Node,
    NodeId, NodeKind, SceneGraph, Skin, TextureRef, Transform,
};

use super::LoadedScene;

/// Decode a .gltf or .glb file with its buffers, clips and lights
///
/// External buffers and images are checked first so a missing file is
/// reported as a `MissingResource` instead of a parse failure.
pub fn load_gltf_file(path: impl AsRef<Path>) -> Result<LoadedScene> {
    let path = path.as_ref();
    check_external_resources(path)?;

    let (document, buffers, images) =
        gltf::import(path).with_context(|| format!("failed to load glTF file {}", path.display()))?;
    log::debug!(
        "glTF {}: {} nodes, {} meshes, {} animations, {} images",
        path.display(),
        document.nodes().count(),
        document.meshes().count(),
        document.animations().count(),
        images.len()
    );

    let mut builder = Builder::new(&buffers);
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("glTF file contains no scene")?;
    for node in scene.nodes() {
        builder.add_node(&node, None)?;
    }
    builder.attach_skins();

    let clips = document
        .animations()
        .enumerate()
        .map(|(index, animation)| builder.clip(index, &animation))
        .collect();

    Ok(LoadedScene {
        graph: builder.graph,
        clips,
    })
}

fn check_external_resources(path: &Path) -> Result<()> {
    let gltf = gltf::Gltf::open(path)
        .with_context(|| format!("failed to parse glTF file {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let buffer_uris = gltf.buffers().filter_map(|buffer| match buffer.source() {
        gltf::buffer::Source::Uri(uri) => Some(uri),
        gltf::buffer::Source::Bin => None,
    });
    let image_uris = gltf.images().filter_map(|image| match image.source() {
        gltf::image::Source::Uri { uri, .. } => Some(uri),
        gltf::image::Source::View { .. } => None,
    });

    for uri in buffer_uris.chain(image_uris) {
        if uri.starts_with("data:") {
            continue;
        }
        if !base.join(uri).exists() {
            let name = uri.rsplit('/').next().unwrap_or(uri);
            return Err(LoadError::missing_resource(path.display().to_string(), name).into());
        }
    }
    Ok(())
}

struct Builder<'a> {
    buffers: &'a [gltf::buffer::Data],
    graph: SceneGraph,
    ids: HashMap<usize, NodeId>,
    skins: Vec<(NodeId, Vec<usize>)>,
}

impl<'a> Builder<'a> {
    fn new(buffers: &'a [gltf::buffer::Data]) -> Self {
        Self {
            buffers,
            graph: SceneGraph::new(),
            ids: HashMap::new(),
            skins: Vec::new(),
        }
    }

    fn add_node(&mut self, node: &gltf::Node, parent: Option<NodeId>) -> Result<()> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform {
            translation: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        };
        let name = node.name().unwrap_or_default().to_string();

        let kind = if let Some(light) = node.light() {
            NodeKind::Light(convert_light(&light))
        } else if let Some(camera) = node.camera() {
            NodeKind::Camera(convert_camera(&camera))
        } else {
            NodeKind::Group
        };

        let mut primitives = match node.mesh() {
            Some(mesh) => self.primitives(&mesh)?,
            None => Vec::new(),
        };
        let single_mesh = matches!(kind, NodeKind::Group) && primitives.len() == 1;
        let kind = match primitives.pop() {
            Some(mesh) if single_mesh => NodeKind::Mesh(mesh),
            Some(mesh) => {
                primitives.push(mesh);
                kind
            }
            None => kind,
        };

        let id = self
            .graph
            .insert(Node::new(name.clone(), kind).with_transform(transform), parent);
        self.ids.insert(node.index(), id);

        let joints: Option<Vec<usize>> = node
            .skin()
            .map(|skin| skin.joints().map(|joint| joint.index()).collect());
        if single_mesh {
            if let Some(joints) = &joints {
                self.skins.push((id, joints.clone()));
            }
        }
        for (index, mesh) in primitives.into_iter().enumerate() {
            let child = self
                .graph
                .add_child(id, Node::mesh(format!("{name}_{index}"), mesh));
            if let Some(joints) = &joints {
                self.skins.push((child, joints.clone()));
            }
        }

        for child in node.children() {
            self.add_node(&child, Some(id))?;
        }
        Ok(())
    }

    fn primitives(&self, mesh: &gltf::Mesh) -> Result<Vec<Mesh>> {
        let mut meshes = Vec::new();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&self.buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                log::warn!("skipping primitive without positions in mesh {:?}", mesh.name());
                continue;
            };
            let positions = positions.map(Vec3::from_array).collect();
            let indices = reader
                .read_indices()
                .map(|indices| indices.into_u32().collect());

            let mut converted = Mesh::new(
                Geometry::new(positions, indices),
                convert_material(&primitive.material()),
            );
            converted.morph_targets = primitive.morph_targets().count();
            meshes.push(converted);
        }
        Ok(meshes)
    }

    fn attach_skins(&mut self) {
        for (mesh, joints) in std::mem::take(&mut self.skins) {
            let joints = joints
                .iter()
                .filter_map(|index| self.ids.get(index).copied())
                .collect();
            if let Some(mesh) = self.graph.get_mut(mesh).and_then(Node::as_mesh_mut) {
                mesh.skin = Some(Skin { joints });
            }
        }
    }

    fn clip(&self, index: usize, animation: &gltf::Animation) -> AnimationClip {
        let name = animation
            .name()
            .map_or_else(|| format!("Clip_{index}"), str::to_string);
        let channels = animation
            .channels()
            .filter_map(|channel| self.channel(&channel))
            .collect();
        AnimationClip::new(name, channels)
    }

    fn channel(&self, channel: &gltf::animation::Channel) -> Option<Channel> {
        use gltf::animation::util::ReadOutputs;

        let node = *self.ids.get(&channel.target().node().index())?;
        let reader = channel.reader(|buffer| Some(&self.buffers[buffer.index()]));
        let times: Vec<f32> = reader.read_inputs()?.collect();
        let (interpolation, cubic) = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => (Interpolation::Linear, false),
            gltf::animation::Interpolation::Step => (Interpolation::Step, false),
            gltf::animation::Interpolation::CubicSpline => (Interpolation::Linear, true),
        };
        let keyframes = match reader.read_outputs()? {
            ReadOutputs::Translations(values) => Keyframes::Translation(spline_values(
                values.map(Vec3::from_array).collect(),
                cubic,
            )),
            ReadOutputs::Rotations(values) => Keyframes::Rotation(spline_values(
                values.into_f32().map(Quat::from_array).collect(),
                cubic,
            )),
            ReadOutputs::Scales(values) => Keyframes::Scale(spline_values(
                values.map(Vec3::from_array).collect(),
                cubic,
            )),
            ReadOutputs::MorphTargetWeights(_) => return None,
        };
        Some(Channel {
            node,
            times,
            keyframes,
            interpolation,
        })
    }
}

/// Cubic spline outputs store in-tangent, value and out-tangent per key
fn spline_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.chunks(3).filter_map(|key| key.get(1).copied()).collect()
    } else {
        values
    }
}

fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, a] = pbr.base_color_factor();
    let texture = |info: gltf::texture::Info| TextureRef {
        name: info
            .texture()
            .name()
            .map_or_else(|| format!("texture_{}", info.texture().index()), str::to_string),
        color_space: ColorSpace::Srgb,
    };
    Material {
        name: material.name().unwrap_or_default().to_string(),
        kind: MaterialKind::Standard,
        color: Vec3::new(r, g, b),
        emissive: Vec3::from_array(material.emissive_factor()),
        opacity: a,
        transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        depth_write: true,
        wireframe: false,
        map: pbr.base_color_texture().map(texture),
        emissive_map: material.emissive_texture().map(texture),
    }
}

fn convert_light(light: &gltf::khr_lights_punctual::Light) -> Light {
    use gltf::khr_lights_punctual::Kind;

    let kind = match light.kind() {
        Kind::Directional => LightKind::Directional,
        Kind::Point => LightKind::Point,
        Kind::Spot { .. } => LightKind::Spot,
    };
    Light {
        kind,
        color: Vec3::from_array(light.color()),
        intensity: light.intensity(),
    }
}

fn convert_camera(camera: &gltf::Camera) -> CameraNode {
    match camera.projection() {
        gltf::camera::Projection::Perspective(perspective) => CameraNode {
            fov_degrees: perspective.yfov().to_degrees(),
            near: perspective.znear(),
            far: perspective.zfar().unwrap_or(DEFAULT_FAR),
        },
        gltf::camera::Projection::Orthographic(orthographic) => CameraNode {
            fov_degrees: 0.0,
            near: orthographic.znear(),
            far: orthographic.zfar(),
        },
    }
}
