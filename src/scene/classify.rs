use super::graph::SceneGraph;
use super::node::{NodeId, NodeKind, SceneObject};

/// Joints driven by one skinned mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub mesh: NodeId,
    pub joints: Vec<NodeId>,
}

/// Nodes of a loaded model grouped by capability, in traversal order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub lights: Vec<NodeId>,
    pub cameras: Vec<NodeId>,
    pub meshes: Vec<NodeId>,
    pub morphs: Vec<NodeId>,
    pub skeletons: Vec<Skeleton>,
}

impl Classification {
    /// Walk the graph once and sort every node into its lists
    pub fn of(graph: &SceneGraph) -> Self {
        let mut out = Self::default();
        for id in graph.depth_first() {
            let Some(node) = graph.get(id) else { continue };
            if node.is_light() {
                out.lights.push(id);
            } else if node.is_camera() {
                out.cameras.push(id);
            } else if node.is_mesh() {
                out.meshes.push(id);
                if node.has_morph_targets() {
                    out.morphs.push(id);
                }
                if let NodeKind::Mesh(mesh) = &node.kind {
                    if let Some(skin) = &mesh.skin {
                        out.skeletons.push(Skeleton {
                            mesh: id,
                            joints: skin.joints.clone(),
                        });
                    }
                }
            }
        }
        out
    }

    pub fn has_lights(&self) -> bool {
        !self.lights.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::node::{CameraNode, Geometry, Light, LightKind, Material, Mesh, Node, Skin};
    use glam::Vec3;

    #[test]
    fn classifies_by_capability() {
        let mut graph = SceneGraph::new();
        let root = graph.add(Node::group("root"));
        let joint = graph.add_child(root, Node::group("hip"));
        let mut skinned = Mesh::new(Geometry::cuboid(Vec3::ONE), Material::default());
        skinned.skin = Some(Skin { joints: vec![joint] });
        let body = graph.add_child(root, Node::mesh("body", skinned));
        let mut morphing = Mesh::new(Geometry::cuboid(Vec3::ONE), Material::default());
        morphing.morph_targets = 3;
        let face = graph.add_child(root, Node::mesh("face", morphing));
        let sun = graph.add_child(
            root,
            Node::light("sun", Light { kind: LightKind::Directional, color: Vec3::ONE, intensity: 1.0 }),
        );
        let cam = graph.add_child(
            root,
            Node::new("", NodeKind::Camera(CameraNode { fov_degrees: 50.0, near: 0.1, far: 100.0 })),
        );

        let classes = Classification::of(&graph);
        assert_eq!(classes.meshes, vec![body, face]);
        assert_eq!(classes.morphs, vec![face]);
        assert_eq!(classes.skeletons, vec![Skeleton { mesh: body, joints: vec![joint] }]);
        assert_eq!(classes.lights, vec![sun]);
        assert_eq!(classes.cameras, vec![cam]);
    }

    #[test]
    fn empty_graph_has_empty_lists() {
        let classes = Classification::of(&SceneGraph::new());
        assert_eq!(classes, Classification::default());
        assert!(!classes.has_lights());
    }
}
