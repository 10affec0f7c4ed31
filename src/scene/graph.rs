use std::collections::HashMap;

use glam::Mat4;

use super::node::{Node, NodeId};
use crate::math::AABB;

/// Arena-backed node hierarchy
///
/// Ids stay valid until their node is removed; removed slots are never reused.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Option<Node>>,
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node under `parent`, or as a root when `parent` is `None` or gone
    pub fn insert(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.children.clear();
        let parent = parent.filter(|p| self.contains(*p));
        node.parent = parent;
        self.nodes.push(Some(node));

        match parent.and_then(|p| self.get_mut(p)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        self.insert(node, None)
    }

    pub fn add_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        self.insert(node, Some(parent))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Live node count
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Slot count, an upper bound for `NodeId::index`
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i), n)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Node)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .filter_map(|(i, n)| n.as_mut().map(|n| (NodeId(i), n)))
    }

    /// Pre-order traversal from every root, in insertion order
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                order.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// Remove a node and its whole subtree, returns the number removed
    pub fn remove(&mut self, id: NodeId) -> usize {
        let Some(node) = self.get(id) else {
            return 0;
        };
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.get_mut(parent) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// Put every current root under a fresh root node
    pub fn wrap_roots(&mut self, root: Node) -> NodeId {
        let previous = std::mem::take(&mut self.roots);
        let id = self.add(root);
        for child in &previous {
            if let Some(node) = self.get_mut(*child) {
                node.parent = Some(id);
            }
        }
        if let Some(node) = self.get_mut(id) {
            node.children = previous;
        }
        id
    }

    /// Move every node of `other` under `parent`, returns the new ids of its roots
    ///
    /// Skin joint references are rewritten to the new ids.
    pub fn graft(&mut self, mut other: SceneGraph, parent: NodeId) -> Vec<NodeId> {
        let mut remap = HashMap::new();
        let mut roots = Vec::new();
        for old in other.depth_first() {
            let Some(node) = other.nodes[old.0].take() else { continue };
            let new_parent = match node.parent {
                Some(p) => remap.get(&p).copied(),
                None => Some(parent),
            };
            let is_root = node.parent.is_none();
            let id = self.insert(node, new_parent);
            if is_root {
                roots.push(id);
            }
            remap.insert(old, id);
        }

        for id in remap.values() {
            let skin = self
                .get_mut(*id)
                .and_then(Node::as_mesh_mut)
                .and_then(|mesh| mesh.skin.as_mut());
            if let Some(skin) = skin {
                for joint in &mut skin.joints {
                    if let Some(new) = remap.get(joint) {
                        *joint = *new;
                    }
                }
            }
        }
        roots
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.get(*id).is_some_and(|n| n.name == name))
    }

    /// World matrix of one node
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.get(c)) {
            matrix = node.transform.matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// World matrices for every slot, indexed by `NodeId::index`
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut matrices = vec![Mat4::IDENTITY; self.nodes.len()];
        for id in self.depth_first() {
            let Some(node) = self.get(id) else { continue };
            let parent = node.parent.map_or(Mat4::IDENTITY, |p| matrices[p.0]);
            matrices[id.0] = parent * node.transform.matrix();
        }
        matrices
    }

    /// Visible when the node and all its ancestors are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.get(c)) {
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        self.contains(id)
    }

    /// World-space box around all geometry, `None` when there is none
    pub fn bounds(&self) -> Option<AABB> {
        let matrices = self.world_matrices();
        self.iter()
            .filter_map(|(id, node)| Some(node.local_bounds()?.transformed(&matrices[id.0])))
            .reduce(|a, b| a.union(&b))
    }
}
