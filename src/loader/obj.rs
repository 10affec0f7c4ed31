use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use ::obj::ObjData;

use crate::scene::{Geometry, Material, Mesh, Node, SceneGraph};

/// Decode a Wavefront OBJ file, one mesh node per `o` object
pub fn load_obj_file(path: impl AsRef<Path>) -> Result<SceneGraph> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut graph = SceneGraph::new();
    for node in decode(BufReader::new(file), &file_stem(path))? {
        graph.add(node);
    }
    Ok(graph)
}

fn decode(reader: impl Read, fallback_name: &str) -> Result<Vec<Node>> {
    let data = ObjData::load_buf(reader).context("invalid OBJ content")?;
    let positions: Vec<Vec3> = data.position.iter().copied().map(Vec3::from_array).collect();

    let mut nodes = Vec::new();
    for object in &data.objects {
        let mut indices = Vec::new();
        for polygon in object.groups.iter().flat_map(|group| &group.polys) {
            let corners = &polygon.0;
            // fan triangulation of convex faces
            for i in 1..corners.len().saturating_sub(1) {
                for tuple in [&corners[0], &corners[i], &corners[i + 1]] {
                    if tuple.0 >= positions.len() {
                        bail!("face references vertex {} of {}", tuple.0 + 1, positions.len());
                    }
                    indices.push(u32::try_from(tuple.0).context("vertex index overflow")?);
                }
            }
        }
        if indices.is_empty() {
            continue;
        }
        let name = if object.name.is_empty() || object.name == "default" {
            fallback_name.to_string()
        } else {
            object.name.clone()
        };
        log::debug!("obj: {name}, {} triangles", indices.len() / 3);
        let geometry = Geometry::new(positions.clone(), Some(indices));
        nodes.push(Node::mesh(name, Mesh::new(geometry, Material::default())));
    }
    Ok(nodes)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Object".to_string())
}
