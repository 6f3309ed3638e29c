//! Node tree and accessor bounds from glTF / GLB documents.
//!
//! Only the JSON part is read. Accessor min/max carry the bounds, so external
//! buffers and images never need to be resolved.

use gltf::Gltf;

use super::error::{AssetLoadError, Result};
use super::geometry::{AssetGeometry, GeometryNode};
use crate::components::Transform;
use crate::math::{Quat, Vec3, AABB};

/// Parse `.glb` or `.gltf` bytes into pickable geometry
pub fn parse_gltf(path: &str, bytes: &[u8]) -> Result<AssetGeometry> {
    let gltf = Gltf::from_slice(bytes).map_err(|source| AssetLoadError::Gltf {
        path: path.to_string(),
        source,
    })?;
    let document = &gltf.document;

    let roots: Vec<gltf::Node> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        // scene-less documents: every node nobody claims as a child
        None => {
            let mut claimed = vec![false; document.nodes().count()];
            for node in document.nodes() {
                for child in node.children() {
                    claimed[child.index()] = true;
                }
            }
            document.nodes().filter(|n| !claimed[n.index()]).collect()
        }
    };

    let mut geometry = AssetGeometry::default();
    let mut stack: Vec<(gltf::Node, Option<usize>)> =
        roots.into_iter().rev().map(|n| (n, None)).collect();
    // glTF forbids cycles, but a malformed file could still revisit a node
    let mut visited = vec![false; document.nodes().count()];

    while let Some((node, parent)) = stack.pop() {
        if std::mem::replace(&mut visited[node.index()], true) {
            continue;
        }
        let index = geometry.nodes.len();
        let (translation, rotation, scale) = node.transform().decomposed();

        geometry.nodes.push(GeometryNode {
            name: node
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("node{}", node.index())),
            local: Transform::new(
                Vec3::from(translation),
                Quat::from_array(rotation),
                Vec3::from(scale),
            ),
            parent,
            bounds: node.mesh().and_then(|mesh| {
                mesh.primitives()
                    .map(|p| {
                        let b = p.bounding_box();
                        AABB::new(Vec3::from(b.min), Vec3::from(b.max))
                    })
                    .reduce(|a, b| a.union(&b))
            }),
        });

        let children: Vec<_> = node.children().collect();
        for child in children.into_iter().rev() {
            stack.push((child, Some(index)));
        }
    }

    if geometry.mesh_count() == 0 {
        return Err(AssetLoadError::Empty(path.to_string()));
    }
    log::debug!(
        "parsed {path}: {} nodes, {} meshes",
        geometry.nodes.len(),
        geometry.mesh_count()
    );
    Ok(geometry)
}
