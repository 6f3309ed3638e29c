use crate::components::Transform;
use crate::math::{Mat4, AABB};

/// One node of a loaded asset
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryNode {
    pub name: String,
    /// Transform relative to the parent node (or the module root)
    pub local: Transform,
    /// Index of the parent in `AssetGeometry::nodes`, always smaller than this node's
    pub parent: Option<usize>,
    /// Local-space mesh bounds, `None` for pure grouping nodes
    pub bounds: Option<AABB>,
}

/// Pickable shape of a module asset: its node tree and per-node mesh bounds
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetGeometry {
    pub nodes: Vec<GeometryNode>,
}

impl AssetGeometry {
    /// A single mesh node with the given bounds
    pub fn single_box(name: impl Into<String>, bounds: AABB) -> Self {
        Self {
            nodes: vec![GeometryNode {
                name: name.into(),
                local: Transform::identity(),
                parent: None,
                bounds: Some(bounds),
            }],
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.bounds.is_some()).count()
    }

    /// Node matrix relative to the module root
    pub fn node_matrix(&self, index: usize) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut cursor = Some(index);
        while let Some(i) = cursor {
            let node = &self.nodes[i];
            matrix = node.local.to_matrix() * matrix;
            cursor = node.parent;
        }
        matrix
    }

    /// Bounds of every mesh in module-root space
    pub fn bounds(&self) -> Option<AABB> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.bounds.map(|b| b.transformed(&self.node_matrix(i))))
            .reduce(|a, b| a.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn test_single_box() {
        let geometry = AssetGeometry::single_box("hull", AABB::unit_cube(Vec3::ZERO, Vec3::ONE));
        assert_eq!(geometry.mesh_count(), 1);
        assert_eq!(geometry.bounds(), Some(AABB::unit_cube(Vec3::ZERO, Vec3::ONE)));
    }

    #[test]
    fn test_bounds_follow_node_chain() {
        let geometry = AssetGeometry {
            nodes: vec![
                GeometryNode {
                    name: "root".into(),
                    local: Transform::from_position(Vec3::new(10.0, 0.0, 0.0)),
                    parent: None,
                    bounds: None,
                },
                GeometryNode {
                    name: "hatch".into(),
                    local: Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
                    parent: Some(0),
                    bounds: Some(AABB::unit_cube(Vec3::ZERO, Vec3::ONE)),
                },
            ],
        };

        assert_eq!(geometry.mesh_count(), 1);
        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.center(), Vec3::new(10.0, 2.0, 0.0));
    }

    #[test]
    fn test_empty_has_no_bounds() {
        assert!(AssetGeometry::default().bounds().is_none());
    }
}
