//! The in-memory asset model.
//!
//! An [`Asset`] is a value holding every top-level glTF entity array plus one
//! designated root scene. Entities reference each other by index into the
//! owning asset's arrays, so cloning an entity into another asset and keeping
//! its indices is all the rewiring a transformation needs when array order is
//! preserved.

mod reader;
pub mod types;

pub use reader::AccessorReader;
pub use types::*;

use crate::math::{self, Mat4, Quat, Vec3};

/// A complete glTF asset value.
#[derive(Debug, Clone, Default)]
pub struct Asset {
    /// The `asset.generator` tag.
    pub generator: String,
    /// Binary buffers.
    pub buffers: Vec<Buffer>,
    /// Buffer views.
    pub views: Vec<BufferView>,
    /// Accessors.
    pub accessors: Vec<Accessor>,
    /// Images.
    pub images: Vec<Image>,
    /// Samplers.
    pub samplers: Vec<Sampler>,
    /// Textures.
    pub textures: Vec<Texture>,
    /// Materials.
    pub materials: Vec<Material>,
    /// Meshes.
    pub meshes: Vec<Mesh>,
    /// Nodes.
    pub nodes: Vec<Node>,
    /// Scenes.
    pub scenes: Vec<Scene>,
    /// Index of the root scene.
    pub scene: usize,
}

impl Asset {
    /// Evaluate the flattened predicate against a pipeline identifier:
    /// exactly one buffer, as many nodes as meshes, one primitive per mesh,
    /// a unique mesh reference on every node, and a matching generator tag.
    pub fn is_flattened(&self, generator: &str) -> bool {
        if self.buffers.len() != 1
            || self.nodes.len() != self.meshes.len()
            || self.generator != generator
        {
            return false;
        }
        if !self.meshes.iter().all(|m| m.primitives.len() == 1) {
            return false;
        }
        let mut seen = vec![false; self.meshes.len()];
        for node in &self.nodes {
            match node.mesh {
                Some(m) if m < seen.len() && !seen[m] => seen[m] = true,
                _ => return false,
            }
        }
        true
    }

    /// Compute the local transform matrix of a node.
    pub fn local_transform(node: &Node) -> Mat4 {
        match &node.transform {
            Transform::Trs {
                translation,
                rotation,
                scale,
            } => math::mat4_from_scale_rotation_translation(
                Vec3::new(scale[0], scale[1], scale[2]),
                Quat::new(rotation[3], rotation[0], rotation[1], rotation[2]),
                Vec3::new(translation[0], translation[1], translation[2]),
            ),
            Transform::Matrix(m) => math::mat4_from_cols_array(m),
        }
    }

    /// Compute the world transform of every node via the parent chain.
    ///
    /// Nodes unreachable from any parentless root (cyclic input) keep their
    /// local transform.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let count = self.nodes.len();
        let mut parent = vec![None; count];
        for (index, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child < count {
                    parent[child] = Some(index);
                }
            }
        }

        let mut worlds: Vec<Mat4> = self
            .nodes
            .iter()
            .map(Self::local_transform)
            .collect();

        // Depth-first from the parentless roots, multiplying parent into
        // child; the world table starts as locals so untouched nodes stay
        // consistent.
        let mut stack: Vec<usize> = (0..count).filter(|&i| parent[i].is_none()).collect();
        while let Some(index) = stack.pop() {
            let world = worlds[index];
            for &child in &self.nodes[index].children {
                if child < count && parent[child] == Some(index) {
                    worlds[child] = world * worlds[child];
                    stack.push(child);
                }
            }
        }
        worlds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_asset(generator: &str) -> Asset {
        Asset {
            generator: generator.to_string(),
            buffers: vec![Buffer::default()],
            meshes: vec![Mesh {
                name: None,
                primitives: vec![Primitive::default()],
            }],
            nodes: vec![Node {
                mesh: Some(0),
                ..Node::default()
            }],
            scenes: vec![Scene {
                name: None,
                nodes: vec![0],
            }],
            ..Asset::default()
        }
    }

    #[test]
    fn flattened_predicate_accepts_leaf_asset() {
        assert!(leaf_asset("gltfio").is_flattened("gltfio"));
    }

    #[test]
    fn flattened_predicate_checks_generator() {
        assert!(!leaf_asset("something-else").is_flattened("gltfio"));
    }

    #[test]
    fn flattened_predicate_rejects_multi_buffer() {
        let mut asset = leaf_asset("gltfio");
        asset.buffers.push(Buffer::default());
        assert!(!asset.is_flattened("gltfio"));
    }

    #[test]
    fn flattened_predicate_rejects_multi_primitive_mesh() {
        let mut asset = leaf_asset("gltfio");
        asset.meshes[0].primitives.push(Primitive::default());
        assert!(!asset.is_flattened("gltfio"));
    }

    #[test]
    fn flattened_predicate_rejects_shared_mesh() {
        let mut asset = leaf_asset("gltfio");
        asset.meshes.push(Mesh {
            name: None,
            primitives: vec![Primitive::default()],
        });
        asset.nodes.push(Node {
            mesh: Some(0),
            ..Node::default()
        });
        assert!(!asset.is_flattened("gltfio"));
    }

    #[test]
    fn world_transforms_compose_parent_chain() {
        let asset = Asset {
            nodes: vec![
                Node {
                    transform: Transform::Trs {
                        translation: [1.0, 0.0, 0.0],
                        rotation: [0.0, 0.0, 0.0, 1.0],
                        scale: [1.0, 1.0, 1.0],
                    },
                    children: vec![1],
                    ..Node::default()
                },
                Node {
                    transform: Transform::Trs {
                        translation: [0.0, 2.0, 0.0],
                        rotation: [0.0, 0.0, 0.0, 1.0],
                        scale: [1.0, 1.0, 1.0],
                    },
                    ..Node::default()
                },
            ],
            scenes: vec![Scene {
                name: None,
                nodes: vec![0],
            }],
            ..Asset::default()
        };

        let worlds = asset.world_transforms();
        let p = math::transform_point(&worlds[1], Vec3::zeros());
        assert!((p - Vec3::new(1.0, 2.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn world_transforms_apply_parent_scale() {
        let asset = Asset {
            nodes: vec![
                Node {
                    transform: Transform::Trs {
                        translation: [0.0, 0.0, 0.0],
                        rotation: [0.0, 0.0, 0.0, 1.0],
                        scale: [2.0, 2.0, 2.0],
                    },
                    children: vec![1],
                    ..Node::default()
                },
                Node {
                    transform: Transform::Trs {
                        translation: [1.0, 0.0, 0.0],
                        rotation: [0.0, 0.0, 0.0, 1.0],
                        scale: [1.0, 1.0, 1.0],
                    },
                    ..Node::default()
                },
            ],
            ..Asset::default()
        };

        let worlds = asset.world_transforms();
        let p = math::transform_point(&worlds[1], Vec3::new(1.0, 0.0, 0.0));
        // Parent scale applies to both the child translation and the point.
        assert!((p - Vec3::new(4.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
