//! Scenario tests driving whole pipeline operations through the facade.

mod parameterize_test;

use crate::asset::types::*;
use crate::asset::Asset;
use crate::atlas::{AtlasEngine, AtlasError, AtlasMesh, AtlasOptions, AtlasVertex, MeshDecl};

/// One triangle's worth of binary data: positions (3 x vec3 f32), UVs
/// (3 x vec2 f32), u16 indices.
fn tri_buffer(z: f32) -> Vec<u8> {
    let positions: Vec<f32> = vec![
        0.0, 0.0, z, //
        1.0, 0.0, z, //
        0.0, 1.0, z,
    ];
    let uvs: Vec<f32> = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    let indices: Vec<u16> = vec![0, 1, 2];

    let mut data = Vec::new();
    data.extend_from_slice(bytemuck::cast_slice(&positions));
    data.extend_from_slice(bytemuck::cast_slice(&uvs));
    data.extend_from_slice(bytemuck::cast_slice(&indices));
    data
}

/// A two-buffer source scene: a parent/child node chain with one triangle
/// mesh per buffer, plus a textured material on the first mesh.
///
/// Node 0 translates by (1, 0, 0) and holds mesh 0; its child translates by
/// a further (0, 1, 0) and holds mesh 1.
pub(super) fn two_buffer_scene() -> Asset {
    let stream = |buffer: usize, offset: usize, size: usize| BufferView {
        buffer,
        offset,
        size,
        stride: None,
        kind: None,
    };
    let accessor = |view: usize, component: ComponentType, element: ElementType, count| Accessor {
        view: Some(view),
        offset: 0,
        component,
        element,
        normalized: false,
        count,
        stride: 0,
        min: None,
        max: None,
        sparse: false,
    };
    let tri_prim = |pos: usize, uv: usize, idx: usize, material: Option<usize>| Primitive {
        topology: PrimitiveTopology::TriangleList,
        indices: Some(idx),
        material,
        attributes: vec![
            Attribute {
                semantic: Semantic::Position,
                set: 0,
                accessor: Some(pos),
            },
            Attribute {
                semantic: Semantic::TexCoord,
                set: 0,
                accessor: Some(uv),
            },
        ],
    };

    Asset {
        generator: "external-exporter".into(),
        buffers: vec![
            Buffer {
                name: None,
                uri: None,
                data: tri_buffer(0.0),
            },
            Buffer {
                name: None,
                uri: None,
                data: tri_buffer(1.0),
            },
        ],
        views: vec![
            stream(0, 0, 36),
            stream(0, 36, 24),
            stream(0, 60, 6),
            stream(1, 0, 36),
            stream(1, 36, 24),
            stream(1, 60, 6),
        ],
        accessors: vec![
            accessor(0, ComponentType::F32, ElementType::Vec3, 3),
            accessor(1, ComponentType::F32, ElementType::Vec2, 3),
            accessor(2, ComponentType::U16, ElementType::Scalar, 3),
            accessor(3, ComponentType::F32, ElementType::Vec3, 3),
            accessor(4, ComponentType::F32, ElementType::Vec2, 3),
            accessor(5, ComponentType::U16, ElementType::Scalar, 3),
        ],
        images: vec![Image {
            name: Some("base".into()),
            uri: Some("base.png".into()),
            view: None,
            mime_type: None,
        }],
        samplers: vec![Sampler::default()],
        textures: vec![Texture {
            name: None,
            image: Some(0),
            sampler: Some(0),
        }],
        materials: vec![Material {
            name: Some("painted".into()),
            base_color_texture: Some(TextureSlot {
                texture: 0,
                tex_coord: 0,
            }),
            ..Material::default()
        }],
        meshes: vec![
            Mesh {
                name: Some("near".into()),
                primitives: vec![tri_prim(0, 1, 2, Some(0))],
            },
            Mesh {
                name: Some("far".into()),
                primitives: vec![tri_prim(3, 4, 5, None)],
            },
        ],
        nodes: vec![
            Node {
                name: Some("parent".into()),
                transform: Transform::Trs {
                    translation: [1.0, 0.0, 0.0],
                    rotation: [0.0, 0.0, 0.0, 1.0],
                    scale: [1.0, 1.0, 1.0],
                },
                mesh: Some(0),
                children: vec![1],
            },
            Node {
                name: Some("child".into()),
                transform: Transform::Trs {
                    translation: [0.0, 1.0, 0.0],
                    rotation: [0.0, 0.0, 0.0, 1.0],
                    scale: [1.0, 1.0, 1.0],
                },
                mesh: Some(1),
                children: Vec::new(),
            },
        ],
        scenes: vec![Scene {
            name: Some("main".into()),
            nodes: vec![0],
        }],
        scene: 0,
    }
}

/// Deterministic atlas engine: one output vertex per input vertex, UV from
/// the position's xy.
#[derive(Default)]
pub(super) struct IdentityAtlas {
    meshes: Vec<AtlasMesh>,
}

impl AtlasEngine for IdentityAtlas {
    fn add_mesh(&mut self, decl: &MeshDecl<'_>) -> Result<(), AtlasError> {
        let vertices = (0..decl.vertex_count)
            .map(|i| {
                let p = decl.position(i as usize);
                AtlasVertex {
                    xref: i,
                    uv: [p[0], p[1]],
                }
            })
            .collect();
        let indices = (0..decl.index_count)
            .map(|i| decl.index(i as usize))
            .collect();
        self.meshes.push(AtlasMesh { vertices, indices });
        Ok(())
    }

    fn generate(&mut self, _options: &AtlasOptions) -> Result<Vec<AtlasMesh>, AtlasError> {
        Ok(std::mem::take(&mut self.meshes))
    }
}
