//! UV atlas parameterization.
//!
//! Feeds every mesh of a flattened asset to an [`AtlasEngine`], then rebuilds
//! the asset around the engine's output: a consolidated buffer laid out as
//! `[interleaved vertices: mesh 0..N-1][indices: mesh 0..N-1]`, with every
//! source attribute re-emitted as f32 into the interleaved stride and a new
//! baked-UV attribute appended per vertex.

use crate::asset::types::*;
use crate::asset::{AccessorReader, Asset};
use crate::atlas::{AtlasEngine, AtlasOptions, MeshDecl, VertexStream};
use crate::error::{Malformed, PipelineError};

fn fail(mesh: &Mesh, reason: impl Into<String>) -> PipelineError {
    PipelineError::ParameterizationFailed {
        mesh: mesh.name.clone().unwrap_or_default(),
        reason: reason.into(),
    }
}

/// Borrow the byte region an accessor reads through, from its first element.
fn stream<'a>(source: &'a Asset, accessor: usize) -> Result<VertexStream<'a>, PipelineError> {
    let acc = &source.accessors[accessor];
    let view_index = acc.view.ok_or(Malformed::MissingView { accessor })?;
    let view = source
        .views
        .get(view_index)
        .ok_or(Malformed::DanglingReference {
            entity: "buffer view",
            index: view_index,
        })?;
    let buffer = source
        .buffers
        .get(view.buffer)
        .ok_or(Malformed::DanglingReference {
            entity: "buffer",
            index: view.buffer,
        })?;
    let start = view.offset + acc.offset;
    if start > buffer.data.len() {
        return Err(Malformed::OutOfBounds { accessor }.into());
    }
    Ok(VertexStream {
        data: &buffer.data[start..],
        stride: acc.effective_stride(),
    })
}

/// Compute a second, non-overlapping UV set for every primitive of a
/// flattened asset and rebuild the asset around it.
///
/// The new attribute is tagged `TEXCOORD_{baked_uv_set}`. The engine value is
/// consumed by this call and dropped before it returns, including on error.
pub fn parameterize_asset<E: AtlasEngine>(
    source: &Asset,
    mut engine: E,
    options: &AtlasOptions,
    baked_uv_set: u32,
    generator: &str,
) -> Result<Asset, PipelineError> {
    if !source.is_flattened(generator) {
        return Err(Malformed::NotFlattened.into());
    }

    let num_prims = source.meshes.len();

    // Feed the engine one declaration per mesh.
    for mesh in &source.meshes {
        let prim = &mesh.primitives[0];

        let mut positions = None;
        let mut normals = None;
        let mut uvs = None;
        for attr in &prim.attributes {
            // Only set-0 channels with readable f32 components are useful to
            // the engine.
            if attr.set != 0 {
                continue;
            }
            let Some(index) = attr.accessor else {
                continue;
            };
            let Some(acc) = source.accessors.get(index) else {
                return Err(Malformed::DanglingReference {
                    entity: "accessor",
                    index,
                }
                .into());
            };
            if acc.component != ComponentType::F32 || acc.view.is_none() {
                continue;
            }
            match attr.semantic {
                Semantic::Position => positions = Some(index),
                Semantic::Normal => normals = Some(index),
                Semantic::TexCoord => uvs = Some(index),
                _ => {}
            }
        }

        let positions = positions.ok_or_else(|| fail(mesh, "primitive has no POSITION attribute"))?;
        let indices = prim
            .indices
            .ok_or_else(|| fail(mesh, "primitive has no indices"))?;

        let position_count = source.accessors[positions].count;
        let index_count = source.accessors[indices].count;

        let index_stream = stream(source, indices)?;
        if index_stream.data.len() < index_count * 4 {
            return Err(Malformed::OutOfBounds { accessor: indices }.into());
        }

        let decl = MeshDecl {
            vertex_count: position_count as u32,
            positions: VertexStream {
                // Flattening guarantees packed f32 vec3 positions.
                stride: 12,
                ..stream(source, positions)?
            },
            normals: match normals {
                Some(a) => Some(stream(source, a)?),
                None => None,
            },
            uvs: match uvs {
                Some(a) => Some(stream(source, a)?),
                None => None,
            },
            index_count: index_count as u32,
            index_data: &index_stream.data[..index_count * 4],
        };
        engine.add_mesh(&decl).map_err(|e| fail(mesh, e.0))?;
    }

    log::info!("computing and packing charts for {num_prims} meshes");
    let atlas = engine
        .generate(options)
        .map_err(|e| PipelineError::ParameterizationFailed {
            mesh: String::new(),
            reason: e.0,
        })?;
    if atlas.len() != num_prims {
        return Err(PipelineError::ParameterizationFailed {
            mesh: String::new(),
            reason: format!("engine returned {} meshes for {num_prims} inputs", atlas.len()),
        });
    }
    log::info!(
        "atlas produced {} vertices, {} triangles",
        atlas.iter().map(|m| m.vertices.len()).sum::<usize>(),
        atlas.iter().map(|m| m.indices.len()).sum::<usize>() / 3
    );

    // Size the consolidated buffer: interleaved vertex floats, then indices.
    let mut floats_per_vert = Vec::with_capacity(num_prims);
    let mut num_floats = 0usize;
    let mut num_indices = 0usize;
    for (mesh, out) in source.meshes.iter().zip(&atlas) {
        let prim = &mesh.primitives[0];
        let mut floats = 0usize;
        for attr in &prim.attributes {
            let index = attr
                .accessor
                .ok_or_else(|| fail(mesh, "attribute without accessor"))?;
            let acc = source
                .accessors
                .get(index)
                .ok_or(Malformed::DanglingReference {
                    entity: "accessor",
                    index,
                })?;
            floats += acc.element.float_count();
        }
        floats += 2;
        floats_per_vert.push(floats);
        num_floats += out.vertices.len() * floats;
        num_indices += out.indices.len();
    }

    // Populate the interleaved vertex region, sampling each source attribute
    // at the atlas vertex's xref and appending the baked UV.
    let reader = AccessorReader::new(source);
    let mut vertex_floats = Vec::with_capacity(num_floats);
    let mut scratch = [0.0f32; 16];
    for (mesh, out) in source.meshes.iter().zip(&atlas) {
        let prim = &mesh.primitives[0];
        for vertex in &out.vertices {
            for attr in &prim.attributes {
                let accessor = attr.accessor.expect("attribute counted above");
                let lanes = source.accessors[accessor].element.float_count();
                reader.read_float(accessor, vertex.xref as usize, &mut scratch[..lanes])?;
                vertex_floats.extend_from_slice(&scratch[..lanes]);
            }
            vertex_floats.push(vertex.uv[0]);
            vertex_floats.push(vertex.uv[1]);
        }
    }

    let mut index_data = Vec::with_capacity(num_indices);
    for out in &atlas {
        index_data.extend_from_slice(&out.indices);
    }

    let mut data = Vec::with_capacity(4 * (num_floats + num_indices));
    data.extend_from_slice(bytemuck::cast_slice(&vertex_floats));
    data.extend_from_slice(bytemuck::cast_slice(&index_data));

    // Two views per primitive (interleaved vertices + indices), then one
    // accessor per source attribute, one for the baked UV, one for indices.
    let mut views = Vec::with_capacity(num_prims * 2);
    let mut accessors = Vec::new();
    let mut meshes = Vec::with_capacity(num_prims);

    let mut vertex_offset = 0usize;
    let mut index_offset = num_floats * 4;
    for (i, (mesh, out)) in source.meshes.iter().zip(&atlas).enumerate() {
        let prim = &mesh.primitives[0];
        let stride = floats_per_vert[i] * 4;
        let vertex_count = out.vertices.len();
        let index_count = out.indices.len();

        let vertex_view = views.len();
        views.push(BufferView {
            buffer: 0,
            offset: vertex_offset,
            size: vertex_count * stride,
            stride: Some(stride),
            kind: Some(BufferViewKind::Vertices),
        });
        let index_view = views.len();
        views.push(BufferView {
            buffer: 0,
            offset: index_offset,
            size: index_count * 4,
            stride: None,
            kind: Some(BufferViewKind::Indices),
        });
        vertex_offset += vertex_count * stride;
        index_offset += index_count * 4;

        let base = accessors.len();
        let mut attributes = Vec::with_capacity(prim.attributes.len() + 1);
        let mut byte_offset = 0usize;
        for (k, attr) in prim.attributes.iter().enumerate() {
            let src = &source.accessors[attr.accessor.expect("attribute counted above")];
            accessors.push(Accessor {
                view: Some(vertex_view),
                offset: byte_offset,
                component: ComponentType::F32,
                element: src.element,
                normalized: false,
                count: vertex_count,
                stride,
                min: src.min.clone(),
                max: src.max.clone(),
                sparse: false,
            });
            attributes.push(Attribute {
                semantic: attr.semantic.clone(),
                set: attr.set,
                accessor: Some(base + k),
            });
            byte_offset += 4 * src.element.float_count();
        }

        // The baked UV rides at the trailing offset of every vertex.
        let uv_accessor = accessors.len();
        accessors.push(Accessor {
            view: Some(vertex_view),
            offset: byte_offset,
            component: ComponentType::F32,
            element: ElementType::Vec2,
            normalized: false,
            count: vertex_count,
            stride,
            min: None,
            max: None,
            sparse: false,
        });
        attributes.push(Attribute {
            semantic: Semantic::TexCoord,
            set: baked_uv_set,
            accessor: Some(uv_accessor),
        });

        let indices_accessor = accessors.len();
        accessors.push(Accessor {
            view: Some(index_view),
            offset: 0,
            component: ComponentType::U32,
            element: ElementType::Scalar,
            normalized: false,
            count: index_count,
            stride: 4,
            min: None,
            max: None,
            sparse: false,
        });

        meshes.push(Mesh {
            name: mesh.name.clone(),
            primitives: vec![Primitive {
                topology: prim.topology,
                indices: Some(indices_accessor),
                material: prim.material,
                attributes,
            }],
        });
    }

    Ok(Asset {
        generator: generator.to_string(),
        buffers: vec![Buffer {
            name: None,
            uri: None,
            data,
        }],
        views,
        accessors,
        images: source.images.clone(),
        samplers: source.samplers.clone(),
        textures: source.textures.clone(),
        materials: source.materials.clone(),
        meshes,
        nodes: source.nodes.clone(),
        scenes: source.scenes.clone(),
        scene: source.scene,
    })
}
