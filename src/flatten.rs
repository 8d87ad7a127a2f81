//! Primitive flattening with transform baking.
//!
//! Rewrites a coalesced asset so every eligible primitive lives under its own
//! leaf node with identity transform. World-space positions, normals, and
//! tangents are baked into a fresh binary buffer; indices are widened to u32.
//!
//! The new buffer's layout is a contract consumed downstream: all baked
//! positions first, then all baked normals, then all baked tangents, then all
//! widened indices. Emitted views and accessors follow the same contract:
//! index entries for every primitive, then position, normal, and tangent
//! entries, then the preserved source views and accessors re-pointed at a
//! second buffer holding a verbatim copy of the source's binary. The caller
//! is expected to coalesce the two-buffer result immediately.

use crate::asset::types::*;
use crate::asset::{AccessorReader, Asset};
use crate::error::{Malformed, PipelineError};
use crate::math::{self, Vec3};

/// Restrict eligibility to triangle-topology primitives.
pub const FILTER_TRIANGLES: u32 = 1;

/// Bookkeeping for one eligible node/primitive pair.
struct BakedPrim {
    node: usize,
    mesh: usize,
    prim: usize,
    positions: usize,
    normals: Option<usize>,
    tangents: Option<usize>,
    indices: usize,
    position_count: usize,
    index_count: usize,
    min: Vec3,
    max: Vec3,
}

/// Decide whether a primitive is baked out or culled.
fn filter_prim(source: &Asset, prim: &Primitive, flags: u32) -> Result<bool, PipelineError> {
    if flags & FILTER_TRIANGLES != 0 && prim.topology != PrimitiveTopology::TriangleList {
        return Ok(false);
    }
    let mut has_positions = false;
    for attr in &prim.attributes {
        let Some(index) = attr.accessor else {
            return Ok(false);
        };
        let accessor = source
            .accessors
            .get(index)
            .ok_or(Malformed::DanglingReference {
                entity: "accessor",
                index,
            })?;
        if accessor.count == 0 || accessor.sparse {
            return Ok(false);
        }
        if attr.semantic == Semantic::Position {
            has_positions = true;
        }
    }
    match prim.indices {
        Some(index) => {
            let accessor = source
                .accessors
                .get(index)
                .ok_or(Malformed::DanglingReference {
                    entity: "accessor",
                    index,
                })?;
            if accessor.sparse {
                return Ok(false);
            }
        }
        None => return Ok(false),
    }
    Ok(has_positions)
}

/// Split every eligible primitive of a coalesced asset into its own
/// single-primitive leaf node, baking world transforms into the geometry.
///
/// Ineligible primitives (non-triangles under [`FILTER_TRIANGLES`], missing
/// or sparse accessors, non-indexed) are dropped silently.
pub fn flatten_primitives(
    source: &Asset,
    flags: u32,
    generator: &str,
) -> Result<Asset, PipelineError> {
    if source.buffers.len() != 1 {
        return Err(Malformed::MultipleBuffers {
            count: source.buffers.len(),
        }
        .into());
    }

    // First pass: find the eligible primitives and size every output run.
    let mut baked: Vec<BakedPrim> = Vec::new();
    let mut num_positions = 0usize;
    let mut num_normals = 0usize;
    let mut num_tangents = 0usize;
    let mut num_indices = 0usize;
    for (node_index, node) in source.nodes.iter().enumerate() {
        let Some(mesh_index) = node.mesh else {
            continue;
        };
        let mesh = source
            .meshes
            .get(mesh_index)
            .ok_or(Malformed::DanglingReference {
                entity: "mesh",
                index: mesh_index,
            })?;
        for (prim_index, prim) in mesh.primitives.iter().enumerate() {
            if !filter_prim(source, prim, flags)? {
                log::warn!(
                    "dropping unsupported primitive {} of mesh {:?}",
                    prim_index,
                    mesh.name.as_deref().unwrap_or("")
                );
                continue;
            }
            let mut positions = None;
            let mut normals = None;
            let mut tangents = None;
            for attr in &prim.attributes {
                match attr.semantic {
                    Semantic::Position => positions = attr.accessor,
                    Semantic::Normal => normals = attr.accessor,
                    Semantic::Tangent => tangents = attr.accessor,
                    _ => {}
                }
            }
            let positions = positions.expect("filter requires a position attribute");
            let indices = prim.indices.expect("filter requires indices");

            num_positions += source.accessors[positions].count;
            if let Some(a) = normals {
                num_normals += source.accessors[a].count;
            }
            if let Some(a) = tangents {
                num_tangents += source.accessors[a].count;
            }
            num_indices += source.accessors[indices].count;

            baked.push(BakedPrim {
                node: node_index,
                mesh: mesh_index,
                prim: prim_index,
                positions,
                normals,
                tangents,
                indices,
                position_count: 0,
                index_count: 0,
                min: Vec3::zeros(),
                max: Vec3::zeros(),
            });
        }
    }

    // Second pass: bake. All runs are sized up front; cursors only advance.
    let worlds = source.world_transforms();
    let reader = AccessorReader::new(source);

    let mut positions = vec![0.0f32; num_positions * 3];
    let mut normals = vec![0.0f32; num_normals * 3];
    let mut tangents = vec![0.0f32; num_tangents * 4];
    let mut indices = vec![0u32; num_indices];
    let mut pos_cursor = 0usize;
    let mut nrm_cursor = 0usize;
    let mut tan_cursor = 0usize;
    let mut idx_cursor = 0usize;

    for bp in &mut baked {
        let world = worlds[bp.node];
        let normal_mat = math::normal_matrix(&world);

        let count = source.accessors[bp.positions].count;
        let mut min = Vec3::repeat(f32::MAX);
        let mut max = Vec3::repeat(f32::MIN);
        for i in 0..count {
            let out = &mut positions[(pos_cursor + i) * 3..(pos_cursor + i) * 3 + 3];
            reader.read_float(bp.positions, i, out)?;
            let p = math::transform_point(&world, Vec3::new(out[0], out[1], out[2]));
            out.copy_from_slice(&[p.x, p.y, p.z]);
            min = math::vec3_min(min, p);
            max = math::vec3_max(max, p);
        }
        bp.position_count = count;
        bp.min = min;
        bp.max = max;
        pos_cursor += count;

        let icount = source.accessors[bp.indices].count;
        for i in 0..icount {
            indices[idx_cursor + i] = reader.read_index(bp.indices, i)?;
        }
        bp.index_count = icount;
        idx_cursor += icount;

        if let Some(accessor) = bp.normals {
            let ncount = source.accessors[accessor].count;
            for i in 0..ncount {
                let out = &mut normals[(nrm_cursor + i) * 3..(nrm_cursor + i) * 3 + 3];
                reader.read_float(accessor, i, out)?;
                // Transformed by the normal matrix only; renormalization is
                // deliberately not applied.
                let n = normal_mat * Vec3::new(out[0], out[1], out[2]);
                out.copy_from_slice(&[n.x, n.y, n.z]);
            }
            nrm_cursor += ncount;
        }

        if let Some(accessor) = bp.tangents {
            let tcount = source.accessors[accessor].count;
            for i in 0..tcount {
                let out = &mut tangents[(tan_cursor + i) * 4..(tan_cursor + i) * 4 + 4];
                reader.read_float(accessor, i, out)?;
                // The w component carries handedness and passes through.
                let t = normal_mat * Vec3::new(out[0], out[1], out[2]);
                out[0] = t.x;
                out[1] = t.y;
                out[2] = t.z;
            }
            tan_cursor += tcount;
        }
    }

    // Layout of the new buffer: positions, normals, tangents, indices.
    let positions_size = positions.len() * 4;
    let normals_size = normals.len() * 4;
    let tangents_size = tangents.len() * 4;
    let vertex_size = positions_size + normals_size + tangents_size;
    let index_size = indices.len() * 4;

    let mut data = Vec::with_capacity(vertex_size + index_size);
    data.extend_from_slice(bytemuck::cast_slice(&positions));
    data.extend_from_slice(bytemuck::cast_slice(&normals));
    data.extend_from_slice(bytemuck::cast_slice(&tangents));
    data.extend_from_slice(bytemuck::cast_slice(&indices));

    // Third pass: emit entities. Views and accessors share one index layout:
    // indices for every primitive, then positions, then normals, then
    // tangents, then the preserved source entries.
    let num_prims = baked.len();
    let prims_with_normals = baked.iter().filter(|b| b.normals.is_some()).count();
    let prims_with_tangents = baked.iter().filter(|b| b.tangents.is_some()).count();
    let num_baked_attrs = num_prims + prims_with_normals + prims_with_tangents;
    let preserved_base = num_prims + num_baked_attrs;

    let mut views = Vec::with_capacity(source.views.len() + preserved_base);
    let mut accessors = Vec::with_capacity(source.accessors.len() + preserved_base);

    let mut offset = vertex_size;
    for bp in &baked {
        let size = bp.index_count * 4;
        accessors.push(Accessor {
            view: Some(views.len()),
            offset: 0,
            component: ComponentType::U32,
            element: ElementType::Scalar,
            normalized: false,
            count: bp.index_count,
            stride: 4,
            min: None,
            max: None,
            sparse: false,
        });
        views.push(BufferView {
            buffer: 0,
            offset,
            size,
            stride: None,
            kind: None,
        });
        offset += size;
    }

    let mut offset = 0usize;
    for bp in &baked {
        let size = bp.position_count * 12;
        accessors.push(Accessor {
            view: Some(views.len()),
            offset: 0,
            component: ComponentType::F32,
            element: ElementType::Vec3,
            normalized: false,
            count: bp.position_count,
            stride: 12,
            min: Some(vec![bp.min.x, bp.min.y, bp.min.z]),
            max: Some(vec![bp.max.x, bp.max.y, bp.max.z]),
            sparse: false,
        });
        views.push(BufferView {
            buffer: 0,
            offset,
            size,
            stride: None,
            kind: None,
        });
        offset += size;
    }

    let mut offset = positions_size;
    for bp in &baked {
        let Some(accessor) = bp.normals else {
            continue;
        };
        let count = source.accessors[accessor].count;
        let size = count * 12;
        accessors.push(Accessor {
            view: Some(views.len()),
            offset: 0,
            component: ComponentType::F32,
            element: ElementType::Vec3,
            normalized: false,
            count,
            stride: 12,
            min: None,
            max: None,
            sparse: false,
        });
        views.push(BufferView {
            buffer: 0,
            offset,
            size,
            stride: None,
            kind: None,
        });
        offset += size;
    }

    let mut offset = positions_size + normals_size;
    for bp in &baked {
        let Some(accessor) = bp.tangents else {
            continue;
        };
        let count = source.accessors[accessor].count;
        let size = count * 16;
        accessors.push(Accessor {
            view: Some(views.len()),
            offset: 0,
            component: ComponentType::F32,
            element: ElementType::Vec4,
            normalized: false,
            count,
            stride: 16,
            min: None,
            max: None,
            sparse: false,
        });
        views.push(BufferView {
            buffer: 0,
            offset,
            size,
            stride: None,
            kind: None,
        });
        offset += size;
    }

    // Preserved source views and accessors, re-pointed at the second buffer.
    for view in &source.views {
        let mut view = view.clone();
        view.buffer = 1;
        views.push(view);
    }
    for accessor in &source.accessors {
        let mut accessor = accessor.clone();
        if let Some(view) = accessor.view {
            if view >= source.views.len() {
                return Err(Malformed::DanglingReference {
                    entity: "buffer view",
                    index: view,
                }
                .into());
            }
            accessor.view = Some(preserved_base + view);
        }
        accessors.push(accessor);
    }

    // One leaf node, mesh, and primitive per baked pair.
    let mut meshes = Vec::with_capacity(num_prims);
    let mut nodes = Vec::with_capacity(num_prims);
    let mut normals_seen = 0usize;
    let mut tangents_seen = 0usize;
    for (i, bp) in baked.iter().enumerate() {
        let source_prim = &source.meshes[bp.mesh].primitives[bp.prim];

        let mut attributes = Vec::with_capacity(source_prim.attributes.len());
        attributes.push(Attribute {
            semantic: Semantic::Position,
            set: 0,
            accessor: Some(num_prims + i),
        });
        if bp.normals.is_some() {
            attributes.push(Attribute {
                semantic: Semantic::Normal,
                set: 0,
                accessor: Some(2 * num_prims + normals_seen),
            });
            normals_seen += 1;
        }
        if bp.tangents.is_some() {
            attributes.push(Attribute {
                semantic: Semantic::Tangent,
                set: 0,
                accessor: Some(2 * num_prims + prims_with_normals + tangents_seen),
            });
            tangents_seen += 1;
        }
        for attr in &source_prim.attributes {
            match attr.semantic {
                Semantic::Position | Semantic::Normal | Semantic::Tangent => {}
                _ => attributes.push(Attribute {
                    semantic: attr.semantic.clone(),
                    set: attr.set,
                    accessor: attr.accessor.map(|a| preserved_base + a),
                }),
            }
        }

        if let Some(material) = source_prim.material {
            if material >= source.materials.len() {
                return Err(Malformed::DanglingReference {
                    entity: "material",
                    index: material,
                }
                .into());
            }
        }

        meshes.push(Mesh {
            name: source.meshes[bp.mesh].name.clone(),
            primitives: vec![Primitive {
                topology: PrimitiveTopology::TriangleList,
                indices: Some(i),
                material: source_prim.material,
                attributes,
            }],
        });
        nodes.push(Node {
            name: source.nodes[bp.node].name.clone(),
            transform: Transform::default(),
            mesh: Some(i),
            children: Vec::new(),
        });
    }

    let scene = Scene {
        name: source
            .scenes
            .get(source.scene)
            .and_then(|s| s.name.clone()),
        nodes: (0..num_prims).collect(),
    };

    // Images follow the preserved views; textures, materials, and samplers
    // carry over by identity.
    let mut images = Vec::with_capacity(source.images.len());
    for image in &source.images {
        let mut image = image.clone();
        image.view = image.view.map(|v| preserved_base + v);
        images.push(image);
    }

    Ok(Asset {
        generator: generator.to_string(),
        buffers: vec![
            Buffer {
                name: None,
                uri: None,
                data,
            },
            source.buffers[0].clone(),
        ],
        views,
        accessors,
        images,
        samplers: source.samplers.clone(),
        textures: source.textures.clone(),
        materials: source.materials.clone(),
        meshes,
        nodes,
        scenes: vec![scene],
        scene: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a coalesced asset with one triangle mesh under one node.
    ///
    /// Buffer layout: positions (3 x vec3), normals (3 x vec3), tangents
    /// (3 x vec4), uvs (3 x vec2), u16 indices.
    fn tri_asset(translation: [f32; 3]) -> Asset {
        let positions: Vec<f32> = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0,
        ];
        let normals: Vec<f32> = vec![
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, //
            0.0, 0.0, 1.0,
        ];
        let tangents: Vec<f32> = vec![
            1.0, 0.0, 0.0, -1.0, //
            1.0, 0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, -1.0,
        ];
        let uvs: Vec<f32> = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        let indices: Vec<u16> = vec![0, 1, 2];

        let mut data = Vec::new();
        data.extend_from_slice(bytemuck::cast_slice(&positions));
        data.extend_from_slice(bytemuck::cast_slice(&normals));
        data.extend_from_slice(bytemuck::cast_slice(&tangents));
        data.extend_from_slice(bytemuck::cast_slice(&uvs));
        data.extend_from_slice(bytemuck::cast_slice(&indices));

        let stream =
            |offset: usize, size: usize| BufferView {
                buffer: 0,
                offset,
                size,
                stride: None,
                kind: None,
            };
        let accessor = |view: usize, component: ComponentType, element: ElementType, count| {
            Accessor {
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
            }
        };

        Asset {
            generator: "external".into(),
            buffers: vec![Buffer {
                name: None,
                uri: None,
                data,
            }],
            views: vec![
                stream(0, 36),
                stream(36, 36),
                stream(72, 48),
                stream(120, 24),
                stream(144, 6),
            ],
            accessors: vec![
                accessor(0, ComponentType::F32, ElementType::Vec3, 3),
                accessor(1, ComponentType::F32, ElementType::Vec3, 3),
                accessor(2, ComponentType::F32, ElementType::Vec4, 3),
                accessor(3, ComponentType::F32, ElementType::Vec2, 3),
                accessor(4, ComponentType::U16, ElementType::Scalar, 3),
            ],
            images: Vec::new(),
            samplers: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            meshes: vec![Mesh {
                name: Some("tri".into()),
                primitives: vec![Primitive {
                    topology: PrimitiveTopology::TriangleList,
                    indices: Some(4),
                    material: None,
                    attributes: vec![
                        Attribute {
                            semantic: Semantic::Position,
                            set: 0,
                            accessor: Some(0),
                        },
                        Attribute {
                            semantic: Semantic::Normal,
                            set: 0,
                            accessor: Some(1),
                        },
                        Attribute {
                            semantic: Semantic::Tangent,
                            set: 0,
                            accessor: Some(2),
                        },
                        Attribute {
                            semantic: Semantic::TexCoord,
                            set: 0,
                            accessor: Some(3),
                        },
                    ],
                }],
            }],
            nodes: vec![Node {
                name: Some("root".into()),
                transform: Transform::Trs {
                    translation,
                    rotation: [0.0, 0.0, 0.0, 1.0],
                    scale: [1.0, 1.0, 1.0],
                },
                mesh: Some(0),
                children: Vec::new(),
            }],
            scenes: vec![Scene {
                name: Some("scene".into()),
                nodes: vec![0],
            }],
            scene: 0,
        }
    }

    fn read_vec3(asset: &Asset, accessor: usize, element: usize) -> [f32; 3] {
        let reader = AccessorReader::new(asset);
        let mut out = [0.0f32; 3];
        reader.read_float(accessor, element, &mut out).unwrap();
        out
    }

    #[test]
    fn bakes_translation_into_positions() {
        let source = tri_asset([1.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, FILTER_TRIANGLES, "gltfio").unwrap();

        assert_eq!(result.nodes.len(), 1);
        assert_eq!(result.meshes.len(), 1);
        assert!(result.nodes[0].transform.is_identity());
        assert_eq!(result.buffers.len(), 2);

        let prim = &result.meshes[0].primitives[0];
        let pos_accessor = prim.attributes[0].accessor.unwrap();
        assert_eq!(read_vec3(&result, pos_accessor, 0), [1.0, 0.0, 0.0]);
        assert_eq!(read_vec3(&result, pos_accessor, 1), [2.0, 0.0, 0.0]);
        assert_eq!(read_vec3(&result, pos_accessor, 2), [1.0, 1.0, 0.0]);

        let accessor = &result.accessors[pos_accessor];
        assert_eq!(accessor.min.as_deref(), Some(&[1.0, 0.0, 0.0][..]));
        assert_eq!(accessor.max.as_deref(), Some(&[2.0, 1.0, 0.0][..]));
    }

    #[test]
    fn names_and_generator_are_set() {
        let source = tri_asset([0.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        assert_eq!(result.generator, "gltfio");
        assert_eq!(result.nodes[0].name.as_deref(), Some("root"));
        assert_eq!(result.meshes[0].name.as_deref(), Some("tri"));
        assert_eq!(result.scenes[0].name.as_deref(), Some("scene"));
    }

    #[test]
    fn buffer_layout_is_positions_normals_tangents_indices() {
        let source = tri_asset([0.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        let prim = &result.meshes[0].primitives[0];
        let pos_view = result.accessors[prim.attributes[0].accessor.unwrap()]
            .view
            .unwrap();
        let nrm_view = result.accessors[prim.attributes[1].accessor.unwrap()]
            .view
            .unwrap();
        let tan_view = result.accessors[prim.attributes[2].accessor.unwrap()]
            .view
            .unwrap();
        let idx_view = result.accessors[prim.indices.unwrap()].view.unwrap();

        assert_eq!(result.views[pos_view].offset, 0);
        assert_eq!(result.views[nrm_view].offset, 36);
        assert_eq!(result.views[tan_view].offset, 72);
        // Indices follow the whole vertex region, widened to u32.
        assert_eq!(result.views[idx_view].offset, 120);
        assert_eq!(result.views[idx_view].size, 12);
        assert_eq!(result.buffers[0].data.len(), 132);
    }

    #[test]
    fn widens_indices_to_u32() {
        let source = tri_asset([0.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        let prim = &result.meshes[0].primitives[0];
        let idx = prim.indices.unwrap();
        assert_eq!(result.accessors[idx].component, ComponentType::U32);
        let reader = AccessorReader::new(&result);
        assert_eq!(reader.read_index(idx, 0).unwrap(), 0);
        assert_eq!(reader.read_index(idx, 1).unwrap(), 1);
        assert_eq!(reader.read_index(idx, 2).unwrap(), 2);
    }

    #[test]
    fn transforms_normals_without_renormalizing() {
        let mut source = tri_asset([0.0, 0.0, 0.0]);
        source.nodes[0].transform = Transform::Trs {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [2.0, 2.0, 2.0],
        };
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        let prim = &result.meshes[0].primitives[0];
        let nrm = prim.attributes[1].accessor.unwrap();
        // Uniform scale 2 gives a normal matrix of 1/2; the length is left
        // at 0.5 on purpose.
        let n = read_vec3(&result, nrm, 0);
        assert!((n[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn preserves_tangent_w_exactly() {
        let source = tri_asset([0.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        let prim = &result.meshes[0].primitives[0];
        let tan = prim.attributes[2].accessor.unwrap();
        let reader = AccessorReader::new(&result);
        let mut out = [0.0f32; 4];
        reader.read_float(tan, 0, &mut out).unwrap();
        assert_eq!(out[3], -1.0);
        reader.read_float(tan, 1, &mut out).unwrap();
        assert_eq!(out[3], 1.0);
    }

    #[test]
    fn preserved_attributes_point_into_second_buffer() {
        let source = tri_asset([0.0, 0.0, 0.0]);
        let result = flatten_primitives(&source, 0, "gltfio").unwrap();

        let prim = &result.meshes[0].primitives[0];
        // Attribute order: POSITION, NORMAL, TANGENT, then preserved UV.
        assert_eq!(prim.attributes[3].semantic, Semantic::TexCoord);
        let uv_accessor = prim.attributes[3].accessor.unwrap();
        let uv_view = result.accessors[uv_accessor].view.unwrap();
        assert_eq!(result.views[uv_view].buffer, 1);
        // The second buffer is the source binary, byte for byte.
        assert_eq!(result.buffers[1].data, source.buffers[0].data);

        let reader = AccessorReader::new(&result);
        let mut uv = [0.0f32; 2];
        reader.read_float(uv_accessor, 2, &mut uv).unwrap();
        assert_eq!(uv, [0.0, 1.0]);
    }

    #[test]
    fn splits_multi_primitive_meshes_into_leaves() {
        let mut source = tri_asset([0.0, 0.0, 0.0]);
        // Second primitive on the first mesh plus a second single-primitive
        // mesh on the same node tree.
        let prim = source.meshes[0].primitives[0].clone();
        source.meshes[0].primitives.push(prim.clone());
        source.meshes.push(Mesh {
            name: Some("other".into()),
            primitives: vec![prim],
        });
        source.nodes.push(Node {
            name: None,
            transform: Transform::default(),
            mesh: Some(1),
            children: Vec::new(),
        });
        source.scenes[0].nodes.push(1);

        let result = flatten_primitives(&source, 0, "gltfio").unwrap();
        assert_eq!(result.nodes.len(), 3);
        assert_eq!(result.meshes.len(), 3);
        assert!(result.meshes.iter().all(|m| m.primitives.len() == 1));
        assert_eq!(result.scenes[0].nodes, vec![0, 1, 2]);
        // Mesh refs are unique leaf-by-leaf.
        let refs: Vec<usize> = result.nodes.iter().map(|n| n.mesh.unwrap()).collect();
        assert_eq!(refs, vec![0, 1, 2]);
    }

    #[test]
    fn filters_non_triangle_primitives() {
        let mut source = tri_asset([0.0, 0.0, 0.0]);
        let mut lines = source.meshes[0].primitives[0].clone();
        lines.topology = PrimitiveTopology::LineList;
        source.meshes[0].primitives.push(lines);

        let filtered = flatten_primitives(&source, FILTER_TRIANGLES, "gltfio").unwrap();
        assert_eq!(filtered.nodes.len(), 1);

        // Without the flag both primitives survive.
        let unfiltered = flatten_primitives(&source, 0, "gltfio").unwrap();
        assert_eq!(unfiltered.nodes.len(), 2);
    }

    #[test]
    fn drops_non_indexed_primitives() {
        let mut source = tri_asset([0.0, 0.0, 0.0]);
        let mut soup = source.meshes[0].primitives[0].clone();
        soup.indices = None;
        source.meshes[0].primitives.push(soup);

        let result = flatten_primitives(&source, 0, "gltfio").unwrap();
        assert_eq!(result.nodes.len(), 1);
    }

    #[test]
    fn rejects_multi_buffer_sources() {
        let mut source = tri_asset([0.0, 0.0, 0.0]);
        source.buffers.push(Buffer::default());
        match flatten_primitives(&source, 0, "gltfio") {
            Err(PipelineError::MalformedInput(Malformed::MultipleBuffers { count: 2 })) => {}
            other => panic!("expected MultipleBuffers, got {other:?}"),
        }
    }
}
