//! Buffer coalescing: rewrite an asset so it references exactly one buffer.
//!
//! The output buffer is the concatenation of all source buffers in source
//! order. Every entity is cloned into arrays of identical length, so every
//! cross-reference is rewritten by identity on indices; only buffer-view
//! offsets shift, by the base offset of the source buffer they lived in.

use crate::asset::types::{Buffer, BufferView};
use crate::asset::Asset;
use crate::error::{Malformed, PipelineError};

/// Resolve a required cross-reference or report it as dangling.
fn check(index: usize, len: usize, entity: &'static str) -> Result<usize, PipelineError> {
    if index < len {
        Ok(index)
    } else {
        Err(Malformed::DanglingReference { entity, index }.into())
    }
}

/// Resolve an optional cross-reference or report it as dangling.
fn check_opt(
    index: Option<usize>,
    len: usize,
    entity: &'static str,
) -> Result<Option<usize>, PipelineError> {
    match index {
        Some(i) => check(i, len, entity).map(Some),
        None => Ok(None),
    }
}

/// Produce a new asset whose buffer array has length one, holding the
/// concatenation of all source buffers in source order.
///
/// Fails with [`PipelineError::MalformedInput`] if any source cross-reference
/// does not resolve inside the source arrays.
pub fn coalesce_buffers(source: &Asset, generator: &str) -> Result<Asset, PipelineError> {
    // Base offset of each source buffer within the aggregate, by prefix sum.
    let mut offsets = Vec::with_capacity(source.buffers.len());
    let mut total = 0usize;
    for buffer in &source.buffers {
        offsets.push(total);
        total += buffer.data.len();
    }

    let mut data = Vec::with_capacity(total);
    for buffer in &source.buffers {
        data.extend_from_slice(&buffer.data);
    }

    let num_views = source.views.len();
    let num_accessors = source.accessors.len();
    let num_images = source.images.len();
    let num_textures = source.textures.len();
    let num_samplers = source.samplers.len();
    let num_materials = source.materials.len();
    let num_meshes = source.meshes.len();
    let num_nodes = source.nodes.len();

    let mut views = Vec::with_capacity(num_views);
    for view in &source.views {
        let buffer = check(view.buffer, source.buffers.len(), "buffer")?;
        views.push(BufferView {
            buffer: 0,
            offset: view.offset + offsets[buffer],
            size: view.size,
            stride: view.stride,
            kind: view.kind,
        });
    }

    let mut accessors = Vec::with_capacity(num_accessors);
    for accessor in &source.accessors {
        let mut accessor = accessor.clone();
        accessor.view = check_opt(accessor.view, num_views, "buffer view")?;
        accessors.push(accessor);
    }

    let mut images = Vec::with_capacity(num_images);
    for image in &source.images {
        let mut image = image.clone();
        image.view = check_opt(image.view, num_views, "buffer view")?;
        images.push(image);
    }

    let mut textures = Vec::with_capacity(num_textures);
    for texture in &source.textures {
        let mut texture = texture.clone();
        texture.image = check_opt(texture.image, num_images, "image")?;
        texture.sampler = check_opt(texture.sampler, num_samplers, "sampler")?;
        textures.push(texture);
    }

    let mut materials = Vec::with_capacity(num_materials);
    for material in &source.materials {
        let mut material = material.clone();
        for slot in material.texture_slots_mut() {
            if let Some(slot) = slot {
                slot.texture = check(slot.texture, num_textures, "texture")?;
            }
        }
        materials.push(material);
    }

    let mut meshes = Vec::with_capacity(num_meshes);
    for mesh in &source.meshes {
        let mut mesh = mesh.clone();
        for primitive in &mut mesh.primitives {
            primitive.indices = check_opt(primitive.indices, num_accessors, "accessor")?;
            primitive.material = check_opt(primitive.material, num_materials, "material")?;
            for attribute in &mut primitive.attributes {
                attribute.accessor = check_opt(attribute.accessor, num_accessors, "accessor")?;
            }
        }
        meshes.push(mesh);
    }

    let mut nodes = Vec::with_capacity(num_nodes);
    for node in &source.nodes {
        let mut node = node.clone();
        node.mesh = check_opt(node.mesh, num_meshes, "mesh")?;
        for &child in &node.children {
            check(child, num_nodes, "node")?;
        }
        nodes.push(node);
    }

    let mut scenes = Vec::with_capacity(source.scenes.len());
    for scene in &source.scenes {
        for &node in &scene.nodes {
            check(node, num_nodes, "node")?;
        }
        scenes.push(scene.clone());
    }

    let scene = if scenes.is_empty() {
        source.scene
    } else {
        check(source.scene, scenes.len(), "scene")?
    };

    Ok(Asset {
        generator: generator.to_string(),
        buffers: vec![Buffer {
            name: None,
            uri: None,
            data,
        }],
        views,
        accessors,
        images,
        samplers: source.samplers.clone(),
        textures,
        materials,
        meshes,
        nodes,
        scenes,
        scene,
    })
}
