//! glTF manifest export: asset model → JSON bytes.

use gltf_dep::json as gj;

use crate::asset::types::*;
use crate::asset::Asset;
use crate::error::{Malformed, PipelineError};

/// Serialize an asset into a glTF 2.0 JSON manifest.
///
/// `buffer_uri` overrides the first buffer's URI for the duration of the
/// write — the facade passes the emitted `.bin` basename here so the stored
/// asset never has to be mutated.
pub fn export_json(asset: &Asset, buffer_uri: Option<&str>) -> Result<Vec<u8>, PipelineError> {
    let mut root = gj::Root::default();

    for (i, buffer) in asset.buffers.iter().enumerate() {
        let uri = if i == 0 && buffer_uri.is_some() {
            buffer_uri.map(String::from)
        } else {
            buffer.uri.clone()
        };
        root.buffers.push(gj::Buffer {
            byte_length: gj::validation::USize64(buffer.data.len() as u64),
            name: buffer.name.clone(),
            uri,
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for view in &asset.views {
        root.buffer_views.push(gj::buffer::View {
            buffer: gj::Index::new(view.buffer as u32),
            byte_offset: Some(gj::validation::USize64(view.offset as u64)),
            byte_length: gj::validation::USize64(view.size as u64),
            byte_stride: view.stride.map(gj::buffer::Stride),
            target: view.kind.map(|kind| {
                gj::validation::Checked::Valid(match kind {
                    BufferViewKind::Vertices => gj::buffer::Target::ArrayBuffer,
                    BufferViewKind::Indices => gj::buffer::Target::ElementArrayBuffer,
                })
            }),
            name: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for accessor in &asset.accessors {
        root.accessors.push(gj::Accessor {
            buffer_view: accessor.view.map(|v| gj::Index::new(v as u32)),
            byte_offset: Some(gj::validation::USize64(accessor.offset as u64)),
            count: gj::validation::USize64(accessor.count as u64),
            component_type: gj::validation::Checked::Valid(gj::accessor::GenericComponentType(
                map_component(accessor.component),
            )),
            type_: gj::validation::Checked::Valid(map_element(accessor.element)),
            min: accessor.min.as_deref().map(json_f32_array),
            max: accessor.max.as_deref().map(json_f32_array),
            normalized: accessor.normalized,
            name: None,
            sparse: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for image in &asset.images {
        root.images.push(gj::Image {
            buffer_view: image.view.map(|v| gj::Index::new(v as u32)),
            mime_type: image.mime_type.clone().map(gj::image::MimeType),
            name: image.name.clone(),
            uri: image.uri.clone(),
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for sampler in &asset.samplers {
        root.samplers.push(gj::texture::Sampler {
            mag_filter: sampler
                .mag_filter
                .map(|f| gj::validation::Checked::Valid(map_mag_filter(f))),
            min_filter: sampler
                .min_filter
                .map(|f| gj::validation::Checked::Valid(map_min_filter(f))),
            wrap_s: gj::validation::Checked::Valid(map_wrap(sampler.wrap_s)),
            wrap_t: gj::validation::Checked::Valid(map_wrap(sampler.wrap_t)),
            name: sampler.name.clone(),
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for (i, texture) in asset.textures.iter().enumerate() {
        let image = texture.image.ok_or(Malformed::DanglingReference {
            entity: "image",
            index: i,
        })?;
        root.textures.push(gj::Texture {
            name: texture.name.clone(),
            sampler: texture.sampler.map(|s| gj::Index::new(s as u32)),
            source: gj::Index::new(image as u32),
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for material in &asset.materials {
        let pbr = gj::material::PbrMetallicRoughness {
            base_color_factor: gj::material::PbrBaseColorFactor(material.base_color_factor),
            base_color_texture: material.base_color_texture.map(texture_info),
            metallic_factor: gj::material::StrengthFactor(material.metallic_factor),
            roughness_factor: gj::material::StrengthFactor(material.roughness_factor),
            metallic_roughness_texture: material.metallic_roughness_texture.map(texture_info),
            extensions: None,
            extras: gj::Extras::default(),
        };

        root.materials.push(gj::Material {
            name: material.name.clone(),
            alpha_cutoff: None,
            alpha_mode: gj::validation::Checked::Valid(gj::material::AlphaMode::Opaque),
            double_sided: material.double_sided,
            pbr_metallic_roughness: pbr,
            normal_texture: material.normal_texture.map(|slot| {
                gj::material::NormalTexture {
                    index: gj::Index::new(slot.texture as u32),
                    scale: material.normal_scale,
                    tex_coord: slot.tex_coord,
                    extensions: None,
                    extras: gj::Extras::default(),
                }
            }),
            occlusion_texture: material.occlusion_texture.map(|slot| {
                gj::material::OcclusionTexture {
                    index: gj::Index::new(slot.texture as u32),
                    strength: gj::material::StrengthFactor(material.occlusion_strength),
                    tex_coord: slot.tex_coord,
                    extensions: None,
                    extras: gj::Extras::default(),
                }
            }),
            emissive_texture: material.emissive_texture.map(texture_info),
            emissive_factor: gj::material::EmissiveFactor(material.emissive_factor),
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for mesh in &asset.meshes {
        let mut primitives = Vec::with_capacity(mesh.primitives.len());
        for prim in &mesh.primitives {
            let mut attributes = std::collections::BTreeMap::new();
            for attr in &prim.attributes {
                let Some(accessor) = attr.accessor else {
                    continue;
                };
                attributes.insert(
                    gj::validation::Checked::Valid(map_semantic(&attr.semantic, attr.set)),
                    gj::Index::new(accessor as u32),
                );
            }
            primitives.push(gj::mesh::Primitive {
                attributes,
                extensions: None,
                extras: gj::Extras::default(),
                indices: prim.indices.map(|a| gj::Index::new(a as u32)),
                material: prim.material.map(|m| gj::Index::new(m as u32)),
                mode: gj::validation::Checked::Valid(map_mode(prim.topology)),
                targets: None,
            });
        }
        root.meshes.push(gj::Mesh {
            name: mesh.name.clone(),
            primitives,
            weights: None,
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    for node in &asset.nodes {
        let (translation, rotation, scale, matrix) = match &node.transform {
            _ if node.transform.is_identity() => (None, None, None, None),
            Transform::Trs {
                translation,
                rotation,
                scale,
            } => (
                Some(*translation),
                Some(gj::scene::UnitQuaternion(*rotation)),
                Some(*scale),
                None,
            ),
            Transform::Matrix(m) => (None, None, None, Some(*m)),
        };
        root.nodes.push(gj::Node {
            name: node.name.clone(),
            children: if node.children.is_empty() {
                None
            } else {
                Some(
                    node.children
                        .iter()
                        .map(|&c| gj::Index::new(c as u32))
                        .collect(),
                )
            },
            mesh: node.mesh.map(|m| gj::Index::new(m as u32)),
            translation,
            rotation,
            scale,
            matrix,
            ..gj::Node::default()
        });
    }

    for scene in &asset.scenes {
        root.scenes.push(gj::Scene {
            name: scene.name.clone(),
            nodes: scene.nodes.iter().map(|&n| gj::Index::new(n as u32)).collect(),
            extensions: None,
            extras: gj::Extras::default(),
        });
    }

    if !asset.scenes.is_empty() {
        root.scene = Some(gj::Index::new(asset.scene as u32));
    }
    root.asset = gj::Asset {
        generator: Some(asset.generator.clone()),
        version: "2.0".into(),
        ..Default::default()
    };

    root.to_vec().map_err(|e| {
        PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("JSON serialization failed: {e}"),
        ))
    })
}

fn map_component(component: ComponentType) -> gj::accessor::ComponentType {
    match component {
        ComponentType::I8 => gj::accessor::ComponentType::I8,
        ComponentType::U8 => gj::accessor::ComponentType::U8,
        ComponentType::I16 => gj::accessor::ComponentType::I16,
        ComponentType::U16 => gj::accessor::ComponentType::U16,
        ComponentType::U32 => gj::accessor::ComponentType::U32,
        ComponentType::F32 => gj::accessor::ComponentType::F32,
    }
}

fn map_element(element: ElementType) -> gj::accessor::Type {
    match element {
        ElementType::Scalar => gj::accessor::Type::Scalar,
        ElementType::Vec2 => gj::accessor::Type::Vec2,
        ElementType::Vec3 => gj::accessor::Type::Vec3,
        ElementType::Vec4 => gj::accessor::Type::Vec4,
        ElementType::Mat2 => gj::accessor::Type::Mat2,
        ElementType::Mat3 => gj::accessor::Type::Mat3,
        ElementType::Mat4 => gj::accessor::Type::Mat4,
    }
}

fn map_semantic(semantic: &Semantic, set: u32) -> gj::mesh::Semantic {
    match semantic {
        Semantic::Position => gj::mesh::Semantic::Positions,
        Semantic::Normal => gj::mesh::Semantic::Normals,
        Semantic::Tangent => gj::mesh::Semantic::Tangents,
        Semantic::TexCoord => gj::mesh::Semantic::TexCoords(set),
        Semantic::Color => gj::mesh::Semantic::Colors(set),
        Semantic::Joints => gj::mesh::Semantic::Joints(set),
        Semantic::Weights => gj::mesh::Semantic::Weights(set),
        Semantic::Custom(name) => gj::mesh::Semantic::Extras(name.clone()),
    }
}

fn map_mode(topology: PrimitiveTopology) -> gj::mesh::Mode {
    match topology {
        PrimitiveTopology::PointList => gj::mesh::Mode::Points,
        PrimitiveTopology::LineList => gj::mesh::Mode::Lines,
        PrimitiveTopology::LineLoop => gj::mesh::Mode::LineLoop,
        PrimitiveTopology::LineStrip => gj::mesh::Mode::LineStrip,
        PrimitiveTopology::TriangleList => gj::mesh::Mode::Triangles,
        PrimitiveTopology::TriangleStrip => gj::mesh::Mode::TriangleStrip,
        PrimitiveTopology::TriangleFan => gj::mesh::Mode::TriangleFan,
    }
}

fn map_mag_filter(filter: Filter) -> gj::texture::MagFilter {
    match filter {
        Filter::Nearest => gj::texture::MagFilter::Nearest,
        Filter::Linear => gj::texture::MagFilter::Linear,
    }
}

fn map_min_filter(filter: Filter) -> gj::texture::MinFilter {
    match filter {
        Filter::Nearest => gj::texture::MinFilter::Nearest,
        Filter::Linear => gj::texture::MinFilter::Linear,
    }
}

fn map_wrap(wrap: Wrap) -> gj::texture::WrappingMode {
    match wrap {
        Wrap::ClampToEdge => gj::texture::WrappingMode::ClampToEdge,
        Wrap::MirroredRepeat => gj::texture::WrappingMode::MirroredRepeat,
        Wrap::Repeat => gj::texture::WrappingMode::Repeat,
    }
}

fn texture_info(slot: TextureSlot) -> gj::texture::Info {
    gj::texture::Info {
        index: gj::Index::new(slot.texture as u32),
        tex_coord: slot.tex_coord,
        extensions: None,
        extras: gj::Extras::default(),
    }
}

/// Build a JSON array of f32 values (for accessor min/max).
fn json_f32_array(values: &[f32]) -> gj::Value {
    gj::Value::Array(values.iter().map(|&v| gj::Value::from(v as f64)).collect())
}
