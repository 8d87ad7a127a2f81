//! glTF document import: external parse tree → asset model.

use std::path::Path;

use crate::asset::types::*;
use crate::asset::Asset;
use crate::error::PipelineError;

/// Parse a `.gltf` or `.glb` byte slice into an asset.
///
/// `base_dir` is used to resolve external buffer URIs; pass `None` when the
/// document is self-contained (embedded blob or data URIs only).
pub fn import_slice(data: &[u8], base_dir: Option<&Path>) -> Result<Asset, PipelineError> {
    let gltf = gltf_dep::Gltf::from_slice(data)?;
    let blob = gltf.blob.clone();
    let buffers = resolve_buffers(&gltf.document, blob, base_dir)?;
    Ok(import_document(gltf.document, buffers))
}

/// Resolve all buffer payloads of a parsed document.
///
/// Binary glTF blobs, base64 data URIs, and external files (relative to
/// `base_dir`) are supported; failures surface as I/O errors.
pub fn resolve_buffers(
    document: &gltf_dep::Document,
    blob: Option<Vec<u8>>,
    base_dir: Option<&Path>,
) -> Result<Vec<Vec<u8>>, PipelineError> {
    let mut buffers = Vec::new();

    for buffer in document.buffers() {
        match buffer.source() {
            gltf_dep::buffer::Source::Bin => {
                let data = blob.as_ref().ok_or_else(|| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        "binary buffer referenced but no blob present",
                    )
                })?;
                buffers.push(data.clone());
            }
            gltf_dep::buffer::Source::Uri(uri) => {
                buffers.push(resolve_uri(uri, base_dir)?);
            }
        }
    }

    Ok(buffers)
}

/// Map a parsed document plus resolved buffer payloads into the asset model.
pub fn import_document(document: gltf_dep::Document, buffers: Vec<Vec<u8>>) -> Asset {
    // Usage targets are patched in from the json tree at the end.
    let mut views: Vec<BufferView> = document
        .views()
        .map(|view| BufferView {
            buffer: view.buffer().index(),
            offset: view.offset(),
            size: view.length(),
            stride: view.stride(),
            kind: None,
        })
        .collect();

    let accessors: Vec<Accessor> = document
        .accessors()
        .map(|acc| Accessor {
            view: acc.view().map(|v| v.index()),
            offset: acc.offset(),
            component: map_component(acc.data_type()),
            element: map_element(acc.dimensions()),
            normalized: acc.normalized(),
            count: acc.count(),
            stride: acc.view().and_then(|v| v.stride()).unwrap_or(0),
            min: acc.min().and_then(value_to_floats),
            max: acc.max().and_then(value_to_floats),
            sparse: acc.sparse().is_some(),
        })
        .collect();

    let images: Vec<Image> = document
        .images()
        .map(|image| match image.source() {
            gltf_dep::image::Source::View { view, mime_type } => Image {
                name: image.name().map(String::from),
                uri: None,
                view: Some(view.index()),
                mime_type: Some(mime_type.to_string()),
            },
            gltf_dep::image::Source::Uri { uri, mime_type } => Image {
                name: image.name().map(String::from),
                uri: Some(uri.to_string()),
                view: None,
                mime_type: mime_type.map(String::from),
            },
        })
        .collect();

    let samplers: Vec<Sampler> = document
        .samplers()
        .map(|sampler| Sampler {
            name: sampler.name().map(String::from),
            mag_filter: sampler.mag_filter().map(map_mag_filter),
            min_filter: sampler.min_filter().map(map_min_filter),
            wrap_s: map_wrap(sampler.wrap_s()),
            wrap_t: map_wrap(sampler.wrap_t()),
        })
        .collect();

    let textures: Vec<Texture> = document
        .textures()
        .map(|texture| Texture {
            name: texture.name().map(String::from),
            image: Some(texture.source().index()),
            sampler: texture.sampler().index(),
        })
        .collect();

    let materials: Vec<Material> = document
        .materials()
        .filter(|m| m.index().is_some())
        .map(|mat| {
            let pbr = mat.pbr_metallic_roughness();
            Material {
                name: mat.name().map(String::from),
                base_color_factor: pbr.base_color_factor(),
                metallic_factor: pbr.metallic_factor(),
                roughness_factor: pbr.roughness_factor(),
                emissive_factor: mat.emissive_factor(),
                normal_scale: mat.normal_texture().map(|t| t.scale()).unwrap_or(1.0),
                occlusion_strength: mat.occlusion_texture().map(|t| t.strength()).unwrap_or(1.0),
                double_sided: mat.double_sided(),
                base_color_texture: pbr.base_color_texture().map(|t| TextureSlot {
                    texture: t.texture().index(),
                    tex_coord: t.tex_coord(),
                }),
                metallic_roughness_texture: pbr.metallic_roughness_texture().map(|t| TextureSlot {
                    texture: t.texture().index(),
                    tex_coord: t.tex_coord(),
                }),
                diffuse_texture: None,
                specular_glossiness_texture: None,
                normal_texture: mat.normal_texture().map(|t| TextureSlot {
                    texture: t.texture().index(),
                    tex_coord: t.tex_coord(),
                }),
                occlusion_texture: mat.occlusion_texture().map(|t| TextureSlot {
                    texture: t.texture().index(),
                    tex_coord: t.tex_coord(),
                }),
                emissive_texture: mat.emissive_texture().map(|t| TextureSlot {
                    texture: t.texture().index(),
                    tex_coord: t.tex_coord(),
                }),
            }
        })
        .collect();

    let meshes: Vec<Mesh> = document
        .meshes()
        .map(|mesh| Mesh {
            name: mesh.name().map(String::from),
            primitives: mesh
                .primitives()
                .map(|prim| Primitive {
                    topology: map_mode(prim.mode()),
                    indices: prim.indices().map(|a| a.index()),
                    material: prim.material().index(),
                    attributes: prim
                        .attributes()
                        .map(|(semantic, accessor)| {
                            let (semantic, set) = map_semantic(semantic);
                            Attribute {
                                semantic,
                                set,
                                accessor: Some(accessor.index()),
                            }
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let nodes: Vec<Node> = document
        .nodes()
        .map(|node| Node {
            name: node.name().map(String::from),
            transform: match node.transform() {
                gltf_dep::scene::Transform::Matrix { matrix } => {
                    let mut cols = [0.0f32; 16];
                    for (c, col) in matrix.iter().enumerate() {
                        for (r, v) in col.iter().enumerate() {
                            cols[c * 4 + r] = *v;
                        }
                    }
                    Transform::Matrix(cols)
                }
                gltf_dep::scene::Transform::Decomposed {
                    translation,
                    rotation,
                    scale,
                } => Transform::Trs {
                    translation,
                    rotation,
                    scale,
                },
            },
            mesh: node.mesh().map(|m| m.index()),
            children: node.children().map(|c| c.index()).collect(),
        })
        .collect();

    let scenes: Vec<Scene> = document
        .scenes()
        .map(|scene| Scene {
            name: scene.name().map(String::from),
            nodes: scene.nodes().map(|n| n.index()).collect(),
        })
        .collect();

    let scene = document.default_scene().map(|s| s.index()).unwrap_or(0);

    let buffer_names: Vec<Option<String>> = document
        .buffers()
        .map(|b| b.name().map(String::from))
        .collect();

    let root = document.into_json();
    for (view, json_view) in views.iter_mut().zip(&root.buffer_views) {
        view.kind = match &json_view.target {
            Some(gltf_dep::json::validation::Checked::Valid(
                gltf_dep::json::buffer::Target::ArrayBuffer,
            )) => Some(BufferViewKind::Vertices),
            Some(gltf_dep::json::validation::Checked::Valid(
                gltf_dep::json::buffer::Target::ElementArrayBuffer,
            )) => Some(BufferViewKind::Indices),
            _ => None,
        };
    }
    let generator = root.asset.generator.unwrap_or_default();

    Asset {
        generator,
        buffers: buffers
            .into_iter()
            .zip(buffer_names)
            .map(|(data, name)| Buffer {
                name,
                uri: None,
                data,
            })
            .collect(),
        views,
        accessors,
        images,
        samplers,
        textures,
        materials,
        meshes,
        nodes,
        scenes,
        scene,
    }
}

fn map_component(data_type: gltf_dep::accessor::DataType) -> ComponentType {
    use gltf_dep::accessor::DataType;
    match data_type {
        DataType::I8 => ComponentType::I8,
        DataType::U8 => ComponentType::U8,
        DataType::I16 => ComponentType::I16,
        DataType::U16 => ComponentType::U16,
        DataType::U32 => ComponentType::U32,
        DataType::F32 => ComponentType::F32,
    }
}

fn map_element(dimensions: gltf_dep::accessor::Dimensions) -> ElementType {
    use gltf_dep::accessor::Dimensions;
    match dimensions {
        Dimensions::Scalar => ElementType::Scalar,
        Dimensions::Vec2 => ElementType::Vec2,
        Dimensions::Vec3 => ElementType::Vec3,
        Dimensions::Vec4 => ElementType::Vec4,
        Dimensions::Mat2 => ElementType::Mat2,
        Dimensions::Mat3 => ElementType::Mat3,
        Dimensions::Mat4 => ElementType::Mat4,
    }
}

fn map_semantic(semantic: gltf_dep::Semantic) -> (Semantic, u32) {
    match semantic {
        gltf_dep::Semantic::Positions => (Semantic::Position, 0),
        gltf_dep::Semantic::Normals => (Semantic::Normal, 0),
        gltf_dep::Semantic::Tangents => (Semantic::Tangent, 0),
        gltf_dep::Semantic::TexCoords(set) => (Semantic::TexCoord, set),
        gltf_dep::Semantic::Colors(set) => (Semantic::Color, set),
        gltf_dep::Semantic::Joints(set) => (Semantic::Joints, set),
        gltf_dep::Semantic::Weights(set) => (Semantic::Weights, set),
        gltf_dep::Semantic::Extras(name) => (Semantic::Custom(name), 0),
    }
}

fn map_mode(mode: gltf_dep::mesh::Mode) -> PrimitiveTopology {
    use gltf_dep::mesh::Mode;
    match mode {
        Mode::Points => PrimitiveTopology::PointList,
        Mode::Lines => PrimitiveTopology::LineList,
        Mode::LineLoop => PrimitiveTopology::LineLoop,
        Mode::LineStrip => PrimitiveTopology::LineStrip,
        Mode::Triangles => PrimitiveTopology::TriangleList,
        Mode::TriangleStrip => PrimitiveTopology::TriangleStrip,
        Mode::TriangleFan => PrimitiveTopology::TriangleFan,
    }
}

fn map_mag_filter(filter: gltf_dep::texture::MagFilter) -> Filter {
    match filter {
        gltf_dep::texture::MagFilter::Nearest => Filter::Nearest,
        gltf_dep::texture::MagFilter::Linear => Filter::Linear,
    }
}

/// Collapse mipmap minification variants to Nearest/Linear.
fn map_min_filter(filter: gltf_dep::texture::MinFilter) -> Filter {
    use gltf_dep::texture::MinFilter;
    match filter {
        MinFilter::Nearest
        | MinFilter::NearestMipmapNearest
        | MinFilter::NearestMipmapLinear => Filter::Nearest,
        MinFilter::Linear
        | MinFilter::LinearMipmapNearest
        | MinFilter::LinearMipmapLinear => Filter::Linear,
    }
}

fn map_wrap(wrap: gltf_dep::texture::WrappingMode) -> Wrap {
    match wrap {
        gltf_dep::texture::WrappingMode::ClampToEdge => Wrap::ClampToEdge,
        gltf_dep::texture::WrappingMode::MirroredRepeat => Wrap::MirroredRepeat,
        gltf_dep::texture::WrappingMode::Repeat => Wrap::Repeat,
    }
}

fn value_to_floats(value: gltf_dep::json::Value) -> Option<Vec<f32>> {
    match value {
        gltf_dep::json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_f64())
                .map(|v| v as f32)
                .collect(),
        ),
        _ => None,
    }
}

/// Resolve one buffer URI: base64 data URIs decode in place, anything else
/// reads as a file relative to the manifest's directory.
fn resolve_uri(uri: &str, base_dir: Option<&Path>) -> Result<Vec<u8>, PipelineError> {
    let payload = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_mime, payload)| payload);
    if let Some(payload) = payload {
        return decode_base64(payload).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed base64 data URI")
                .into()
        });
    }

    let dir = base_dir.ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("external buffer {uri} requires a base directory"),
        )
    })?;
    Ok(std::fs::read(dir.join(uri))?)
}

/// Streaming base64 decode through a 6-bit accumulator. Whitespace is
/// skipped, `=` padding ends the stream, any other non-alphabet byte is a
/// hard failure.
fn decode_base64(payload: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(payload.len() / 4 * 3);
    let mut acc = 0u32;
    let mut bits = 0u32;
    for byte in payload.bytes() {
        let sextet = match byte {
            b'A'..=b'Z' => byte - b'A',
            b'a'..=b'z' => byte - b'a' + 26,
            b'0'..=b'9' => byte - b'0' + 52,
            b'+' => 62,
            b'/' => 63,
            b'=' => break,
            b'\n' | b'\r' | b'\t' | b' ' => continue,
            _ => return None,
        };
        acc = (acc << 6) | sextet as u32;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
        }
    }
    Some(out)
}
