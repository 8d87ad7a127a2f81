//! Entity types for the in-memory asset model.
//!
//! Cross-references between entities are plain indices into the owning
//! [`Asset`](super::Asset)'s arrays; optional references are `Option<usize>`.
//! Values are cheap to clone and carry no lifetime — each transformation
//! produces a fresh, self-contained asset.

/// A raw binary buffer.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    /// Optional buffer name.
    pub name: Option<String>,
    /// Optional URI; set while writing so the manifest can reference the
    /// emitted `.bin` file.
    pub uri: Option<String>,
    /// Raw bytes. The buffer's size is `data.len()`.
    pub data: Vec<u8>,
}

/// Usage tag for a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferViewKind {
    /// Vertex attribute data.
    Vertices,
    /// Index data.
    Indices,
}

/// A byte range within a buffer.
#[derive(Debug, Clone)]
pub struct BufferView {
    /// Index of the buffer this view reads from.
    pub buffer: usize,
    /// Byte offset within the buffer.
    pub offset: usize,
    /// Byte length of the view.
    pub size: usize,
    /// Byte stride between elements; `None` means tightly packed.
    pub stride: Option<usize>,
    /// Optional usage tag.
    pub kind: Option<BufferViewKind>,
}

/// Scalar component type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Unsigned 32-bit integer.
    U32,
    /// 32-bit float.
    F32,
}

impl ComponentType {
    /// Size of one component in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::U32 | Self::F32 => 4,
        }
    }
}

/// Element type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    /// Single component.
    Scalar,
    /// Two components.
    Vec2,
    /// Three components.
    Vec3,
    /// Four components.
    Vec4,
    /// 2x2 matrix.
    Mat2,
    /// 3x3 matrix.
    Mat3,
    /// 4x4 matrix.
    Mat4,
}

impl ElementType {
    /// Number of float lanes in one element.
    pub fn float_count(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
            Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// A typed view over a byte range within a buffer view.
#[derive(Debug, Clone)]
pub struct Accessor {
    /// The buffer view backing this accessor. `None` only for degenerate
    /// (e.g. sparse-only) input; such accessors cannot be read and the
    /// primitives referencing them are filtered out by the flattener.
    pub view: Option<usize>,
    /// Byte offset within the view.
    pub offset: usize,
    /// Scalar component type.
    pub component: ComponentType,
    /// Element type.
    pub element: ElementType,
    /// Whether integer components are normalized to [0, 1] / [-1, 1].
    pub normalized: bool,
    /// Number of elements.
    pub count: usize,
    /// Byte stride between elements; 0 means tightly packed.
    pub stride: usize,
    /// Componentwise minimum bounds, when declared.
    pub min: Option<Vec<f32>>,
    /// Componentwise maximum bounds, when declared.
    pub max: Option<Vec<f32>>,
    /// Whether the accessor carries sparse storage.
    pub sparse: bool,
}

impl Accessor {
    /// Size of one tightly packed element in bytes.
    pub fn element_size(&self) -> usize {
        self.component.size() * self.element.float_count()
    }

    /// Stride actually used when reading: the declared stride if non-zero,
    /// else the packed element size.
    pub fn effective_stride(&self) -> usize {
        if self.stride != 0 {
            self.stride
        } else {
            self.element_size()
        }
    }
}

/// Semantic of a vertex attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Semantic {
    /// `POSITION`.
    Position,
    /// `NORMAL`.
    Normal,
    /// `TANGENT`.
    Tangent,
    /// `TEXCOORD_n`.
    TexCoord,
    /// `COLOR_n`.
    Color,
    /// `JOINTS_n`.
    Joints,
    /// `WEIGHTS_n`.
    Weights,
    /// Application-specific attribute (serialized with a leading underscore).
    Custom(String),
}

/// A named vertex channel on a primitive.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Attribute semantic.
    pub semantic: Semantic,
    /// Semantic set index (the `n` in `TEXCOORD_n`).
    pub set: u32,
    /// Accessor supplying the data, when present.
    pub accessor: Option<usize>,
}

/// Primitive topology describing how vertices are assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a closed loop of lines.
    LineLoop,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Vertices form a fan of triangles.
    TriangleFan,
}

/// One draw call's worth of geometry.
#[derive(Debug, Clone, Default)]
pub struct Primitive {
    /// Topology of the primitive.
    pub topology: PrimitiveTopology,
    /// Index accessor, when the primitive is indexed.
    pub indices: Option<usize>,
    /// Material reference.
    pub material: Option<usize>,
    /// Ordered attribute list.
    pub attributes: Vec<Attribute>,
}

/// A mesh: an ordered list of primitives.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    /// Optional mesh name.
    pub name: Option<String>,
    /// The mesh's primitives.
    pub primitives: Vec<Primitive>,
}

/// Local transform of a node: either decomposed TRS or a raw matrix.
#[derive(Debug, Clone)]
pub enum Transform {
    /// Translation, rotation (quaternion `[x, y, z, w]`), scale.
    Trs {
        /// Translation.
        translation: [f32; 3],
        /// Rotation quaternion, `[x, y, z, w]`.
        rotation: [f32; 4],
        /// Scale.
        scale: [f32; 3],
    },
    /// Column-major 4x4 matrix.
    Matrix([f32; 16]),
}

impl Default for Transform {
    fn default() -> Self {
        Self::Trs {
            translation: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

impl Transform {
    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        match self {
            Self::Trs {
                translation,
                rotation,
                scale,
            } => {
                *translation == [0.0, 0.0, 0.0]
                    && *rotation == [0.0, 0.0, 0.0, 1.0]
                    && *scale == [1.0, 1.0, 1.0]
            }
            Self::Matrix(m) => {
                let mut identity = [0.0f32; 16];
                identity[0] = 1.0;
                identity[5] = 1.0;
                identity[10] = 1.0;
                identity[15] = 1.0;
                *m == identity
            }
        }
    }
}

/// A scene graph node.
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Optional node name.
    pub name: Option<String>,
    /// Local transform.
    pub transform: Transform,
    /// Mesh reference.
    pub mesh: Option<usize>,
    /// Child node indices.
    pub children: Vec<usize>,
}

/// A scene: a list of root nodes.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Optional scene name.
    pub name: Option<String>,
    /// Root node indices.
    pub nodes: Vec<usize>,
}

/// An image, sourced from a URI or a buffer view.
#[derive(Debug, Clone, Default)]
pub struct Image {
    /// Optional image name.
    pub name: Option<String>,
    /// External or data URI, when URI-sourced.
    pub uri: Option<String>,
    /// Buffer view, when embedded.
    pub view: Option<usize>,
    /// MIME type, when known.
    pub mime_type: Option<String>,
}

/// Texture filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Nearest-neighbor filtering.
    Nearest,
    /// Linear filtering.
    Linear,
}

/// Texture coordinate wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wrap {
    /// Clamp to edge texels.
    ClampToEdge,
    /// Mirror on each repeat.
    MirroredRepeat,
    /// Tile.
    #[default]
    Repeat,
}

/// A texture sampler.
#[derive(Debug, Clone, Default)]
pub struct Sampler {
    /// Optional sampler name.
    pub name: Option<String>,
    /// Magnification filter.
    pub mag_filter: Option<Filter>,
    /// Minification filter (mipmap variants collapsed).
    pub min_filter: Option<Filter>,
    /// Wrapping in S.
    pub wrap_s: Wrap,
    /// Wrapping in T.
    pub wrap_t: Wrap,
}

/// A texture: an image paired with a sampler.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    /// Optional texture name.
    pub name: Option<String>,
    /// Image reference.
    pub image: Option<usize>,
    /// Sampler reference.
    pub sampler: Option<usize>,
}

/// A material's reference to a texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureSlot {
    /// Texture index.
    pub texture: usize,
    /// Which `TEXCOORD_n` set the slot samples.
    pub tex_coord: u32,
}

/// A material with up to seven optional texture slots.
#[derive(Debug, Clone)]
pub struct Material {
    /// Optional material name.
    pub name: Option<String>,
    /// Base color factor (RGBA).
    pub base_color_factor: [f32; 4],
    /// Metallic factor.
    pub metallic_factor: f32,
    /// Roughness factor.
    pub roughness_factor: f32,
    /// Emissive factor (RGB).
    pub emissive_factor: [f32; 3],
    /// Normal texture scale.
    pub normal_scale: f32,
    /// Occlusion texture strength.
    pub occlusion_strength: f32,
    /// Whether the material renders both faces.
    pub double_sided: bool,
    /// Base color texture.
    pub base_color_texture: Option<TextureSlot>,
    /// Metallic-roughness texture.
    pub metallic_roughness_texture: Option<TextureSlot>,
    /// Diffuse texture (specular-glossiness model).
    pub diffuse_texture: Option<TextureSlot>,
    /// Specular-glossiness texture (specular-glossiness model).
    pub specular_glossiness_texture: Option<TextureSlot>,
    /// Normal map.
    pub normal_texture: Option<TextureSlot>,
    /// Occlusion map.
    pub occlusion_texture: Option<TextureSlot>,
    /// Emissive map.
    pub emissive_texture: Option<TextureSlot>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0, 1.0, 1.0, 1.0],
            metallic_factor: 1.0,
            roughness_factor: 1.0,
            emissive_factor: [0.0, 0.0, 0.0],
            normal_scale: 1.0,
            occlusion_strength: 1.0,
            double_sided: false,
            base_color_texture: None,
            metallic_roughness_texture: None,
            diffuse_texture: None,
            specular_glossiness_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
        }
    }
}

impl Material {
    /// Mutable references to every present texture slot, in glTF declaration
    /// order. This is the complete set of slots the coalescer must rewire.
    pub fn texture_slots_mut(&mut self) -> [&mut Option<TextureSlot>; 7] {
        [
            &mut self.base_color_texture,
            &mut self.metallic_roughness_texture,
            &mut self.diffuse_texture,
            &mut self.specular_glossiness_texture,
            &mut self.normal_texture,
            &mut self.occlusion_texture,
            &mut self.emissive_texture,
        ]
    }

    /// References to every texture slot, in glTF declaration order.
    pub fn texture_slots(&self) -> [&Option<TextureSlot>; 7] {
        [
            &self.base_color_texture,
            &self.metallic_roughness_texture,
            &self.diffuse_texture,
            &self.specular_glossiness_texture,
            &self.normal_texture,
            &self.occlusion_texture,
            &self.emissive_texture,
        ]
    }
}
