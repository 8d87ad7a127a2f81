//! Boundary to the external UV atlas (charting + packing) engine.
//!
//! The parameterizer talks to the engine through [`AtlasEngine`]: one
//! [`add_mesh`](AtlasEngine::add_mesh) call per input mesh, one
//! [`generate`](AtlasEngine::generate) call to compute, parameterize, and
//! pack the charts. Engine teardown is `Drop`; the pipeline consumes the
//! engine for the duration of a single `parameterize` call.

/// A borrowed vertex stream: raw bytes plus a byte stride between elements.
#[derive(Debug, Clone, Copy)]
pub struct VertexStream<'a> {
    /// Raw little-endian element data.
    pub data: &'a [u8],
    /// Byte stride between consecutive elements.
    pub stride: usize,
}

/// Declaration of one input mesh for the atlas engine.
///
/// Positions are guaranteed packed f32 vec3 and indices packed u32 — the
/// flattening pass establishes both before parameterization runs.
#[derive(Debug, Clone, Copy)]
pub struct MeshDecl<'a> {
    /// Number of input vertices.
    pub vertex_count: u32,
    /// Required position stream (f32 x 3 per vertex).
    pub positions: VertexStream<'a>,
    /// Optional normal stream (f32 x 3 per vertex); improves chart quality.
    pub normals: Option<VertexStream<'a>>,
    /// Optional seed UV stream (f32 x 2 per vertex).
    pub uvs: Option<VertexStream<'a>>,
    /// Number of indices (3 per triangle).
    pub index_count: u32,
    /// Packed little-endian u32 index data.
    pub index_data: &'a [u8],
}

impl MeshDecl<'_> {
    /// Read index `i` from the packed index stream.
    pub fn index(&self, i: usize) -> u32 {
        let o = i * 4;
        u32::from_le_bytes([
            self.index_data[o],
            self.index_data[o + 1],
            self.index_data[o + 2],
            self.index_data[o + 3],
        ])
    }

    /// Read the position of vertex `i`.
    pub fn position(&self, i: usize) -> [f32; 3] {
        let base = i * self.positions.stride;
        let mut out = [0.0f32; 3];
        for (lane, slot) in out.iter_mut().enumerate() {
            let o = base + lane * 4;
            *slot = f32::from_le_bytes([
                self.positions.data[o],
                self.positions.data[o + 1],
                self.positions.data[o + 2],
                self.positions.data[o + 3],
            ]);
        }
        out
    }
}

/// One output vertex: the source vertex it came from plus its atlas UV.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasVertex {
    /// Index of the source vertex this output vertex samples.
    pub xref: u32,
    /// Packed atlas UV.
    pub uv: [f32; 2],
}

/// The engine's result for one input mesh.
///
/// The vertex count may exceed the input's: chart seams split vertices.
#[derive(Debug, Clone, Default)]
pub struct AtlasMesh {
    /// Output vertices.
    pub vertices: Vec<AtlasVertex>,
    /// Triangle indices into `vertices` (3 per triangle).
    pub indices: Vec<u32>,
}

/// Options for the chart packing step. Zero fields mean "let the engine
/// choose".
#[derive(Debug, Clone, Copy)]
pub struct AtlasOptions {
    /// Target atlas resolution in texels.
    pub resolution: u32,
    /// Padding between charts in texels.
    pub padding: u32,
    /// Texel density; 0 derives it from the geometry.
    pub texels_per_unit: f32,
}

impl Default for AtlasOptions {
    fn default() -> Self {
        Self {
            resolution: 0,
            padding: 0,
            texels_per_unit: 0.0,
        }
    }
}

/// Error reported by an atlas engine.
#[derive(Debug)]
pub struct AtlasError(pub String);

impl std::fmt::Display for AtlasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AtlasError {}

/// A charting/packing engine.
///
/// Implementations wrap an external atlas library; tests use a deterministic
/// engine that emits identity UVs.
pub trait AtlasEngine {
    /// Register one input mesh. Errors surface as
    /// `ParameterizationFailed` with the mesh's name.
    fn add_mesh(&mut self, decl: &MeshDecl<'_>) -> Result<(), AtlasError>;

    /// Compute charts, parameterize, and pack; returns one [`AtlasMesh`] per
    /// registered input mesh, in registration order.
    fn generate(&mut self, options: &AtlasOptions) -> Result<Vec<AtlasMesh>, AtlasError>;
}
