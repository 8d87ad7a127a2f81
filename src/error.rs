//! Error types for the asset pipeline.

/// Ways a source asset can fail structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Malformed {
    /// A cross-reference does not resolve inside the asset's own arrays.
    DanglingReference {
        /// Entity kind the reference points at (e.g. `"buffer"`, `"accessor"`).
        entity: &'static str,
        /// The offending index.
        index: usize,
    },
    /// An accessor has no buffer view to read through.
    MissingView {
        /// Accessor index in the asset.
        accessor: usize,
    },
    /// An accessor read falls outside its buffer.
    OutOfBounds {
        /// Accessor index in the asset.
        accessor: usize,
    },
    /// An accessor with a non-scalar element type was used as an index source.
    NonScalarIndices {
        /// Accessor index in the asset.
        accessor: usize,
    },
    /// The flattener requires a coalesced, single-buffer source.
    MultipleBuffers {
        /// Number of buffers the source carried.
        count: usize,
    },
    /// An operation that requires a flattened asset received one that is not.
    NotFlattened,
}

impl std::fmt::Display for Malformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DanglingReference { entity, index } => {
                write!(f, "dangling {entity} reference (index {index})")
            }
            Self::MissingView { accessor } => {
                write!(f, "accessor {accessor} has no buffer view")
            }
            Self::OutOfBounds { accessor } => {
                write!(f, "accessor {accessor} reads outside its buffer")
            }
            Self::NonScalarIndices { accessor } => {
                write!(f, "accessor {accessor} is not scalar and cannot supply indices")
            }
            Self::MultipleBuffers { count } => {
                write!(f, "expected a single-buffer asset, found {count} buffers")
            }
            Self::NotFlattened => write!(f, "asset is not flattened"),
        }
    }
}

/// Errors that can occur during pipeline operations.
#[derive(Debug)]
pub enum PipelineError {
    /// The source asset is structurally invalid for the requested operation.
    MalformedInput(Malformed),
    /// The atlas engine rejected a mesh.
    ParameterizationFailed {
        /// Name of the offending mesh (empty when not tied to one mesh).
        mesh: String,
        /// Engine-provided reason.
        reason: String,
    },
    /// Failed to parse a glTF document.
    Parse(gltf_dep::Error),
    /// File I/O failure while loading or saving.
    Io(std::io::Error),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(m) => write!(f, "malformed input: {m}"),
            Self::ParameterizationFailed { mesh, reason } => {
                if mesh.is_empty() {
                    write!(f, "parameterization failed: {reason}")
                } else {
                    write!(f, "parameterization of mesh \"{mesh}\" failed: {reason}")
                }
            }
            Self::Parse(e) => write!(f, "glTF parse error: {e}"),
            Self::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Malformed> for PipelineError {
    fn from(m: Malformed) -> Self {
        Self::MalformedInput(m)
    }
}

impl From<gltf_dep::Error> for PipelineError {
    fn from(e: gltf_dep::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
