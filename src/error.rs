use thiserror::Error;

/// Top-level error type for the massing pipeline.
#[derive(Debug, Error)]
pub enum MassingError {
    #[error(transparent)]
    Extrude(#[from] ExtrudeError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Errors raised while turning contours into an extruded solid.
#[derive(Debug, Error)]
pub enum ExtrudeError {
    #[error("degenerate polygon: {0}")]
    DegeneratePolygon(String),

    #[error("extrusion depth must be a positive finite number, got {0}")]
    InvalidDepth(f64),

    #[error("triangulation failed: {0}")]
    TriangulationFailed(String),
}

/// Errors raised while decoding external polygon buffers.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported dtype {dtype:?}: only \"float32\" buffers are accepted")]
    UnsupportedEncoding { dtype: String },

    #[error("unsupported codec {codec:?}: only \"b64\" buffers are accepted")]
    UnsupportedCodec { codec: String },

    #[error("invalid base64 buffer: {0}")]
    InvalidBuffer(#[from] base64::DecodeError),

    #[error("buffer of {len} bytes is not a whole number of little-endian f32 (x, y) pairs")]
    MisalignedBuffer { len: usize },

    #[error("malformed layer document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`MassingError`].
pub type Result<T> = std::result::Result<T, MassingError>;
