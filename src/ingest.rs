use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::error::IngestError;
use crate::math::{Point2, Polygon};

/// External representation of one polygon: a flat coordinate buffer as
/// emitted by the upstream layout serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct PolygonRecord {
    /// Declared element type of the buffer; only `"float32"` is supported.
    pub dtype: String,
    /// Base64-encoded little-endian coordinate bytes.
    pub buffer: String,
    /// Flat element count as declared upstream, if present.
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
    /// Buffer codec; absent means base64.
    #[serde(default)]
    pub codec: Option<String>,
}

/// A record that failed to decode, with enough context to report it.
#[derive(Debug)]
pub struct SkippedRecord {
    /// Layer the record belonged to.
    pub layer: String,
    /// Position of the record within its layer.
    pub index: usize,
    /// Why the record was skipped.
    pub error: IngestError,
}

/// The decoded result of one ingestion batch.
#[derive(Debug, Default)]
pub struct LayerPolygons {
    /// Successfully decoded polygons, per layer.
    pub layers: BTreeMap<String, Vec<Polygon>>,
    /// Records that failed to decode. A skipped record never prevents
    /// sibling records or other layers from being processed.
    pub skipped: Vec<SkippedRecord>,
}

/// Decodes a batch of named layers from the external representation.
pub struct DecodeLayers {
    layers: BTreeMap<String, Vec<PolygonRecord>>,
}

impl DecodeLayers {
    /// Creates a new `DecodeLayers` operation.
    #[must_use]
    pub fn new(layers: BTreeMap<String, Vec<PolygonRecord>>) -> Self {
        Self { layers }
    }

    /// Executes the decode. Per-record failures are logged and collected
    /// in [`LayerPolygons::skipped`]; they do not abort the batch.
    #[must_use]
    pub fn execute(&self) -> LayerPolygons {
        let mut result = LayerPolygons::default();
        for (layer, records) in &self.layers {
            let mut polygons = Vec::with_capacity(records.len());
            for (index, record) in records.iter().enumerate() {
                match decode_record(record) {
                    Ok(polygon) => polygons.push(polygon),
                    Err(error) => {
                        tracing::warn!(layer = %layer, index, %error, "skipping polygon record");
                        result.skipped.push(SkippedRecord {
                            layer: layer.clone(),
                            index,
                            error,
                        });
                    }
                }
            }
            result.layers.insert(layer.clone(), polygons);
        }
        result
    }
}

/// Parses the upstream JSON document into the layer map.
///
/// # Errors
///
/// Returns [`IngestError::Json`] if the document itself is malformed; this
/// is the only ingestion error that has no partial result to salvage.
pub fn parse_layers(json: &str) -> Result<BTreeMap<String, Vec<PolygonRecord>>, IngestError> {
    Ok(serde_json::from_str(json)?)
}

/// Decodes one record into a polygon of `(x, y)` points.
///
/// The buffer is interpreted as a flat little-endian f32 array and
/// regrouped pairwise; coordinates are widened to f64.
///
/// # Errors
///
/// Returns [`IngestError::UnsupportedCodec`] for a codec other than
/// `"b64"`, [`IngestError::UnsupportedEncoding`] for a dtype other than
/// `"float32"`, [`IngestError::InvalidBuffer`] if the base64 payload is
/// malformed, and [`IngestError::MisalignedBuffer`] if the byte length is
/// not a whole number of coordinate pairs.
pub fn decode_record(record: &PolygonRecord) -> Result<Polygon, IngestError> {
    if let Some(codec) = &record.codec {
        if codec != "b64" {
            return Err(IngestError::UnsupportedCodec {
                codec: codec.clone(),
            });
        }
    }
    if record.dtype != "float32" {
        return Err(IngestError::UnsupportedEncoding {
            dtype: record.dtype.clone(),
        });
    }

    let bytes = STANDARD.decode(&record.buffer)?;
    // 8 bytes per point: two little-endian f32 values.
    if bytes.len() % 8 != 0 {
        return Err(IngestError::MisalignedBuffer { len: bytes.len() });
    }

    let mut points = Vec::with_capacity(bytes.len() / 8);
    for pair in bytes.chunks_exact(8) {
        let x = f32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]);
        let y = f32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]);
        points.push(Point2::new(f64::from(x), f64::from(y)));
    }
    Ok(points)
}
