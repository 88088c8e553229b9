use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cursor::CursorFactory;
use crate::error::{Error, Result};
use crate::types::{Algorithm, Engine, SpaceType};

/// Vector component encoding, as carried on the wire (`data_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 4-byte IEEE-754 floats.
    F32,
    /// Signed single-byte components.
    Byte,
    /// Packed binary components.
    Binary,
}

impl DataType {
    /// The exact wire token used in `RemoteBuildRequest.data_type`:
    /// `"float" | "byte" | "binary"`.
    pub fn wire_str(self) -> &'static str {
        match self {
            DataType::F32 => "float",
            DataType::Byte => "byte",
            DataType::Binary => "binary",
        }
    }
}

/// `index_parameters.algorithm_parameters` and its enclosing
/// `space_type`/`algorithm` pair. Kept as a JSON object rather than
/// enumerated fields because the remote builder's accepted algorithm
/// parameters vary by engine and are opaque to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexParameters {
    /// e.g. `"l2"`, `"innerproduct"`.
    pub space_type: SpaceType,
    /// e.g. `"hnsw"`.
    pub algorithm: Algorithm,
    /// Algorithm-specific knobs (`ef_construction`, `ef_search`, `m`, ...).
    pub algorithm_parameters: serde_json::Value,
}

/// The immutable description of one field-per-segment build.
///
/// Owned by the caller (the segment-writer framework) and borrowed by the
/// orchestrator for the duration of one `build`/`build_flush`/`build_merge`
/// call. `Sink` is the segment output handle the finished artifact is
/// streamed into.
pub struct SegmentBuildJob<Sink> {
    segment_id: String,
    field_name: String,
    total_live_docs: u64,
    bytes_per_vector: u32,
    dimension: u32,
    data_type: DataType,
    engine: Engine,
    method_params: IndexParameters,
    cursor_factory: Arc<dyn CursorFactory>,
    segment_sink: Sink,
}

impl<Sink> SegmentBuildJob<Sink> {
    /// Builds a new job, validating the invariants the orchestrator
    /// requires before entering `UPLOADING`: `total_live_docs > 0`,
    /// `bytes_per_vector > 0`, and `dimension > 0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        segment_id: impl Into<String>,
        field_name: impl Into<String>,
        total_live_docs: u64,
        bytes_per_vector: u32,
        dimension: u32,
        data_type: DataType,
        engine: impl Into<Engine>,
        method_params: IndexParameters,
        cursor_factory: Arc<dyn CursorFactory>,
        segment_sink: Sink,
    ) -> Result<Self> {
        if total_live_docs == 0 {
            return Err(Error::ProgrammingError(
                "SegmentBuildJob requires total_live_docs > 0".to_string(),
            ));
        }
        if bytes_per_vector == 0 {
            return Err(Error::ProgrammingError(
                "SegmentBuildJob requires bytes_per_vector > 0".to_string(),
            ));
        }
        if dimension == 0 {
            return Err(Error::ProgrammingError(
                "SegmentBuildJob requires dimension > 0".to_string(),
            ));
        }

        Ok(Self {
            segment_id: segment_id.into(),
            field_name: field_name.into(),
            total_live_docs,
            bytes_per_vector,
            dimension,
            data_type,
            engine: engine.into(),
            method_params,
            cursor_factory,
            segment_sink,
        })
    }

    /// Segment identifier this build belongs to.
    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    /// Vector field name within the segment.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Number of live documents carrying this vector field.
    pub fn total_live_docs(&self) -> u64 {
        self.total_live_docs
    }

    /// Width in bytes of one encoded vector.
    pub fn bytes_per_vector(&self) -> u32 {
        self.bytes_per_vector
    }

    /// Total size in bytes of the vector blob for this job.
    pub fn vector_blob_len(&self) -> u64 {
        self.total_live_docs * self.bytes_per_vector as u64
    }

    /// Total size in bytes of the doc-id blob for this job.
    pub fn doc_id_blob_len(&self) -> u64 {
        self.total_live_docs * 4
    }

    /// Vector dimensionality.
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Vector component encoding.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Target ANN engine (`"faiss"`, ...).
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Index build parameters.
    pub fn method_params(&self) -> &IndexParameters {
        &self.method_params
    }

    /// Obtains a fresh cursor over this job's vectors.
    pub fn new_cursor(&self) -> Box<dyn crate::cursor::VectorCursor> {
        self.cursor_factory.new_cursor()
    }

    /// Borrows the segment output sink.
    pub fn segment_sink(&mut self) -> &mut Sink {
        &mut self.segment_sink
    }

    /// Consumes the job, returning its segment sink.
    pub fn into_segment_sink(self) -> Sink {
        self.segment_sink
    }
}

/// The derived blob names for one job.
///
/// `base_name` is globally unique per job: `uuid + "_" + field_name + "_" +
/// segment_id`.
#[derive(Debug, Clone)]
pub struct BlobNames {
    /// The shared prefix both blob paths are derived from.
    pub base_name: String,
    /// `<base_name>.knnvec`.
    pub vector_path: String,
    /// `<base_name>.knndid`.
    pub doc_id_path: String,
}

impl BlobNames {
    /// Derives a fresh, globally-unique blob-name pair for a job.
    pub fn new(field_name: &str, segment_id: &str) -> Self {
        let base_name = format!("{}_{field_name}_{segment_id}", Uuid::new_v4());
        Self {
            vector_path: format!("{base_name}.knnvec"),
            doc_id_path: format!("{base_name}.knndid"),
            base_name,
        }
    }
}
