use rvib_core::{DataType, Engine, IndexParameters};
use serde::{Deserialize, Serialize};

/// Request body for `POST <endpoint>/_build`. Field names and nesting
/// must match the remote build service's wire contract exactly.
#[derive(Debug, Clone, Serialize)]
pub struct RemoteBuildRequest {
    pub repository_type: String,
    pub container_name: String,
    pub vector_path: String,
    pub doc_id_path: String,
    pub tenant_id: String,
    pub dimension: u32,
    pub doc_count: u64,
    pub data_type: &'static str,
    pub engine: Engine,
    pub index_parameters: IndexParameters,
}

impl RemoteBuildRequest {
    /// Builds a request, translating [`DataType`] to its wire token.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        repository_type: impl Into<String>,
        container_name: impl Into<String>,
        vector_path: impl Into<String>,
        doc_id_path: impl Into<String>,
        tenant_id: impl Into<String>,
        dimension: u32,
        doc_count: u64,
        data_type: DataType,
        engine: impl Into<Engine>,
        index_parameters: IndexParameters,
    ) -> Self {
        Self {
            repository_type: repository_type.into(),
            container_name: container_name.into(),
            vector_path: vector_path.into(),
            doc_id_path: doc_id_path.into(),
            tenant_id: tenant_id.into(),
            dimension,
            doc_count,
            data_type: data_type.wire_str(),
            engine: engine.into(),
            index_parameters,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteBuildResponseWire {
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildStatusWire {
    pub task_status: String,
    pub index_path: Option<String>,
    pub error: Option<String>,
}

/// The result of one `GET <endpoint>/_status/<jobId>` call, parsed and
/// validated against the invariants for each terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Running,
    Completed { index_path: String },
    Failed { error: String },
}
