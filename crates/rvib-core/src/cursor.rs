/// Forward-only, non-restartable iterator over `(docId, vector)` pairs for
/// one segment field.
///
/// A single cursor instance is consumed top to bottom exactly once. Every
/// new pass — a fresh upload part, the doc-id stream, a retry after
/// failure — asks the job's [`CursorFactory`] for a brand new instance
/// instead of rewinding this one.
pub trait VectorCursor: Send {
    /// Advances to the next live document, returning its doc id, or
    /// `None` once the cursor is exhausted.
    fn next(&mut self) -> Option<u32>;

    /// The byte view of the vector at the current position. Only valid
    /// after a call to `next()` that returned `Some`.
    fn current_vector(&self) -> &[u8];

    /// Vector dimensionality (component count).
    fn dimension(&self) -> u32;

    /// Width in bytes of one encoded vector.
    fn bytes_per_vector(&self) -> u32;

    /// Total number of live documents this cursor will yield.
    fn total_live_docs(&self) -> u64;
}

/// Supplies fresh [`VectorCursor`] instances on demand.
///
/// Cursors are not shared across threads or passes; the multi-part upload
/// phase asks for one cursor per part, each on its own task.
pub trait CursorFactory: Send + Sync {
    /// Builds a new cursor starting at the beginning of the field's live
    /// documents.
    fn new_cursor(&self) -> Box<dyn VectorCursor>;
}
