//! In-memory [`VectorCursor`] used across this crate's unit tests.

use rvib_core::VectorCursor;

pub struct FixedVectorCursor {
    vectors: Vec<Vec<u8>>,
    bytes_per_vector: u32,
    pos: Option<usize>,
}

impl FixedVectorCursor {
    pub fn new(vectors: Vec<Vec<u8>>) -> Self {
        let bytes_per_vector = vectors.first().map(|v| v.len()).unwrap_or(0) as u32;
        Self {
            vectors,
            bytes_per_vector,
            pos: None,
        }
    }
}

impl VectorCursor for FixedVectorCursor {
    fn next(&mut self) -> Option<u32> {
        let next_pos = match self.pos {
            None => 0,
            Some(p) => p + 1,
        };
        if next_pos >= self.vectors.len() {
            return None;
        }
        self.pos = Some(next_pos);
        Some(next_pos as u32)
    }

    fn current_vector(&self) -> &[u8] {
        &self.vectors[self.pos.expect("next() must be called before current_vector()")]
    }

    fn dimension(&self) -> u32 {
        self.bytes_per_vector / 4
    }

    fn bytes_per_vector(&self) -> u32 {
        self.bytes_per_vector
    }

    fn total_live_docs(&self) -> u64 {
        self.vectors.len() as u64
    }
}
