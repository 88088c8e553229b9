#![forbid(unsafe_code)]
#![deny(unreachable_pub)]

//! Byte-stream adapters between [`rvib_core::VectorCursor`] and the
//! repository and codec layers: packing vectors and doc ids into wire
//! bytes, and copying downloaded artifacts into a segment sink.

mod buffered_sink;
mod doc_id_stream;
mod vector_stream;

#[cfg(test)]
mod test_support;

pub use buffered_sink::BufferedSink;
pub use doc_id_stream::DocIdByteStream;
pub use vector_stream::VectorByteStream;
