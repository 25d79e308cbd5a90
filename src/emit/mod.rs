//! Stream emission
//!
//! Writes the discovery catalog, or the SCHEMA message followed by the
//! RECORD messages, to a single output sink.

pub mod emitter;
pub mod message;
pub mod writer;

pub use emitter::StreamEmitter;
pub use message::Message;
pub use writer::MessageWriter;
