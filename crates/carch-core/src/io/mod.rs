//! I/O wrappers shared by the container writers.

pub mod counting;

pub use counting::CountingWriter;
