//! Archive creation: the collect-and-write pipeline and its configuration.
//!
//! Each source root is walked on its own thread. Accepted entries travel
//! through a bounded queue to a single sink that appends them to the
//! container, which writes through the compression layer into the
//! destination file.

pub mod compression;
pub mod config;
pub mod creator;
pub mod destination;
pub mod filters;
pub mod pipeline;
pub mod report;
pub mod sink;
pub mod walker;

pub use config::ContainerKind;
pub use config::CreationConfig;
pub use creator::ArchiveCreator;
pub use destination::CollisionPolicy;
pub use filters::FilterRules;
pub use filters::PathFilter;
pub use report::CreationReport;
pub use sink::HeaderOverrides;
