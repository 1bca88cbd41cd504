//! Archive formats: sniffing, compression kinds and the tar and zip
//! containers.

pub mod compression;
pub mod detect;
pub mod tar;
pub mod traits;
pub mod zip;

pub use compression::Compression;
pub use detect::Format;
pub use detect::detect;
pub use detect::detect_bytes;
pub use detect::detect_path;
pub use tar::TarArchiver;
pub use traits::Archiver;
pub use zip::ZipArchiver;
