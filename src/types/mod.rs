mod digest;
mod file;
mod record;

pub use digest::ContentDigest;
pub use file::{format_bytes, MimeDetector, DEFAULT_MIME_TYPE};
pub use record::{FileRecord, NewFileRecord, StorageSummary};
