pub mod memory;

pub use memory::{MemoryStore, MetadataStore, Payload};
