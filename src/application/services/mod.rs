//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem) but are themselves
//! concrete structs, not traits.

mod assembler;
mod cluster;
mod extractor;
mod rename;

pub use assembler::TreeAssembler;
pub use cluster::ClusterBuilder;
pub use extractor::{Extraction, KeywordExtractor};
pub use rename::{rename_pillars, PillarNameService};
