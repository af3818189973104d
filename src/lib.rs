pub mod signature;
pub mod name;
pub mod block;
pub mod container;

pub use signature::{scan_signatures, SIG_PREFIX};
pub use name::{extract_name, NameHit, UNKNOWN_NAME};
pub use block::{Block, BlockSummary};
pub use container::{Container, ContainerError, ImportOutcome, ImportPolicy};
