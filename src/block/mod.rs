//! Block registry for block-lights.
//!
//! Provides the block data model, hardware addresses, colours, the ordered
//! registry and its durable record format.

mod block;
mod colour;
mod mac;
mod record;
mod registry;

pub use block::{Block, BlockStatus, MASTER_NUMBER, MAX_NUMBER};
pub use colour::Colour;
pub use mac::MacAddress;
pub use record::{
    format_records, parse_records, write_records, BlockRecord, ParsedRecords, RECORD_CAPACITY,
};
pub use registry::{BlockRegistry, Swap, MAX_BLOCKS};
