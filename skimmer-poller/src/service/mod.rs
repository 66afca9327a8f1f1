//! Service layer
//!
//! Services contain the poller's business logic. They operate on the
//! repository traits and know nothing about HTTP or SQL:
//! - `SearchCheckpoint`: read and advance the persisted cutoff
//! - `CursorWalker`: page through search results down to the cutoff
//! - `ResultBatcher`: split found items into batches for the sink

mod batcher;
mod checkpoint;
mod walker;

pub use batcher::ResultBatcher;
pub use checkpoint::SearchCheckpoint;
pub use walker::CursorWalker;
