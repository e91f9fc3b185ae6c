mod clock;
pub mod json;
mod memory_store;
mod recording;

pub use clock::*;
pub use json::JsonFileStore;
pub use memory_store::MemoryStore;
pub use recording::*;
