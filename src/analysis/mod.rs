mod cache;
pub mod events;
pub mod source;

pub use cache::{
    CacheBackend, CacheEntry, CacheManager, FileBackend, MemoryBackend, DEFAULT_MEMORY_CAPACITY,
    DEFAULT_TTL,
};
pub use events::{aggregate_events, contribution, decode_events, Contribution};
pub use source::{EventSource, JsonFileSource, StaticSource};
