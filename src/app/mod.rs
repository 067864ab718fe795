pub mod config;
mod state;

pub use config::{CacheBackendKind, CacheConfig, Config, RenderDefaults};
pub use state::App;
