pub mod config;
pub mod fixtures;

pub use config::BenchConfig;
pub use fixtures::{BenchUser, FakeDatabase, KeyGenerator, warm_cache};
