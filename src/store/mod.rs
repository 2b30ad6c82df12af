pub mod keys;
pub mod kv;
pub mod lock;
pub mod watcher;

pub use kv::Store;
