mod errors;
mod model;
mod store;

pub mod storage;

pub use errors::*;
pub use model::*;
pub use store::*;

pub mod prelude {
    pub use crate::errors::{StorageError, StoreError};
    pub use crate::model::{RecordSet, User, UserEntry};
    pub use crate::storage::{JsonFileStorage, MemoryStorage, RecordStorage};
    pub use crate::store::RecordStore;
}


#[cfg(test)]
pub fn log_test() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
