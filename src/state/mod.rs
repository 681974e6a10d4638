pub(crate) mod encoding;
mod persistence;

pub use persistence::{
    FileStorage, MemoryStorage, PersistenceError, PersistenceResult, ProjectSnapshot,
    ProjectStorage,
};
