mod loader;

pub use loader::{RecordBatch, RecordKind, RecordLoader, RecordLoaderError};
