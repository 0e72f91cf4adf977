//! # sct-io: Persistence and Import for School Connectivity Costing
//!
//! Everything that touches the filesystem lives here: the storage backend
//! abstraction, the versioned cache documents, and the CSV/config importers
//! that assemble a [`sct_schemas::ModelDataSpace`] from a workspace.
//!
//! The storage backend is an explicit dependency ([`DataStore`]) rather than
//! a process-global, so tests can substitute their own.

pub mod cache_io;
pub mod importers;
pub mod storage;

pub use cache_io::{
    load_greedy_cache, save_greedy_cache, CACHE_SCHEMA_VERSION, CONNECTED_CACHE_FILE,
    UNCONNECTED_CACHE_FILE,
};
pub use importers::{load_data_space, load_fiber_config, read_fiber_nodes_csv, read_schools_csv};
pub use storage::{DataStore, LocalDataStore};
