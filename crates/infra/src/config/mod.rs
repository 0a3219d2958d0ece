//! Configuration loading
//!
//! Layered loading of the application configuration plus the API token
//! file.

pub mod loader;

pub use loader::{
    load, load_from_env, load_from_file, probe_config_paths, read_token, resolve_data_dir,
    save_token, validate,
};
