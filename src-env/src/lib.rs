//! Environment helpers shared by the yawopt binaries.

pub mod constants;
pub mod env_utils;

pub use constants::{DATA_GENERATED, RECORDS, YAWOPT_DIR_VAR};
pub use env_utils::{EnvError, check_yawopt_env, get_data_generated_dir, get_records_dir, get_yawopt_dir};
