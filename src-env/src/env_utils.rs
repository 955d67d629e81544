//! Environment variable utilities for yawopt
//!
//! The binaries write their outputs (outcome JSON, text reports, per-generation
//! records) below `$YAWOPT_DIR/data_generated`.

use crate::constants::{DATA_GENERATED, RECORDS, YAWOPT_DIR_VAR};
use std::env;
use std::path::{Path, PathBuf};

/// Error type for environment variable issues
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "YAWOPT_DIR environment variable is not set. Please set it to the project root directory (e.g., export YAWOPT_DIR=/path/to/yawopt)"
    )]
    YawoptDirNotSet,

    #[error("YAWOPT_DIR points to a non-existent directory: {0}")]
    YawoptDirNotFound(PathBuf),

    #[error("Failed to create data_generated directory: {0}")]
    DataGeneratedCreationFailed(std::io::Error),
}

/// Get the YAWOPT_DIR environment variable and validate it exists
///
/// # Errors
///
/// Returns an error if:
/// - YAWOPT_DIR is not set
/// - YAWOPT_DIR points to a non-existent directory
///
/// # Example
///
/// ```no_run
/// use yawopt_env::env_utils::get_yawopt_dir;
///
/// let root = get_yawopt_dir()?;
/// println!("yawopt directory: {}", root.display());
/// # Ok::<(), yawopt_env::env_utils::EnvError>(())
/// ```
pub fn get_yawopt_dir() -> Result<PathBuf, EnvError> {
    let root = env::var(YAWOPT_DIR_VAR).map_err(|_| EnvError::YawoptDirNotSet)?;

    let path = PathBuf::from(root);

    if !path.exists() {
        return Err(EnvError::YawoptDirNotFound(path));
    }

    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), EnvError> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(EnvError::DataGeneratedCreationFailed)?;
    }
    Ok(())
}

/// Get the path to the data_generated directory, creating it if necessary
///
/// # Errors
///
/// Returns an error if YAWOPT_DIR is not set or invalid, or if the
/// directory cannot be created.
pub fn get_data_generated_dir() -> Result<PathBuf, EnvError> {
    let data_generated = get_yawopt_dir()?.join(DATA_GENERATED);
    ensure_dir(&data_generated)?;
    Ok(data_generated)
}

/// Get the path to the records subdirectory within data_generated
///
/// # Example
///
/// ```no_run
/// use yawopt_env::env_utils::get_records_dir;
///
/// let records_dir = get_records_dir()?;
/// println!("Records directory: {}", records_dir.display());
/// # Ok::<(), yawopt_env::env_utils::EnvError>(())
/// ```
pub fn get_records_dir() -> Result<PathBuf, EnvError> {
    let records_dir = get_data_generated_dir()?.join(RECORDS);
    ensure_dir(&records_dir)?;
    Ok(records_dir)
}

/// Check if YAWOPT_DIR is properly configured and print helpful information
///
/// # Example
///
/// ```no_run
/// use yawopt_env::env_utils::check_yawopt_env;
///
/// if let Err(e) = check_yawopt_env() {
///     eprintln!("Environment setup error: {}", e);
///     std::process::exit(1);
/// }
/// ```
pub fn check_yawopt_env() -> Result<(), EnvError> {
    let root = get_yawopt_dir()?;
    let data_generated = get_data_generated_dir()?;

    println!("✓ YAWOPT_DIR: {}", root.display());
    println!("✓ Data directory: {}", data_generated.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // tests in this module mutate the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_var<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let original = env::var(YAWOPT_DIR_VAR).ok();
        unsafe {
            match value {
                Some(v) => env::set_var(YAWOPT_DIR_VAR, v),
                None => env::remove_var(YAWOPT_DIR_VAR),
            }
        }
        let out = f();
        unsafe {
            match original {
                Some(v) => env::set_var(YAWOPT_DIR_VAR, v),
                None => env::remove_var(YAWOPT_DIR_VAR),
            }
        }
        out
    }

    #[test]
    fn test_yawopt_dir_not_set() {
        let result = with_var(None, get_yawopt_dir);
        assert!(matches!(result, Err(EnvError::YawoptDirNotSet)));
    }

    #[test]
    fn test_yawopt_dir_nonexistent() {
        let result = with_var(Some("/this/path/should/not/exist"), get_yawopt_dir);
        assert!(matches!(result, Err(EnvError::YawoptDirNotFound(_))));
    }

    #[test]
    fn test_records_dir_is_created() {
        let root = tempfile::tempdir().unwrap();
        let root_str = root.path().to_str().unwrap().to_string();
        let records = with_var(Some(&root_str), get_records_dir).unwrap();
        assert_eq!(records, root.path().join(DATA_GENERATED).join(RECORDS));
        assert!(records.is_dir());
    }

    #[test]
    fn test_check_env_prepares_data_directory() {
        assert!(matches!(with_var(None, check_yawopt_env), Err(EnvError::YawoptDirNotSet)));

        let root = tempfile::tempdir().unwrap();
        let root_str = root.path().to_str().unwrap().to_string();
        with_var(Some(&root_str), check_yawopt_env).unwrap();
        assert!(root.path().join(DATA_GENERATED).is_dir());
    }
}
