/// Environment variable pointing at the project root
pub const YAWOPT_DIR_VAR: &str = "YAWOPT_DIR";

/// Directory (relative to `YAWOPT_DIR`) receiving generated outputs
pub const DATA_GENERATED: &str = "data_generated";

/// Subdirectory of `DATA_GENERATED` holding optimization records
pub const RECORDS: &str = "records";
