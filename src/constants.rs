//! Global constants for dleapp.
//!
//! This module centralizes hardcoded names and sizes so the on-disk layout
//! of a run is defined in one place.

// Buffer and size constants
/// Buffer size for hashing and copying files (1MB)
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Files larger than this are listed without a hash by the inventory parser (2GB)
pub const MAX_HASH_SIZE_MB: u64 = 2048;

// Path handling
/// Windows long-path marker
pub const LONG_PATH_PREFIX: &str = r"\\?\";

/// Prefix of the per-container scratch directory
pub const STAGING_DIR_PREFIX: &str = "seeker-";

/// Suffix of a member that is still being written
pub const STAGING_PARTIAL_SUFFIX: &str = ".partial";

// Profile format
/// Schema tag every profile must carry
pub const PROFILE_SCHEMA_TAG: &str = "dleapp";

/// The only profile format version understood
pub const PROFILE_FORMAT_VERSION: u32 = 1;

/// Extension of saved profiles
pub const PROFILE_EXTENSION: &str = "dlprofile";

// Output layout
pub const REPORT_FOLDER_PREFIX: &str = "DLEAPP_Reports_";
pub const SCRIPT_LOGS_DIR: &str = "Script Logs";
pub const TEMP_DIR: &str = "temp";
pub const AUDIT_LOG_NAME: &str = "ProcessedFilesLog.txt";
pub const RUN_LOG_NAME: &str = "run.log";
pub const SUMMARY_JSON_NAME: &str = "run_summary.json";
pub const REPORT_TEXT_NAME: &str = "Report.txt";

/// File the artifact path list is appended to
pub const PATH_LIST_NAME: &str = "path_list.txt";

/// Default file name for `init-plugins`
pub const DEFAULT_PLUGINS_FILE: &str = "dleapp_plugins.yaml";

/// chrono format of the report folder timestamp, e.g. `2024-03-01_Fri_142233`
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%a_%H%M%S";
