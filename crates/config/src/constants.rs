//! Default locations and environment variable names for pkgsig

pub const DB_PATH: &str = "/var/lib/pkgsig/state.sqlite";

pub const DEFAULT_LOG_FILTER: &str = "warn,pkgsig=info";

pub const SIGNATURE_EXTENSION: &str = "minisig";

pub const ENV_DB_PATH: &str = "PKGSIG_DB_PATH";
pub const ENV_LOG: &str = "PKGSIG_LOG";
pub const ENV_LOG_JSON: &str = "PKGSIG_LOG_JSON";
