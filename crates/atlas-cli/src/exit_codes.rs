//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: u8 = 0;

/// General error - unspecified failure
pub const ERROR: u8 = 1;

/// Config error - missing, unparsable or invalid config, or a path escape
pub const CONFIG_ERROR: u8 = 2;

/// Render error - at least one release failed to render or fetch
pub const RENDER_ERROR: u8 = 3;

/// Not found - a named release is not declared
pub const NOT_FOUND: u8 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: u8 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: u8 = 64;
