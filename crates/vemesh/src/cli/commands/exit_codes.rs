//! Exit code constants for CLI commands.

/// Successful operation.
pub const EXIT_SUCCESS: i32 = 0;

/// The request was read but is not a valid construction request
/// (bad operations, metadata, keys, signatures, or transaction bytes).
pub const EXIT_INVALID_REQUEST: i32 = 1;

/// General error (configuration, I/O, node, etc.).
pub const EXIT_ERROR: i32 = 2;
