/// Error code registry for streamio
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Open / spawn argument errors
/// - 3000-3999: Stream I/O errors
/// - 4000-4999: Subprocess errors
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_PARSE_ERROR: u16 = 1002;
    pub const CONFIG_INVALID_VALUE: u16 = 1003;

    // Open errors (2000-2999)
    pub const OPEN_INVALID_MODE: u16 = 2001;
    pub const OPEN_INVALID_DIRECTION: u16 = 2002;
    pub const OPEN_RESOURCE_UNAVAILABLE: u16 = 2003;

    // Stream I/O errors (3000-3999)
    pub const IO_END_OF_STREAM: u16 = 3001;
    pub const IO_FAILED: u16 = 3002;
    pub const IO_FAULTED: u16 = 3003;

    // Subprocess errors (4000-4999)
    pub const PROC_SPAWN_FAILED: u16 = 4001;
    pub const PROC_WAIT_FAILED: u16 = 4002;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        1001 => "Configuration file not found",
        1002 => "Failed to parse configuration",
        1003 => "Invalid value in configuration",

        2001 => "Unrecognized open mode",
        2002 => "Unrecognized pipe direction",
        2003 => "Backing resource could not be obtained",

        3001 => "End of stream reached",
        3002 => "Read, write or seek on the backing resource failed",
        3003 => "Stream is in a sticky error state",

        4001 => "Failed to spawn subprocess",
        4002 => "Failed to wait for subprocess",

        _ => "Unknown error code",
    }
}
