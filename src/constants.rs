pub const INITIAL_BUF_SIZE: usize = 4096;
pub const MAX_HEADERS: usize = 32;
pub const MAX_PARAMS: usize = 32;

/// The read buffer may grow by doubling up to this cap before the
/// connection is failed with 413.
pub const MAX_READ_BUFFER: usize = 1024 * 1024;

pub const HTTP_OK: u16 = 200;
pub const HTTP_NO_CONTENT: u16 = 204;
pub const HTTP_BAD_REQUEST: u16 = 400;
pub const HTTP_UNAUTHORIZED: u16 = 401;
pub const HTTP_FORBIDDEN: u16 = 403;
pub const HTTP_NOT_FOUND: u16 = 404;
pub const HTTP_METHOD_NOT_ALLOWED: u16 = 405;
pub const HTTP_PAYLOAD_TOO_LARGE: u16 = 413;
pub const HTTP_INTERNAL_SERVER_ERROR: u16 = 500;
pub const HTTP_NOT_IMPLEMENTED: u16 = 501;
