// path constants
pub const PATH_SEPARATOR: &str = "/";
pub const FIELD_SEPARATOR: &str = ".";

// id constants
pub const AUTO_ID_LENGTH: usize = 20;
pub const AUTO_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// field constants
pub const DOCUMENT_ID_FIELD: &str = "__name__";
pub const RESERVED_FIELDS: [&str; 1] = [DOCUMENT_ID_FIELD];
