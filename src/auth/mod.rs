//! Authentication: session token extraction and principal resolution.

mod extractor;

pub use extractor::{SessionAuth, extract_token};
