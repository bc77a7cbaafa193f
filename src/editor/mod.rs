mod headers;

pub use headers::{rows_from_text, HeaderRow, HeaderRows};
