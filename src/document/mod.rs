mod render;
mod writer;

pub use render::{format_bytes, render_document, render_document_at};
pub use writer::{document_file_name, is_vault_relative, write_document};
