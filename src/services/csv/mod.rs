pub mod analyzer;
pub mod table;
pub mod tokenizer;
pub mod types;
pub mod utils;

pub use analyzer::ColumnAnalyzer;
pub use table::parse_table;
pub use types::{ColumnInfo, TablePreview, PREVIEW_ROWS};
