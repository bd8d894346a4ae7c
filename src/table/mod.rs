pub mod embedding_table;
pub mod loader;

pub use embedding_table::EmbeddingTable;
pub use loader::{load_index, TableInfo};
