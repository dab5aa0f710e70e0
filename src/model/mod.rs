//! Columnar table model

mod schema;
mod table;

pub use schema::CellType;
pub use table::{CellValue, Column, Table};
