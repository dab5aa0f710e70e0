//! Column type tags and type inference

use serde::{Deserialize, Serialize};

/// Scalar type tag for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Null,
    Bool,
    Int,
    Float,
    String,
    /// Dictionary-like column of repeated string labels
    Category,
    Date,
    DateTime,
    Mixed,
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Null
    }
}

impl CellType {
    /// Widen the type to accommodate another type
    pub fn widen(self, other: CellType) -> CellType {
        if self == other {
            return self;
        }

        match (self, other) {
            (CellType::Null, t) | (t, CellType::Null) => t,
            (CellType::Int, CellType::Float) | (CellType::Float, CellType::Int) => CellType::Float,
            (CellType::Date, CellType::DateTime) | (CellType::DateTime, CellType::Date) => {
                CellType::DateTime
            }
            (CellType::Category, CellType::String) | (CellType::String, CellType::Category) => {
                CellType::Category
            }
            _ => CellType::Mixed,
        }
    }

    /// True for Int and Float columns
    pub fn is_numeric(self) -> bool {
        matches!(self, CellType::Int | CellType::Float)
    }

    /// True for Date and DateTime columns
    pub fn is_temporal(self) -> bool {
        matches!(self, CellType::Date | CellType::DateTime)
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellType::Null => write!(f, "null"),
            CellType::Bool => write!(f, "bool"),
            CellType::Int => write!(f, "int"),
            CellType::Float => write!(f, "float"),
            CellType::String => write!(f, "string"),
            CellType::Category => write!(f, "category"),
            CellType::Date => write!(f, "date"),
            CellType::DateTime => write!(f, "datetime"),
            CellType::Mixed => write!(f, "mixed"),
        }
    }
}
