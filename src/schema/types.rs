//! Schema types

use serde::{Deserialize, Serialize};

/// Storage type of a flat column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// UTF-8 text
    #[default]
    Text,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
        }
    }
}

/// A named, typed, nullable column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Storage type
    pub kind: ColumnKind,
}

impl Column {
    /// Create a column
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a text column
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Text)
    }
}

/// The fixed column set of one job's output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<Column>,
}

impl TableSchema {
    /// Create a schema from columns
    ///
    /// Later duplicates of a column name are dropped.
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        let mut unique: Vec<Column> = Vec::new();
        for column in columns {
            if !unique.iter().any(|c| c.name == column.name) {
                unique.push(column);
            }
        }
        Self { columns: unique }
    }

    /// Columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Check if a column exists
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
