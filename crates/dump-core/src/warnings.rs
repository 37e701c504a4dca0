use crate::types::ColumnType;
use std::collections::HashSet;
use tracing::warn;

/// Remembers which lossy column categories were already reported during one export run.
///
/// A table with 100k rows of `bytea` should produce one warning, not 100k.
#[derive(Debug, Default)]
pub struct TypeWarningRegistry {
    warned: HashSet<ColumnType>,
}

impl TypeWarningRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning for `column_type` unless one was already logged in this run.
    ///
    /// Returns `true` when a warning was emitted.
    pub fn warn_once(&mut self, column_type: &ColumnType, type_name: &str) -> bool {
        if self.warned.contains(column_type) {
            return false;
        }
        match column_type {
            ColumnType::Unsupported(kind) if kind.is_byte_payload() => warn!(
                "Unsupported type: {} ({type_name}), values are replaced by a placeholder",
                kind.name()
            ),
            ColumnType::Unsupported(kind) => warn!(
                "Unsupported type: {} ({type_name}), values are exported as NULL",
                kind.name()
            ),
            _ => warn!("Unsupported type: ? ({type_name}), values are exported as NULL"),
        }
        self.warned.insert(column_type.clone());
        true
    }

    pub fn has_warned(&self, column_type: &ColumnType) -> bool {
        self.warned.contains(column_type)
    }

    /// Number of distinct categories reported so far.
    pub fn len(&self) -> usize {
        self.warned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warned.is_empty()
    }

    /// Forget everything, for the start of a new run.
    pub fn reset(&mut self) {
        self.warned.clear();
    }
}
