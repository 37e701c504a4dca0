//! Column categories.
//!
//! A driver reports a native type code per result column; the driver crate maps each
//! code onto exactly one [`ColumnType`]. The category, not the native code, decides
//! how a value is written as a SQL literal.

use std::fmt;

/// Category of a result column, derived from the driver's type code.
///
/// The set is closed: codes a driver does not recognise land in [`ColumnType::Unknown`],
/// so every column has a defined encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Integer-like (smallint, integer, bigint, oid)
    Integer,
    /// Floating point or exact decimal
    Decimal,
    /// Character data, including national character variants
    Character,
    /// Boolean
    Boolean,
    /// The untyped NULL column
    Null,
    /// Calendar date without time
    Date,
    /// Time of day without zone
    Time,
    /// Date and time without zone
    Timestamp,
    /// Known type that cannot be exported faithfully
    Unsupported(UnsupportedKind),
    /// Type code the driver crate does not map; carries the driver's type name
    Unknown(String),
}

/// Types recognised but not exported faithfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedKind {
    // byte payloads
    Binary,
    Blob,
    Clob,
    Other,
    // structural / reference types
    Array,
    Struct,
    Distinct,
    Ref,
    RowId,
    Xml,
    RefCursor,
    TimeWithTimeZone,
    TimestampWithTimeZone,
}

impl UnsupportedKind {
    /// Whether values of this kind carry a byte payload that gets a visible placeholder.
    ///
    /// Structural and reference kinds are written as `NULL` instead.
    pub fn is_byte_payload(self) -> bool {
        matches!(
            self,
            UnsupportedKind::Binary
                | UnsupportedKind::Blob
                | UnsupportedKind::Clob
                | UnsupportedKind::Other
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            UnsupportedKind::Binary => "BINARY",
            UnsupportedKind::Blob => "BLOB",
            UnsupportedKind::Clob => "CLOB",
            UnsupportedKind::Other => "OTHER",
            UnsupportedKind::Array => "ARRAY",
            UnsupportedKind::Struct => "STRUCT",
            UnsupportedKind::Distinct => "DISTINCT",
            UnsupportedKind::Ref => "REF",
            UnsupportedKind::RowId => "ROWID",
            UnsupportedKind::Xml => "SQLXML",
            UnsupportedKind::RefCursor => "REF_CURSOR",
            UnsupportedKind::TimeWithTimeZone => "TIME_WITH_TIMEZONE",
            UnsupportedKind::TimestampWithTimeZone => "TIMESTAMP_WITH_TIMEZONE",
        }
    }
}

impl ColumnType {
    /// True for the categories that are degraded on export.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ColumnType::Unsupported(_) | ColumnType::Unknown(_))
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::Time | ColumnType::Timestamp
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("INTEGER"),
            ColumnType::Decimal => f.write_str("DECIMAL"),
            ColumnType::Character => f.write_str("CHARACTER"),
            ColumnType::Boolean => f.write_str("BOOLEAN"),
            ColumnType::Null => f.write_str("NULL"),
            ColumnType::Date => f.write_str("DATE"),
            ColumnType::Time => f.write_str("TIME"),
            ColumnType::Timestamp => f.write_str("TIMESTAMP"),
            ColumnType::Unsupported(kind) => f.write_str(kind.name()),
            ColumnType::Unknown(name) => write!(f, "UNKNOWN({name})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_payload_kinds() {
        assert!(UnsupportedKind::Binary.is_byte_payload());
        assert!(UnsupportedKind::Blob.is_byte_payload());
        assert!(UnsupportedKind::Clob.is_byte_payload());
        assert!(UnsupportedKind::Other.is_byte_payload());

        assert!(!UnsupportedKind::Array.is_byte_payload());
        assert!(!UnsupportedKind::Xml.is_byte_payload());
        assert!(!UnsupportedKind::TimestampWithTimeZone.is_byte_payload());
    }

    #[test]
    fn test_lossy_categories() {
        assert!(ColumnType::Unsupported(UnsupportedKind::RowId).is_lossy());
        assert!(ColumnType::Unknown("tsvector".to_string()).is_lossy());
        assert!(!ColumnType::Character.is_lossy());
        assert!(!ColumnType::Null.is_lossy());
    }

    #[test]
    fn test_display() {
        assert_eq!(ColumnType::Timestamp.to_string(), "TIMESTAMP");
        assert_eq!(
            ColumnType::Unsupported(UnsupportedKind::Binary).to_string(),
            "BINARY"
        );
        assert_eq!(
            ColumnType::Unknown("tsvector".to_string()).to_string(),
            "UNKNOWN(tsvector)"
        );
    }
}
