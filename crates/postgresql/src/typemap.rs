//! PostgreSQL type → column category mapping.
//!
//! Follows the categories the JDBC driver reports for the same types: `json`,
//! `uuid`, `interval` and the network types are `OTHER`, arrays are `ARRAY`,
//! domains are `DISTINCT`, and so on.

use dump_core::{ColumnType, UnsupportedKind};
use tokio_postgres::types::{Kind, Type};

/// Map a PostgreSQL column type onto its export category
pub fn column_type_for(ty: &Type) -> ColumnType {
    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => ColumnType::Integer,
        Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC => ColumnType::Decimal,
        Type::BOOL => ColumnType::Boolean,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::CHAR => {
            ColumnType::Character
        }
        Type::DATE => ColumnType::Date,
        Type::TIME => ColumnType::Time,
        Type::TIMESTAMP => ColumnType::Timestamp,
        Type::UNKNOWN | Type::VOID => ColumnType::Null,

        Type::BYTEA | Type::BIT | Type::VARBIT => {
            ColumnType::Unsupported(UnsupportedKind::Binary)
        }
        Type::JSON
        | Type::JSONB
        | Type::UUID
        | Type::INET
        | Type::CIDR
        | Type::MACADDR
        | Type::MACADDR8
        | Type::MONEY
        | Type::INTERVAL => ColumnType::Unsupported(UnsupportedKind::Other),
        Type::XML => ColumnType::Unsupported(UnsupportedKind::Xml),
        Type::TIMETZ => ColumnType::Unsupported(UnsupportedKind::TimeWithTimeZone),
        Type::TIMESTAMPTZ => ColumnType::Unsupported(UnsupportedKind::TimestampWithTimeZone),
        Type::TID => ColumnType::Unsupported(UnsupportedKind::RowId),
        Type::REFCURSOR => ColumnType::Unsupported(UnsupportedKind::RefCursor),
        Type::REGCLASS
        | Type::REGPROC
        | Type::REGPROCEDURE
        | Type::REGOPER
        | Type::REGOPERATOR
        | Type::REGTYPE
        | Type::REGCONFIG
        | Type::REGDICTIONARY
        | Type::REGNAMESPACE
        | Type::REGROLE => ColumnType::Unsupported(UnsupportedKind::Ref),

        _ => match ty.kind() {
            Kind::Array(_) => ColumnType::Unsupported(UnsupportedKind::Array),
            Kind::Composite(_) => ColumnType::Unsupported(UnsupportedKind::Struct),
            Kind::Domain(_) => ColumnType::Unsupported(UnsupportedKind::Distinct),
            // enum labels and citext travel as plain text
            Kind::Enum(_) => ColumnType::Character,
            _ if ty.name() == "citext" => ColumnType::Character,
            _ => ColumnType::Unknown(ty.name().to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_types() {
        assert_eq!(column_type_for(&Type::INT4), ColumnType::Integer);
        assert_eq!(column_type_for(&Type::OID), ColumnType::Integer);
        assert_eq!(column_type_for(&Type::NUMERIC), ColumnType::Decimal);
        assert_eq!(column_type_for(&Type::FLOAT4), ColumnType::Decimal);
        assert_eq!(column_type_for(&Type::BOOL), ColumnType::Boolean);
        assert_eq!(column_type_for(&Type::BPCHAR), ColumnType::Character);
        assert_eq!(column_type_for(&Type::DATE), ColumnType::Date);
        assert_eq!(column_type_for(&Type::TIME), ColumnType::Time);
        assert_eq!(column_type_for(&Type::TIMESTAMP), ColumnType::Timestamp);
        assert_eq!(column_type_for(&Type::UNKNOWN), ColumnType::Null);
    }

    #[test]
    fn test_byte_payload_types() {
        for ty in [Type::BYTEA, Type::VARBIT] {
            assert_eq!(
                column_type_for(&ty),
                ColumnType::Unsupported(UnsupportedKind::Binary)
            );
        }
        for ty in [Type::JSONB, Type::UUID, Type::INTERVAL, Type::INET] {
            assert_eq!(
                column_type_for(&ty),
                ColumnType::Unsupported(UnsupportedKind::Other)
            );
        }
    }

    #[test]
    fn test_structural_types() {
        assert_eq!(
            column_type_for(&Type::INT4_ARRAY),
            ColumnType::Unsupported(UnsupportedKind::Array)
        );
        assert_eq!(
            column_type_for(&Type::TEXT_ARRAY),
            ColumnType::Unsupported(UnsupportedKind::Array)
        );
        assert_eq!(
            column_type_for(&Type::TIMESTAMPTZ),
            ColumnType::Unsupported(UnsupportedKind::TimestampWithTimeZone)
        );
        assert_eq!(
            column_type_for(&Type::XML),
            ColumnType::Unsupported(UnsupportedKind::Xml)
        );
        assert_eq!(
            column_type_for(&Type::REGCLASS),
            ColumnType::Unsupported(UnsupportedKind::Ref)
        );
    }

    #[test]
    fn test_unmapped_types_are_unknown() {
        assert_eq!(
            column_type_for(&Type::TS_VECTOR),
            ColumnType::Unknown("tsvector".to_string())
        );
        assert_eq!(
            column_type_for(&Type::POINT),
            ColumnType::Unknown("point".to_string())
        );
    }
}
