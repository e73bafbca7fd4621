//! Values that the builder binds as query parameters.

use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;

/// A value bound to a dynamically built PostgreSQL query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindValue {
    I64(i64),
    Text(String),
}

impl<'q> Encode<'q, Postgres> for BindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            BindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            BindValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf),
        }
    }

    /// Report the variant's real type so integers are sent as INT8, not TEXT.
    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            BindValue::I64(_) => <i64 as sqlx::Type<Postgres>>::type_info(),
            BindValue::Text(_) => <String as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for BindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <i64 as sqlx::Type<Postgres>>::compatible(ty) || <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}
