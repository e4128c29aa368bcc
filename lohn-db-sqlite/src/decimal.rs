use std::str::FromStr;

use lohn_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads a rate column as [`Decimal`].
///
/// Rates are stored as TEXT so they round-trip exactly; INTEGER and REAL
/// cells, as left by hand-written SQL, are converted.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let fail = |what: String| RepositoryError::Database(format!("column '{column}': {what}"));

    let raw = row.try_get_raw(column).map_err(|e| fail(e.to_string()))?;
    if raw.is_null() {
        return Err(fail("rate is NULL".to_string()));
    }
    let kind = raw.type_info().name().to_string();

    match kind.as_str() {
        "TEXT" => {
            let text: String = row.try_get(column).map_err(|e| fail(e.to_string()))?;
            Decimal::from_str(text.trim())
                .map_err(|e| fail(format!("'{text}' is not a decimal: {e}")))
        }
        "INTEGER" => row
            .try_get::<i64, _>(column)
            .map(Decimal::from)
            .map_err(|e| fail(e.to_string())),
        "REAL" => {
            let real: f64 = row.try_get(column).map_err(|e| fail(e.to_string()))?;
            Decimal::try_from(real).map_err(|e| fail(format!("{real} out of range: {e}")))
        }
        other => Err(fail(format!("unexpected SQLite type {other}"))),
    }
}

/// Storage form of a rate: the normalized decimal string.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}
