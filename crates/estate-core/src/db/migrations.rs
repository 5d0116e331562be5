//! Database schema initialization and migrations.

use log::info;

use crate::{driver::DriverConnection, error::Result, params};

const SCHEMA_SQL: &str = include_str!("../../assets/schema.sql");

const VIEWING_COLUMNS_SQL: &str = "SELECT name FROM pragma_table_info('viewing_records')";
const BACKFILL_VIEWING_TIME_SQL: &str =
    "UPDATE viewing_records SET viewing_time = datetime(created_at) WHERE viewing_time IS NULL";
const VIEWING_TIME_INDEX_SQL: &str =
    "CREATE INDEX IF NOT EXISTS idx_viewing_records_time ON viewing_records(viewing_time)";

/// Columns that older `viewing_records` tables were created without.
const VIEWING_UPGRADES: &[(&str, &str)] = &[
    ("viewing_time", "ALTER TABLE viewing_records ADD COLUMN viewing_time DATETIME"),
    (
        "property_name",
        "ALTER TABLE viewing_records ADD COLUMN property_name TEXT DEFAULT '未知楼盘'",
    ),
    (
        "property_address",
        "ALTER TABLE viewing_records ADD COLUMN property_address TEXT",
    ),
];

/// Creates missing tables, then upgrades legacy ones in place.
pub(crate) fn apply(conn: &mut dyn DriverConnection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    apply_viewing_upgrades(conn)
}

fn apply_viewing_upgrades(conn: &mut dyn DriverConnection) -> Result<()> {
    let existing: Vec<String> = conn
        .query(VIEWING_COLUMNS_SQL, &params![])?
        .iter()
        .filter_map(|row| row.get_string("name"))
        .collect();

    for (column, alter_sql) in VIEWING_UPGRADES {
        if !existing.iter().any(|c| c == column) {
            info!("Adding missing column viewing_records.{column}");
            conn.execute(alter_sql, &[])?;
        }
    }

    let backfilled = conn.execute(BACKFILL_VIEWING_TIME_SQL, &[])?;
    if backfilled.changes > 0 {
        info!(
            "Backfilled viewing_time from created_at on {} record(s)",
            backfilled.changes
        );
    }

    conn.execute(VIEWING_TIME_INDEX_SQL, &[])?;
    Ok(())
}
