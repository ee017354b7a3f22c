use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Version stamped into `user_version` once `kv_entries` exists.
const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = include_str!("schemas/schema_v1.sql");

/// Create the key-value table on a fresh file. An already stamped file is
/// left alone; a file from a newer build is refused.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let stamped: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    match stamped {
        0 => {
            let tx = conn
                .transaction()
                .context("failed to open schema transaction")?;
            tx.execute_batch(SCHEMA)
                .context("failed to create kv_entries")?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)
                .context("failed to stamp user_version pragma")?;
            tx.commit().context("failed to commit schema")
        }
        SCHEMA_VERSION => Ok(()),
        newer => bail!("cache database schema {newer} is newer than supported {SCHEMA_VERSION}"),
    }
}
