//! Scoped write transactions over a borrowed connection.

use rusqlite::Connection;

/// Runs `work` inside a transaction owned by this call.
///
/// If the connection is already inside a caller-owned transaction, `work`
/// joins it instead and the caller keeps control of commit/rollback. On any
/// error the owned transaction is rolled back when its guard drops.
pub fn with_write_scope<T, E>(
    conn: &Connection,
    work: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    if !conn.is_autocommit() {
        return work(conn);
    }

    let tx = conn.unchecked_transaction()?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}
