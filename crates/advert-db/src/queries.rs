use crate::Database;
use crate::models::AdvertisementRow;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

// Row-level statements take a plain `&Connection` so they run equally on a
// connection or inside a `Transaction` (which derefs to one). They return
// `rusqlite::Result` so callers can tell constraint failures apart.

pub fn insert_advertisement(
    conn: &Connection,
    header: &str,
    description: &str,
    user: &str,
) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO advertisements (header, description, user) VALUES (?1, ?2, ?3)",
        (header, description, user),
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn query_advertisement(conn: &Connection, id: i64) -> rusqlite::Result<Option<AdvertisementRow>> {
    conn.query_row(
        "SELECT id, header, description, user FROM advertisements WHERE id = ?1",
        [id],
        |row| {
            Ok(AdvertisementRow {
                id: row.get(0)?,
                header: row.get(1)?,
                description: row.get(2)?,
                user: row.get(3)?,
            })
        },
    )
    .optional()
}

/// Write `header` and `description` of `row` back to its id.
/// The owning `user` is set once at insert and never rewritten.
pub fn update_advertisement(conn: &Connection, row: &AdvertisementRow) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE advertisements SET header = ?1, description = ?2 WHERE id = ?3",
        rusqlite::params![row.header, row.description, row.id],
    )?;
    Ok(())
}

/// Returns false when no row had that id.
pub fn delete_advertisement(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let deleted = conn.execute("DELETE FROM advertisements WHERE id = ?1", [id])?;
    Ok(deleted > 0)
}

impl Database {
    /// Fetch one row outside any caller transaction.
    pub fn get_advertisement(&self, id: i64) -> Result<Option<AdvertisementRow>> {
        self.with_conn(|conn| Ok(query_advertisement(conn, id)?))
    }

    /// How many rows carry `header`; at most one while the index holds.
    pub fn count_advertisements_with_header(&self, header: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM advertisements WHERE header = ?1",
                [header],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Total rows in the table.
    pub fn count_advertisements(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM advertisements", [], |row| row.get(0))?;
            Ok(count)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_unique_violation;

    fn seeded() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .with_conn(|conn| Ok(insert_advertisement(conn, "h1", "d1", "u1")?))
            .unwrap();
        (db, id)
    }

    #[test]
    fn insert_then_query() {
        let (db, id) = seeded();
        assert!(id > 0);

        let row = db.get_advertisement(id).unwrap().unwrap();
        assert_eq!(
            row,
            AdvertisementRow {
                id,
                header: "h1".into(),
                description: "d1".into(),
                user: "u1".into(),
            }
        );
    }

    #[test]
    fn missing_id_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_advertisement(999_999).unwrap().is_none());
    }

    #[test]
    fn duplicate_header_is_unique_violation() {
        let (db, _) = seeded();
        let err = db
            .with_conn(|conn| Ok(insert_advertisement(conn, "h1", "other", "u2")?))
            .unwrap_err();
        let sqlite_err = err.downcast_ref::<rusqlite::Error>().unwrap();
        assert!(is_unique_violation(sqlite_err));
        assert_eq!(db.count_advertisements_with_header("h1").unwrap(), 1);
    }

    #[test]
    fn failed_transaction_rolls_back() {
        let (db, id) = seeded();

        let result: Result<()> = db.with_tx(|tx| {
            let mut row = query_advertisement(tx, id)?.unwrap();
            row.description = "changed".into();
            update_advertisement(tx, &row)?;
            anyhow::bail!("abort");
        });
        assert!(result.is_err());

        let row = db.get_advertisement(id).unwrap().unwrap();
        assert_eq!(row.description, "d1");
    }

    #[test]
    fn update_never_rewrites_owner() {
        let (db, id) = seeded();

        db.with_tx(|tx| -> Result<()> {
            let mut row = query_advertisement(tx, id)?.unwrap();
            row.header = "h1 edited".into();
            row.user = "someone-else".into();
            update_advertisement(tx, &row)?;
            Ok(())
        })
        .unwrap();

        let row = db.get_advertisement(id).unwrap().unwrap();
        assert_eq!(row.header, "h1 edited");
        assert_eq!(row.user, "u1");
    }

    #[test]
    fn delete_reports_missing_rows() {
        let (db, id) = seeded();
        assert!(db.with_conn(|conn| Ok(delete_advertisement(conn, id)?)).unwrap());
        assert!(!db.with_conn(|conn| Ok(delete_advertisement(conn, id)?)).unwrap());
        assert_eq!(db.count_advertisements().unwrap(), 0);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let (db, id) = seeded();
        db.with_conn(|conn| Ok(delete_advertisement(conn, id)?)).unwrap();
        let next = db
            .with_conn(|conn| Ok(insert_advertisement(conn, "h2", "d2", "u1")?))
            .unwrap();
        assert!(next > id);
    }
}
