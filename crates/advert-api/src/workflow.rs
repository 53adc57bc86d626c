//! Validate, fetch, authorize, mutate, commit.
//!
//! Each operation runs in its own store transaction, opened by
//! `Database::with_tx`. Returning an error from inside the closure drops the
//! transaction, which rolls back whatever the operation had written so far.
//! These calls block, so handlers run them on the blocking pool.

use serde_json::Value;
use tracing::{info, warn};

use advert_db::queries::{
    delete_advertisement, insert_advertisement, query_advertisement, update_advertisement,
};
use advert_db::{AdvertisementRow, Database};
use advert_types::api::AdvertisementResponse;

use crate::config::{ApiConfig, ReadView};
use crate::error::AdvertError;
use crate::validation::{CreatePayload, UpdatePayload, validate};

pub struct Workflow<'a> {
    db: &'a Database,
    config: &'a ApiConfig,
}

impl<'a> Workflow<'a> {
    pub fn new(db: &'a Database, config: &'a ApiConfig) -> Self {
        Self { db, config }
    }

    /// Returns the id the store assigned.
    pub fn create(&self, raw: &Value) -> Result<i64, AdvertError> {
        let payload: CreatePayload = validate(raw)?;

        let id = self
            .db
            .with_tx(|tx| {
                Ok::<_, AdvertError>(insert_advertisement(
                    tx,
                    &payload.header,
                    &payload.description,
                    &payload.user,
                )?)
            })
            .inspect_err(|e| {
                if matches!(e, AdvertError::Conflict) {
                    warn!("Duplicate header {:?} rejected", payload.header);
                }
            })?;

        info!("Advertisement {} created by {}", id, payload.user);
        Ok(id)
    }

    pub fn read(&self, id: i64) -> Result<AdvertisementResponse, AdvertError> {
        let row = self
            .db
            .with_tx(|tx| Ok::<_, AdvertError>(query_advertisement(tx, id)?))?
            .ok_or(AdvertError::NotFound)?;

        Ok(project(row, self.config.read_view))
    }

    /// `user` is the identity taken from the request path. It is compared to
    /// the user the payload claims, not to the stored owner, and the check
    /// happens before the record is looked up.
    pub fn update(&self, id: i64, user: &str, raw: &Value) -> Result<AdvertisementRow, AdvertError> {
        let payload: UpdatePayload = validate(raw)?;

        if self.config.enforce_ownership && user != payload.user {
            warn!("Update of advertisement {} refused: path user {:?} claims {:?}", id, user, payload.user);
            return Err(AdvertError::Unauthorized);
        }

        let row = self
            .db
            .with_tx(|tx| -> Result<AdvertisementRow, AdvertError> {
                let mut row = query_advertisement(tx, id)?.ok_or(AdvertError::NotFound)?;
                apply(&mut row, &payload);
                update_advertisement(tx, &row)?;
                Ok(row)
            })
            .inspect_err(|e| {
                if matches!(e, AdvertError::Conflict) {
                    warn!("Update of advertisement {} would duplicate a header", id);
                }
            })?;

        info!("Advertisement {} updated", id);
        Ok(row)
    }

    /// Missing records are reported before the owner is checked.
    pub fn delete(&self, id: i64, user: &str) -> Result<(), AdvertError> {
        self.db.with_tx(|tx| -> Result<(), AdvertError> {
            let row = query_advertisement(tx, id)?.ok_or(AdvertError::NotFound)?;

            if self.config.enforce_ownership && row.user != user {
                warn!("Delete of advertisement {} refused for user {:?}", id, user);
                return Err(AdvertError::Unauthorized);
            }

            delete_advertisement(tx, id)?;
            Ok(())
        })?;

        info!("Advertisement {} deleted by {}", id, user);
        Ok(())
    }
}

/// Patch the fetched row in place. `user` is never written; it only served
/// the ownership check.
fn apply(row: &mut AdvertisementRow, payload: &UpdatePayload) {
    if let Some(header) = &payload.header {
        row.header = header.clone();
    }
    if let Some(description) = &payload.description {
        row.description = description.clone();
    }
}

fn project(row: AdvertisementRow, view: ReadView) -> AdvertisementResponse {
    match view {
        ReadView::Full => AdvertisementResponse {
            id: row.id,
            header: row.header,
            description: Some(row.description),
            user: Some(row.user),
        },
        ReadView::Summary => AdvertisementResponse {
            id: row.id,
            header: row.header,
            description: None,
            user: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn setup() -> (Database, ApiConfig) {
        (Database::open_in_memory().unwrap(), ApiConfig::default())
    }

    fn create(wf: &Workflow<'_>, header: &str, user: &str) -> i64 {
        wf.create(&json!({"header": header, "description": "d1", "user": user}))
            .unwrap()
    }

    #[test]
    fn create_then_read_round_trips_fields() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);

        let id = create(&wf, "h1", "u1");
        assert!(id > 0);

        let read = wf.read(id).unwrap();
        assert_eq!(
            read,
            AdvertisementResponse {
                id,
                header: "h1".into(),
                description: Some("d1".into()),
                user: Some("u1".into()),
            }
        );
    }

    #[test]
    fn duplicate_header_conflicts_without_side_effects() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let first = create(&wf, "h1", "u1");

        for _ in 0..2 {
            let err = wf
                .create(&json!({"header": "h1", "description": "other", "user": "u2"}))
                .unwrap_err();
            assert!(matches!(err, AdvertError::Conflict));
        }

        assert_eq!(db.count_advertisements_with_header("h1").unwrap(), 1);
        assert_eq!(db.count_advertisements().unwrap(), 1);
        assert_eq!(wf.read(first).unwrap().description.as_deref(), Some("d1"));
    }

    #[test]
    fn read_missing_is_not_found() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        assert!(matches!(wf.read(999_999), Err(AdvertError::NotFound)));
    }

    #[test]
    fn summary_view_hides_description_and_user() {
        let (db, mut config) = setup();
        config.read_view = ReadView::Summary;
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        let read = wf.read(id).unwrap();
        assert_eq!(read.header, "h1");
        assert!(read.description.is_none());
        assert!(read.user.is_none());
    }

    #[test]
    fn update_with_wrong_user_changes_nothing() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        let err = wf
            .update(id, "u1", &json!({"header": "h2", "description": "d2", "user": "mallory"}))
            .unwrap_err();
        assert!(matches!(err, AdvertError::Unauthorized));

        let row = db.get_advertisement(id).unwrap().unwrap();
        assert_eq!((row.header.as_str(), row.description.as_str()), ("h1", "d1"));
    }

    #[test]
    fn partial_update_touches_only_given_fields() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        let row = wf
            .update(id, "u1", &json!({"description": "fresh", "user": "u1"}))
            .unwrap();
        assert_eq!(row.description, "fresh");

        let stored = db.get_advertisement(id).unwrap().unwrap();
        assert_eq!(stored.header, "h1");
        assert_eq!(stored.user, "u1");
        assert_eq!(stored.description, "fresh");
    }

    #[test]
    fn update_only_mutates_the_target_record() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let a = create(&wf, "a", "u1");
        let b = create(&wf, "b", "u1");

        wf.update(a, "u1", &json!({"description": "changed", "user": "u1"}))
            .unwrap();

        assert_eq!(db.get_advertisement(b).unwrap().unwrap().description, "d1");
    }

    #[test]
    fn update_into_taken_header_rolls_back() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        create(&wf, "a", "u1");
        let b = create(&wf, "b", "u1");

        let err = wf
            .update(b, "u1", &json!({"header": "a", "description": "lost", "user": "u1"}))
            .unwrap_err();
        assert!(matches!(err, AdvertError::Conflict));

        let row = db.get_advertisement(b).unwrap().unwrap();
        assert_eq!((row.header.as_str(), row.description.as_str()), ("b", "d1"));
    }

    #[test]
    fn update_missing_is_not_found() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let err = wf
            .update(42, "u1", &json!({"description": "x", "user": "u1"}))
            .unwrap_err();
        assert!(matches!(err, AdvertError::NotFound));
    }

    #[test]
    fn delete_then_read_is_not_found() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        wf.delete(id, "u1").unwrap();
        assert!(matches!(wf.read(id), Err(AdvertError::NotFound)));
    }

    #[test]
    fn delete_checks_existence_before_owner() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        assert!(matches!(wf.delete(7, "anyone"), Err(AdvertError::NotFound)));
    }

    #[test]
    fn delete_by_other_user_is_refused() {
        let (db, config) = setup();
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        assert!(matches!(wf.delete(id, "u2"), Err(AdvertError::Unauthorized)));
        assert!(db.get_advertisement(id).unwrap().is_some());
    }

    #[test]
    fn ownership_checks_can_be_disabled() {
        let (db, mut config) = setup();
        config.enforce_ownership = false;
        let wf = Workflow::new(&db, &config);
        let id = create(&wf, "h1", "u1");

        wf.update(id, "u2", &json!({"header": "h2", "user": "u3"}))
            .unwrap();
        wf.delete(id, "u2").unwrap();
        assert!(db.get_advertisement(id).unwrap().is_none());
    }
}
