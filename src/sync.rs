//! Generic CRUD synchronization against the Entity Store.
//!
//! Thin per-entity wrappers: map entity → row, round-trip the store, map
//! back, reconcile the caller's in-memory collection. Errors never cross
//! this boundary as panics or `Err` — a failed list is an empty list plus
//! a message, a failed upsert is `None`, a failed delete is `false`, and
//! in every failure case no local state has changed.
//!
//! Conflict policy is last-write-wins: the store has no version column,
//! and the most recent successful write (or fetch) is the state.

use crate::error::CrmError;
use crate::services::directory;
use crate::store::rows::Mapped;
use crate::store::{Session, StoreClient};
use crate::types::{Client, Role};

/// Outcome of a list fetch: items in server order, plus the non-fatal
/// error message when the fetch failed.
#[derive(Debug)]
pub struct ListOutcome<E> {
    pub items: Vec<E>,
    pub error: Option<String>,
}

impl<E> ListOutcome<E> {
    fn ok(items: Vec<E>) -> Self {
        ListOutcome { items, error: None }
    }

    fn failed(message: String) -> Self {
        ListOutcome {
            items: Vec::new(),
            error: Some(message),
        }
    }
}

/// Fetch all rows of `E`'s table visible to the session.
///
/// Visibility is enforced server-side by row-level policy; the rows come
/// back in the table's configured order and are not re-filtered here.
pub async fn list<E: Mapped>(store: &StoreClient, session: &Session) -> ListOutcome<E> {
    match store
        .select_rows::<E::Row>(session, E::TABLE, E::ORDER)
        .await
    {
        Ok(rows) => ListOutcome::ok(rows.into_iter().map(E::from_row).collect()),
        Err(err) => {
            log::warn!("list {} failed: {}", E::TABLE, err);
            ListOutcome::failed(err.surface())
        }
    }
}

/// Fetch rows of `E`'s table matching an equality filter (e.g. the
/// policies of one client).
pub async fn list_eq<E: Mapped>(
    store: &StoreClient,
    session: &Session,
    column: &str,
    value: &str,
) -> ListOutcome<E> {
    match store
        .select_eq::<E::Row>(session, E::TABLE, column, value, E::ORDER)
        .await
    {
        Ok(rows) => ListOutcome::ok(rows.into_iter().map(E::from_row).collect()),
        Err(err) => {
            log::warn!("list {} ({}={}) failed: {}", E::TABLE, column, value, err);
            ListOutcome::failed(err.surface())
        }
    }
}

/// Idempotent insert-or-update keyed by the entity's id.
///
/// Returns the server's stored representation, or `None` when the
/// operation did not happen (the caller must not treat `None` as a
/// delete, and must not apply the input locally).
pub async fn upsert<E: Mapped>(store: &StoreClient, session: &Session, entity: &E) -> Option<E> {
    match store.upsert_row(session, E::TABLE, &entity.to_row()).await {
        Ok(row) => Some(E::from_row(row)),
        Err(err) => {
            log::warn!("upsert into {} ({}) failed: {}", E::TABLE, entity.id(), err);
            None
        }
    }
}

/// Delete by id. `false` means the delete did not happen.
pub async fn remove<E: Mapped>(store: &StoreClient, session: &Session, id: &str) -> bool {
    match store.delete_row(session, E::TABLE, id).await {
        Ok(()) => true,
        Err(err) => {
            log::warn!("delete from {} ({}) failed: {}", E::TABLE, id, err);
            false
        }
    }
}

/// Would this write flip the contacted flag? A new client arriving with
/// the flag already set counts as a flip.
fn flips_contacted(existing: Option<&Client>, updated: &Client) -> bool {
    match existing {
        Some(existing) => existing.contactado != updated.contactado,
        None => updated.contactado,
    }
}

/// Upsert a client on behalf of `actor_role`.
///
/// The contacted flag is access-controlled: a write that would flip it is
/// rejected here, before any remote call, unless the actor's role may
/// record first contact. Everything else follows the generic upsert
/// contract (`Ok(None)` means the operation did not happen).
pub async fn upsert_client(
    store: &StoreClient,
    session: &Session,
    actor_role: Role,
    existing: Option<&Client>,
    client: &Client,
) -> Result<Option<Client>, CrmError> {
    if flips_contacted(existing, client) && !directory::can_toggle_contacted(actor_role) {
        return Err(CrmError::Forbidden(
            "only advisors may record first contact".to_string(),
        ));
    }
    Ok(upsert(store, session, client).await)
}

/// Reconcile a successful upsert into the local collection: replace in
/// place when the id exists (preserving order), otherwise prepend.
pub fn apply_upsert<E: Mapped>(collection: &mut Vec<E>, entity: E) {
    match collection.iter().position(|e| e.id() == entity.id()) {
        Some(index) => collection[index] = entity,
        None => collection.insert(0, entity),
    }
}

/// Reconcile a successful delete: filter the id out.
pub fn apply_remove<E: Mapped>(collection: &mut Vec<E>, id: &str) {
    collection.retain(|e| e.id() != id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Goal, GoalMetric};

    fn goal(id: &str, target: f64) -> Goal {
        Goal {
            id: id.to_string(),
            owner_id: Some("u1".to_string()),
            metric: GoalMetric::Income,
            month: "2026-03".to_string(),
            target,
            created_at: None,
        }
    }

    #[test]
    fn test_apply_upsert_prepends_new() {
        let mut goals = vec![goal("g1", 100.0), goal("g2", 200.0)];
        apply_upsert(&mut goals, goal("g3", 300.0));
        let ids: Vec<&str> = goals.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g3", "g1", "g2"]);
    }

    #[test]
    fn test_apply_upsert_replaces_in_place() {
        let mut goals = vec![goal("g1", 100.0), goal("g2", 200.0), goal("g3", 300.0)];
        apply_upsert(&mut goals, goal("g2", 250.0));
        let ids: Vec<&str> = goals.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3"]);
        assert_eq!(goals[1].target, 250.0);
    }

    #[test]
    fn test_apply_upsert_idempotent() {
        // Two identical upserts leave exactly one entry with that id,
        // holding the second response's state.
        let mut goals = vec![goal("g1", 100.0)];
        apply_upsert(&mut goals, goal("g2", 200.0));
        apply_upsert(&mut goals, goal("g2", 200.0));
        assert_eq!(goals.iter().filter(|g| g.id == "g2").count(), 1);
        assert_eq!(goals.len(), 2);
    }

    #[test]
    fn test_flips_contacted() {
        use crate::types::{ClientStatus, PipelineStage};
        let client = |contactado: bool| Client {
            id: "c1".to_string(),
            owner_id: Some("u1".to_string()),
            name: "Ana".to_string(),
            last_name: None,
            email: None,
            phone: None,
            birth_date: None,
            occupation: None,
            status: ClientStatus::Prospect,
            stage: PipelineStage::New,
            contactado,
            contactado_fecha: None,
            notes: None,
            created_at: None,
        };
        assert!(flips_contacted(Some(&client(false)), &client(true)));
        assert!(flips_contacted(Some(&client(true)), &client(false)));
        assert!(!flips_contacted(Some(&client(true)), &client(true)));
        // New record arriving pre-contacted counts as a flip.
        assert!(flips_contacted(None, &client(true)));
        assert!(!flips_contacted(None, &client(false)));
    }

    #[test]
    fn test_apply_remove() {
        let mut goals = vec![goal("g1", 100.0), goal("g2", 200.0)];
        apply_remove(&mut goals, "g1");
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].id, "g2");
        // Removing an absent id is a no-op.
        apply_remove(&mut goals, "g9");
        assert_eq!(goals.len(), 1);
    }
}
