//! Ownership-hierarchy visibility.
//!
//! Computes, from the promoter → manager → advisor reporting chain, the set
//! of owner ids a user may see, and filters entity collections against it.
//! Row-level security at the store is the security authority; this module
//! is a display-time aid and the basis of the orphan-recovery list.

use std::collections::HashSet;

use crate::types::{Profile, Role};

/// What to do with rows whose owner is absent.
///
/// Strict drops them; Retain keeps them unconditionally so they can be
/// manually reassigned (used by the client list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanPolicy {
    Strict,
    Retain,
}

/// The set of owner ids whose records `user` may see.
///
/// Promoters see themselves plus everyone whose `promoter_id` points at
/// them; managers see themselves plus their direct advisors; advisors and
/// admins see only themselves. An unauthenticated caller sees nothing.
pub fn visible_owner_ids(user: Option<&Profile>, all_users: &[Profile]) -> HashSet<String> {
    let Some(user) = user else {
        // Fail closed.
        return HashSet::new();
    };

    let mut visible = HashSet::new();
    visible.insert(user.id.clone());

    match user.role {
        Role::Promoter => {
            for other in all_users {
                if other.promoter_id.as_deref() == Some(user.id.as_str()) {
                    visible.insert(other.id.clone());
                }
            }
        }
        Role::Manager => {
            for other in all_users {
                if other.manager_id.as_deref() == Some(user.id.as_str()) {
                    visible.insert(other.id.clone());
                }
            }
        }
        Role::Advisor | Role::Admin => {}
    }

    visible
}

/// Keep only rows whose owner is visible to `user`.
///
/// `owner_of` extracts the (possibly absent) owner id from a row; absent
/// owners follow `policy`.
pub fn filter_by_scope<T, F>(
    rows: Vec<T>,
    user: Option<&Profile>,
    all_users: &[Profile],
    owner_of: F,
    policy: OrphanPolicy,
) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    let visible = visible_owner_ids(user, all_users);
    rows.into_iter()
        .filter(|row| match owner_of(row) {
            Some(owner) => visible.contains(owner),
            None => policy == OrphanPolicy::Retain,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, role: Role, manager: Option<&str>, promoter: Option<&str>) -> Profile {
        Profile {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            username: None,
            role,
            manager_id: manager.map(str::to_string),
            promoter_id: promoter.map(str::to_string),
            created_at: None,
        }
    }

    fn team() -> Vec<Profile> {
        vec![
            profile("promoterA", Role::Promoter, None, None),
            profile("managerB", Role::Manager, None, Some("promoterA")),
            profile("advisorC", Role::Advisor, Some("managerB"), Some("promoterA")),
            profile("advisorD", Role::Advisor, Some("managerX"), Some("promoterZ")),
        ]
    }

    #[test]
    fn test_manager_sees_self_and_direct_advisors() {
        let users = team();
        let manager = users[1].clone();
        let visible = visible_owner_ids(Some(&manager), &users);
        assert_eq!(
            visible,
            HashSet::from(["managerB".to_string(), "advisorC".to_string()])
        );
        // Specifically not the promoter above them.
        assert!(!visible.contains("promoterA"));
    }

    #[test]
    fn test_promoter_sees_whole_chain() {
        let users = team();
        let promoter = users[0].clone();
        let visible = visible_owner_ids(Some(&promoter), &users);
        assert!(visible.contains("promoterA"));
        assert!(visible.contains("managerB"));
        assert!(visible.contains("advisorC"));
        assert!(!visible.contains("advisorD"));
    }

    #[test]
    fn test_advisor_and_admin_see_only_themselves() {
        let users = team();
        let advisor = users[2].clone();
        assert_eq!(
            visible_owner_ids(Some(&advisor), &users),
            HashSet::from(["advisorC".to_string()])
        );

        let admin = profile("admin1", Role::Admin, None, None);
        assert_eq!(
            visible_owner_ids(Some(&admin), &users),
            HashSet::from(["admin1".to_string()])
        );
    }

    #[test]
    fn test_unauthenticated_sees_nothing() {
        assert!(visible_owner_ids(None, &team()).is_empty());
    }

    #[test]
    fn test_filter_strict_drops_orphans() {
        let users = team();
        let manager = users[1].clone();
        let rows = vec![
            ("r1", Some("managerB")),
            ("r2", Some("advisorC")),
            ("r3", Some("promoterA")),
            ("r4", None),
        ];
        let kept = filter_by_scope(
            rows,
            Some(&manager),
            &users,
            |r: &(&str, Option<&str>)| r.1,
            OrphanPolicy::Strict,
        );
        let ids: Vec<&str> = kept.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_filter_retain_keeps_orphans() {
        let users = team();
        let manager = users[1].clone();
        let rows = vec![("r1", Some("promoterA")), ("r2", None)];
        let kept = filter_by_scope(
            rows,
            Some(&manager),
            &users,
            |r: &(&str, Option<&str>)| r.1,
            OrphanPolicy::Retain,
        );
        let ids: Vec<&str> = kept.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["r2"]);
    }

    #[test]
    fn test_filter_unauthenticated_strict_is_empty() {
        let rows = vec![("r1", Some("managerB")), ("r2", None)];
        let kept = filter_by_scope(
            rows,
            None,
            &team(),
            |r: &(&str, Option<&str>)| r.1,
            OrphanPolicy::Strict,
        );
        assert!(kept.is_empty());
    }
}
