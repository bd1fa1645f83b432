// Directory rules — hierarchy validation, role subordination, profile
// construction. All checks run before any remote call; a rejection here
// means no state changed anywhere.

use crate::store::auth::AuthUser;
use crate::types::{Profile, Role};

fn rank(role: Role) -> u8 {
    match role {
        Role::Advisor => 0,
        Role::Manager => 1,
        Role::Promoter => 2,
        Role::Admin => 3,
    }
}

/// May `creator` create a user with `new_role`? Creators may only create
/// subordinate roles; admins may create anyone.
pub fn can_create(creator: Role, new_role: Role) -> bool {
    match creator {
        Role::Admin => true,
        Role::Promoter => matches!(new_role, Role::Manager | Role::Advisor),
        Role::Manager => new_role == Role::Advisor,
        Role::Advisor => false,
    }
}

/// May a caller set their own role to `new_role`? Never upward.
pub fn can_change_role(own_role: Role, new_role: Role) -> bool {
    rank(new_role) <= rank(own_role)
}

/// Only advisors record first contact; admins may correct it.
pub fn can_toggle_contacted(role: Role) -> bool {
    matches!(role, Role::Advisor | Role::Admin)
}

/// Minimal shape check; the identity provider does the real verification.
pub fn validate_email(email: &str) -> Result<(), String> {
    let trimmed = email.trim();
    if trimmed.len() >= 3 && trimmed.contains('@') && !trimmed.starts_with('@') {
        Ok(())
    } else {
        Err(format!("Invalid email: {}", email))
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() >= 8 {
        Ok(())
    } else {
        Err("Password must be at least 8 characters".to_string())
    }
}

/// Check the hierarchy back-references for a profile being created or
/// updated:
/// - a manager must report to a promoter
/// - a promoter (and an admin) carries neither reference
/// - an advisor's promoter, when both are set, must match the promoter
///   reachable through its manager
pub fn validate_hierarchy(
    role: Role,
    manager_id: Option<&str>,
    promoter_id: Option<&str>,
    all_users: &[Profile],
) -> Result<(), String> {
    match role {
        Role::Promoter | Role::Admin => {
            if manager_id.is_some() || promoter_id.is_some() {
                return Err(format!(
                    "A {} does not report to a manager or promoter",
                    role.as_str()
                ));
            }
        }
        Role::Manager => {
            if promoter_id.is_none() {
                return Err("A manager must be assigned to a promoter".to_string());
            }
        }
        Role::Advisor => {
            if let (Some(manager_id), Some(promoter_id)) = (manager_id, promoter_id) {
                let manager = all_users.iter().find(|u| u.id == manager_id);
                if let Some(manager) = manager {
                    if let Some(ref managers_promoter) = manager.promoter_id {
                        if managers_promoter != promoter_id {
                            return Err(format!(
                                "Advisor promoter {} is not reachable through manager {}",
                                promoter_id, manager_id
                            ));
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Build the profile row for a newly created identity.
pub fn new_profile(
    auth_id: &str,
    email: &str,
    name: &str,
    role: Role,
    manager_id: Option<String>,
    promoter_id: Option<String>,
) -> Profile {
    Profile {
        id: auth_id.to_string(),
        email: email.to_string(),
        name: name.to_string(),
        username: None,
        role,
        manager_id,
        promoter_id,
        created_at: Some(chrono::Utc::now().to_rfc3339()),
    }
}

/// Idempotent profile materialization keyed by the authenticated identity:
/// an existing profile wins unchanged; otherwise a default advisor profile
/// is minted from the identity.
pub fn ensure_profile(auth_user: &AuthUser, existing: Option<Profile>) -> Profile {
    if let Some(profile) = existing {
        return profile;
    }
    let email = auth_user.email.clone().unwrap_or_default();
    let name = email.split('@').next().unwrap_or("").to_string();
    new_profile(&auth_user.id, &email, &name, Role::Advisor, None, None)
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

    #[test]
    fn test_can_create_matrix() {
        assert!(can_create(Role::Admin, Role::Promoter));
        assert!(can_create(Role::Admin, Role::Admin));
        assert!(can_create(Role::Promoter, Role::Manager));
        assert!(can_create(Role::Promoter, Role::Advisor));
        assert!(!can_create(Role::Promoter, Role::Promoter));
        assert!(can_create(Role::Manager, Role::Advisor));
        assert!(!can_create(Role::Manager, Role::Manager));
        assert!(!can_create(Role::Advisor, Role::Advisor));
    }

    #[test]
    fn test_can_change_role_never_upward() {
        assert!(can_change_role(Role::Promoter, Role::Manager));
        assert!(can_change_role(Role::Manager, Role::Manager));
        assert!(!can_change_role(Role::Manager, Role::Promoter));
        assert!(!can_change_role(Role::Advisor, Role::Manager));
        assert!(can_change_role(Role::Admin, Role::Admin));
    }

    #[test]
    fn test_contacted_toggle_role_gate() {
        assert!(can_toggle_contacted(Role::Advisor));
        assert!(can_toggle_contacted(Role::Admin));
        assert!(!can_toggle_contacted(Role::Manager));
        assert!(!can_toggle_contacted(Role::Promoter));
    }

    #[test]
    fn test_email_and_password_validation() {
        assert!(validate_email("a@b.mx").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_manager_requires_promoter() {
        assert!(validate_hierarchy(Role::Manager, None, None, &[]).is_err());
        assert!(validate_hierarchy(Role::Manager, None, Some("p1"), &[]).is_ok());
    }

    #[test]
    fn test_promoter_carries_no_references() {
        assert!(validate_hierarchy(Role::Promoter, None, None, &[]).is_ok());
        assert!(validate_hierarchy(Role::Promoter, None, Some("p0"), &[]).is_err());
        assert!(validate_hierarchy(Role::Admin, Some("m1"), None, &[]).is_err());
    }

    #[test]
    fn test_advisor_promoter_must_match_managers() {
        let users = vec![
            profile("p1", Role::Promoter, None, None),
            profile("m1", Role::Manager, None, Some("p1")),
        ];
        assert!(validate_hierarchy(Role::Advisor, Some("m1"), Some("p1"), &users).is_ok());
        assert!(validate_hierarchy(Role::Advisor, Some("m1"), Some("p2"), &users).is_err());
        // Promoter set directly without a manager is allowed.
        assert!(validate_hierarchy(Role::Advisor, None, Some("p1"), &users).is_ok());
    }

    #[test]
    fn test_ensure_profile_idempotent() {
        let auth = AuthUser {
            id: "u1".to_string(),
            email: Some("ana@example.com".to_string()),
        };
        let minted = ensure_profile(&auth, None);
        assert_eq!(minted.id, "u1");
        assert_eq!(minted.role, Role::Advisor);
        assert_eq!(minted.name, "ana");

        let existing = profile("u1", Role::Manager, None, Some("p1"));
        let kept = ensure_profile(&auth, Some(existing.clone()));
        assert_eq!(kept, existing);
    }
}
