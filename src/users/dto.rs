use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo::User;

/// Returned by signup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub is_admin: bool,
    pub image: String,
}

/// Returned by signin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Partial update of a user. A field participates only when present and
/// non-empty; the legacy API sent empty strings for untouched inputs, so
/// empty means "keep". `isAdmin` is the exception: it is always written,
/// absent meaning false. Omitting it therefore demotes an admin — legacy
/// behavior kept on purpose.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub is_admin: Option<bool>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserPatch {
    /// Applies everything except the password, which the service re-hashes.
    pub fn apply(&self, user: &mut User) {
        user.is_admin = self.is_admin.unwrap_or(false);
        if let Some(v) = non_empty(&self.name) {
            user.name = v;
        }
        if let Some(v) = non_empty(&self.surname) {
            user.surname = v;
        }
        if let Some(v) = non_empty(&self.email) {
            user.email = v;
        }
    }
}

pub(crate) fn non_empty(field: &Option<String>) -> Option<String> {
    field
        .as_ref()
        .filter(|s| !s.trim().is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn admin_ann() -> User {
        User {
            id: Uuid::new_v4(),
            is_admin: true,
            name: "Ann".into(),
            surname: "Nowak".into(),
            email: "ann@example.com".into(),
            password_hash: "hash".into(),
            image: "uploads/images/ann.png".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn empty_name_keeps_old_value_and_absent_is_admin_demotes() {
        let mut user = admin_ann();
        let patch = UserPatch {
            is_admin: None,
            name: Some("".into()),
            ..Default::default()
        };
        patch.apply(&mut user);
        assert_eq!(user.name, "Ann");
        assert!(!user.is_admin);
    }

    #[test]
    fn present_fields_replace() {
        let mut user = admin_ann();
        let patch = UserPatch {
            is_admin: Some(true),
            name: Some("Anna".into()),
            surname: None,
            email: Some("anna@example.com".into()),
            password: None,
        };
        patch.apply(&mut user);
        assert_eq!(user.name, "Anna");
        assert_eq!(user.surname, "Nowak");
        assert_eq!(user.email, "anna@example.com");
        assert!(user.is_admin);
    }

    #[test]
    fn whitespace_only_counts_as_absent() {
        let mut user = admin_ann();
        let patch = UserPatch {
            surname: Some("   ".into()),
            ..Default::default()
        };
        patch.apply(&mut user);
        assert_eq!(user.surname, "Nowak");
    }

    #[test]
    fn response_field_names_are_stable() {
        let resp = SignupResponse {
            user_id: Uuid::new_v4(),
            email: "a@x.com".into(),
            token: "t".into(),
            is_admin: false,
            image: "uploads/images/a.png".into(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        for key in ["userId", "email", "token", "isAdmin", "image"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("id").is_none());

        let resp = SigninResponse {
            user_id: Uuid::new_v4(),
            email: "a@x.com".into(),
            token: "t".into(),
            is_admin: true,
        };
        let json = serde_json::to_value(&resp).unwrap();
        for key in ["userId", "email", "token", "isAdmin"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
