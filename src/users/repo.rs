use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record. Email uniqueness is checked by lookup before insert, not by a
/// storage constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub is_admin: bool,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: String,
    #[serde(skip_serializing)]
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str =
    "id, is_admin, name, surname, email, password_hash, image, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        surname: &str,
        email: &str,
        password_hash: &str,
        image: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (is_admin, name, surname, email, password_hash, image)
            VALUES (false, $1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(surname)
        .bind(email)
        .bind(password_hash)
        .bind(image)
        .fetch_one(db)
        .await
    }

    /// Writes the whole record back. The single write path for updates, so a
    /// version column could be added here later without touching call sites.
    pub async fn save(&self, db: &PgPool) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET is_admin = $2, name = $3, surname = $4, email = $5,
                   password_hash = $6, image = $7
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(self.id)
        .bind(self.is_admin)
        .bind(&self.name)
        .bind(&self.surname)
        .bind(&self.email)
        .bind(&self.password_hash)
        .bind(&self.image)
        .fetch_one(db)
        .await
    }

    pub async fn delete_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            is_admin: false,
            name: "Ann".into(),
            surname: "Nowak".into(),
            email: "ann@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            image: "uploads/images/x.png".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains("\"isAdmin\":false"));
        assert!(json.contains("ann@example.com"));
    }
}
