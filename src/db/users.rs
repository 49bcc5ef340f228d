use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::{epoch_secs, from_epoch, is_constraint_violation, new_id, Database, DbError, User};

/// A user row together with its stored password hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: User,
    pub password_hash: String,
    pub salt: String,
}

const USER_COLUMNS: &str = "id, username, email, is_admin, is_active, created_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        is_admin: row.get(3)?,
        is_active: row.get(4)?,
        created_at: from_epoch(row.get(5)?),
    })
}

impl Database {
    /// Insert a user. The first user ever registered becomes an admin.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        salt: &str,
    ) -> Result<User, DbError> {
        let conn = self.conn.lock();
        let tx = conn.unchecked_transaction()?;

        let existing: i64 = tx.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: email.to_string(),
            is_admin: existing == 0,
            is_active: true,
            created_at: from_epoch(Utc::now().timestamp()),
        };

        let inserted = tx.execute(
            "INSERT INTO users (id, username, email, password_hash, salt, is_admin, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.username,
                user.email,
                password_hash,
                salt,
                user.is_admin,
                user.is_active,
                epoch_secs(user.created_at),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_constraint_violation(&e) => return Err(DbError::Duplicate),
            Err(e) => return Err(e.into()),
        }

        tx.commit()?;
        Ok(user)
    }

    pub fn credentials_by_username(&self, username: &str) -> Result<Option<Credentials>, DbError> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash, salt FROM users WHERE username = ?1"),
                params![username],
                |row| {
                    Ok(Credentials {
                        user: user_from_row(row)?,
                        password_hash: row.get(6)?,
                        salt: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        let conn = self.conn.lock();
        let found = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        Ok(found)
    }

    /// All users, newest first.
    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, rowid DESC"
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
impl Database {
    pub fn set_user_active(&self, user_id: &str, active: bool) -> Result<(), DbError> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE users SET is_active = ?1 WHERE id = ?2",
            params![active, user_id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound("user"));
        }
        Ok(())
    }

    pub fn count_users(&self) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }
}
