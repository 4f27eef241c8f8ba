//! Profile persistence and the interview credit gate.
//!
//! Profiles are created lazily: the first read or spend inserts a row carrying
//! the table's default balance.

use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::ProfileRow;

async fn insert_if_missing(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
    sqlx::query("INSERT INTO profiles (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get_or_create_profile(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<ProfileRow, AppError> {
    insert_if_missing(conn, user_id).await?;
    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(profile)
}

/// Balance after starting one interview.
pub fn spend_one(credits_remaining: i32) -> Result<i32, AppError> {
    if credits_remaining <= 0 {
        return Err(AppError::OutOfCredits);
    }
    Ok(credits_remaining - 1)
}

/// Takes one credit from `user_id`. Call inside the transaction that creates the
/// interview: the profile row stays locked until that transaction ends.
pub async fn spend_credit(conn: &mut PgConnection, user_id: Uuid) -> Result<i32, AppError> {
    insert_if_missing(conn, user_id).await?;

    let balance: i32 =
        sqlx::query_scalar("SELECT credits_remaining FROM profiles WHERE user_id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

    let remaining = spend_one(balance).inspect_err(|_| {
        info!("User {user_id} has no interview credits left");
    })?;

    sqlx::query("UPDATE profiles SET credits_remaining = $2, updated_at = now() WHERE user_id = $1")
        .bind(user_id)
        .bind(remaining)
        .execute(&mut *conn)
        .await?;

    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spending_lowers_balance_by_one() {
        assert_eq!(spend_one(3).unwrap(), 2);
        assert_eq!(spend_one(1).unwrap(), 0);
    }

    #[test]
    fn test_empty_balance_is_refused() {
        assert!(matches!(spend_one(0), Err(AppError::OutOfCredits)));
        assert!(matches!(spend_one(-2), Err(AppError::OutOfCredits)));
    }
}
