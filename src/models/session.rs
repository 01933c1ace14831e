use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A server-issued sign-in session
///
/// The token is the bearer credential clients send in the `Authorization`
/// header. A session stops authenticating once `expires_at` has passed.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Session {
    token: String,
    user_id: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
}

impl Session {
    /// Creates a session for `user_id` that lives for `ttl`
    pub fn new(token: String, user_id: &str, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            token,
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn get_token(&self) -> String {
        self.token.clone()
    }

    pub fn get_user_id(&self) -> String {
        self.user_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_expires_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.expires_at, Utc)
    }

    /// Whether the session has expired as of `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.get_expires_at() <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expiry() {
        let session = Session::new("token".to_string(), "user-1", Duration::hours(1));

        assert_eq!(session.get_user_id(), "user-1");
        assert!(!session.is_expired_at(Utc::now()));
        assert!(session.is_expired_at(Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let session = Session::new("token".to_string(), "user-1", Duration::zero());
        assert!(session.is_expired_at(session.get_created_at()));
    }
}
