use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Book, User};

/// Where an exchange request is in its lifecycle
///
/// ```text
/// pending ──► accepted ──► completed
///    │
///    └──────► rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(rename_all = "lowercase")]
#[diesel(sql_type = Text)]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl ExchangeStatus {
    pub const ALL: [ExchangeStatus; 4] = [
        ExchangeStatus::Pending,
        ExchangeStatus::Accepted,
        ExchangeStatus::Rejected,
        ExchangeStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeStatus::Pending => "pending",
            ExchangeStatus::Accepted => "accepted",
            ExchangeStatus::Rejected => "rejected",
            ExchangeStatus::Completed => "completed",
        }
    }

    /// Whether a request in this status may move to `next`
    pub fn can_transition_to(self, next: ExchangeStatus) -> bool {
        matches!(
            (self, next),
            (ExchangeStatus::Pending, ExchangeStatus::Accepted)
                | (ExchangeStatus::Pending, ExchangeStatus::Rejected)
                | (ExchangeStatus::Accepted, ExchangeStatus::Completed)
        )
    }
}

impl fmt::Display for ExchangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ExchangeStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("Unknown exchange status: {}", s))
    }
}

impl FromSql<Text, Sqlite> for ExchangeStatus {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for ExchangeStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// A proposal to trade one listed book for another between two users
///
/// Names and titles are captured when the request is made so the request
/// still reads correctly if a listing is edited afterwards.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::exchange_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExchangeRequest {
    id: String,
    requester_id: String,
    requester_name: String,
    /// Seller of the requested book
    owner_id: String,
    owner_name: String,
    requested_book_id: String,
    requested_book_title: String,
    offered_book_id: String,
    offered_book_title: String,
    status: ExchangeStatus,
    message: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl ExchangeRequest {
    /// Creates a pending request from `requester` for `requested`, offering `offered`
    ///
    /// ### Arguments
    ///
    /// * `requester` - The user proposing the trade
    /// * `owner` - The seller of the requested book
    /// * `requested` - The book the requester wants
    /// * `offered` - The requester's book offered in return
    /// * `message` - Optional note to the owner
    pub fn new(requester: &User, owner: &User, requested: &Book, offered: &Book, message: Option<String>) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            requester_id: requester.get_id(),
            requester_name: requester.get_username(),
            owner_id: owner.get_id(),
            owner_name: owner.get_username(),
            requested_book_id: requested.get_id(),
            requested_book_title: requested.get_title(),
            offered_book_id: offered.get_id(),
            offered_book_title: offered.get_title(),
            status: ExchangeStatus::Pending,
            message,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_requester_id(&self) -> String {
        self.requester_id.clone()
    }

    pub fn get_requester_name(&self) -> String {
        self.requester_name.clone()
    }

    pub fn get_owner_id(&self) -> String {
        self.owner_id.clone()
    }

    pub fn get_owner_name(&self) -> String {
        self.owner_name.clone()
    }

    pub fn get_requested_book_id(&self) -> String {
        self.requested_book_id.clone()
    }

    pub fn get_requested_book_title(&self) -> String {
        self.requested_book_title.clone()
    }

    pub fn get_offered_book_id(&self) -> String {
        self.offered_book_id.clone()
    }

    pub fn get_offered_book_title(&self) -> String {
        self.offered_book_title.clone()
    }

    pub fn get_status(&self) -> ExchangeStatus {
        self.status
    }

    pub fn get_message(&self) -> Option<String> {
        self.message.clone()
    }

    /// Whether `user_id` is either side of the trade
    pub fn involves(&self, user_id: &str) -> bool {
        self.requester_id == user_id || self.owner_id == user_id
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
