use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{Output, ToSql, IsNull};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

/// Image URLs of a listing, stored as a JSON array in a single text column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[serde(transparent)]
#[diesel(sql_type = Text)]
pub struct ImageList(pub Vec<String>);

impl ImageList {
    /// The first image, used as the cover in listings
    pub fn cover(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }
}

impl From<Vec<String>> for ImageList {
    fn from(urls: Vec<String>) -> Self {
        ImageList(urls)
    }
}

impl FromSql<Text, Sqlite> for ImageList {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        let urls = serde_json::from_str(&text)?;
        Ok(ImageList(urls))
    }
}

impl ToSql<Text, Sqlite> for ImageList {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}
