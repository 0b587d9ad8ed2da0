use diesel::Queryable;
use serde::{Deserialize, Serialize};

/// A season-scoped competitor. The same name may recur across seasons as a
/// distinct row; a null tribe means the season has reached the merged phase.
#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::models::schema::contestants)]
pub struct Contestant {
    pub id: i32,
    pub uuid: String,
    pub season: i32,
    pub name: String,
    pub tribe: Option<String>,
    pub is_active: bool,
    #[serde(rename = "createdAt")]
    pub created_at: Option<chrono::NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<chrono::NaiveDateTime>,
}
