use chrono::NaiveDateTime;
use diesel::{AsChangeset, Queryable};
use serde::{Deserialize, Serialize};

/// Per-user, per-league standing. All counter and score fields are owned by
/// the reconciler, which overwrites them wholesale on every run; nothing else
/// may write them.
#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::models::schema::profiles)]
pub struct Profile {
    pub id: i32,
    pub uuid: String,
    pub user_id: i32,
    pub league_id: i32,
    pub exiled: bool,
    pub eliminated: bool,
    pub exiled_week_id: Option<i32>,
    pub immunity_idols: i32,
    pub immunity_idols_played: i32,
    pub correct_safe_guesses: i32,
    pub correct_voted_out_guesses: i32,
    pub correct_immunity_guesses: i32,
    pub exile_return_cost: i32,
    pub total_score: i32,
    #[serde(rename = "createdAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::models::schema::profiles)]
pub struct ProfileStandingUpdate {
    pub exiled: bool,
    pub eliminated: bool,
    pub exiled_week_id: Option<Option<i32>>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::models::schema::profiles)]
pub struct ProfileAggregateUpdate {
    pub immunity_idols: i32,
    pub immunity_idols_played: i32,
    pub correct_safe_guesses: i32,
    pub correct_voted_out_guesses: i32,
    pub correct_immunity_guesses: i32,
    pub total_score: i32,
    pub updated_at: Option<NaiveDateTime>,
}
