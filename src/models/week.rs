use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::models::schema::weeks)]
pub struct Week {
    pub id: i32,
    pub uuid: String,
    pub league_id: i32,
    pub season: i32,
    pub number: i32,
    pub start_date: Option<NaiveDate>,
    pub lock_time: Option<NaiveDateTime>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Week {
    /// Reference instant used by the recency guard: the lock time when set,
    /// otherwise noon on the start date. `None` when the week has neither.
    pub fn reference_time(&self) -> Option<NaiveDateTime> {
        self.lock_time.or_else(|| {
            self.start_date
                .map(|d| d.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap()))
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::models::schema::week_results)]
pub struct NewWeekResult {
    pub uuid: String,
    pub week_id: i32,
    pub voted_out_contestant_id: Option<i32>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
