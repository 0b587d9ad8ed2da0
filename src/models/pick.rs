use chrono::{NaiveDateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One submission per (profile, week). The three prediction columns and the
/// wager/parlay columns are written pre-lock by the submission surface; the
/// correctness and points columns are derived and rewritten by the reconciler
/// on every run.
#[derive(Serialize, Deserialize, Debug, Clone, Queryable)]
#[diesel(table_name = crate::models::schema::picks)]
pub struct Pick {
    pub id: i32,
    pub uuid: String,
    pub profile_id: i32,
    pub week_id: i32,
    pub safe_pick_id: Option<i32>,
    pub voted_out_pick_id: Option<i32>,
    pub immunity_pick_id: Option<i32>,
    pub used_immunity_idol: bool,
    pub wager_voted_out: i32,
    pub wager_immunity: i32,
    pub parlay: bool,
    pub auto_assigned: bool,
    pub safe_correct: Option<bool>,
    pub voted_out_correct: Option<bool>,
    pub immunity_correct: Option<bool>,
    pub points_safe: i32,
    pub points_vo: i32,
    pub points_immunity: i32,
    pub points_wagers: i32,
    pub points_parlay: i32,
    pub points_week_total: i32,
    #[serde(rename = "createdAt")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PickValidationError {
    #[error("safe pick and voted out pick cannot be the same contestant")]
    SafeEqualsVotedOut,
    #[error("wagers cannot be negative")]
    NegativeWager,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::models::schema::picks)]
pub struct NewPick {
    pub uuid: String,
    pub profile_id: i32,
    pub week_id: i32,
    pub safe_pick_id: Option<i32>,
    pub voted_out_pick_id: Option<i32>,
    pub immunity_pick_id: Option<i32>,
    pub used_immunity_idol: bool,
    pub wager_voted_out: i32,
    pub wager_immunity: i32,
    pub parlay: bool,
    pub auto_assigned: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl NewPick {
    /// A player-submitted pick. Enforced here, independent of reconciliation:
    /// safe pick and voted out pick must differ and wagers are non-negative.
    #[allow(clippy::too_many_arguments)]
    pub fn player_submission(
        profile_id: i32,
        week_id: i32,
        safe_pick_id: i32,
        voted_out_pick_id: i32,
        immunity_pick_id: i32,
        used_immunity_idol: bool,
        wager_voted_out: i32,
        wager_immunity: i32,
        parlay: bool,
    ) -> Result<NewPick, PickValidationError> {
        if safe_pick_id == voted_out_pick_id {
            return Err(PickValidationError::SafeEqualsVotedOut);
        }
        if wager_voted_out < 0 || wager_immunity < 0 {
            return Err(PickValidationError::NegativeWager);
        }
        Ok(NewPick {
            uuid: Uuid::new_v4().to_string(),
            profile_id,
            week_id,
            safe_pick_id: Some(safe_pick_id),
            voted_out_pick_id: Some(voted_out_pick_id),
            immunity_pick_id: Some(immunity_pick_id),
            used_immunity_idol,
            wager_voted_out,
            wager_immunity,
            parlay,
            auto_assigned: false,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: Some(Utc::now().naive_utc()),
        })
    }

    /// Backfill pick for a profile that missed the week but had an idol
    /// banked: the idol is burned, no predictions are recorded.
    pub fn auto_idol_burn(profile_id: i32, week_id: i32) -> NewPick {
        NewPick {
            uuid: Uuid::new_v4().to_string(),
            profile_id,
            week_id,
            safe_pick_id: None,
            voted_out_pick_id: None,
            immunity_pick_id: None,
            used_immunity_idol: true,
            wager_voted_out: 0,
            wager_immunity: 0,
            parlay: false,
            auto_assigned: true,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: Some(Utc::now().naive_utc()),
        }
    }

    /// Backfill pick carrying only an auto-assigned safe pick. `safe_pick_id`
    /// may be `None` when no eligible contestant remains.
    pub fn auto_safe(profile_id: i32, week_id: i32, safe_pick_id: Option<i32>) -> NewPick {
        NewPick {
            uuid: Uuid::new_v4().to_string(),
            profile_id,
            week_id,
            safe_pick_id,
            voted_out_pick_id: None,
            immunity_pick_id: None,
            used_immunity_idol: false,
            wager_voted_out: 0,
            wager_immunity: 0,
            parlay: false,
            auto_assigned: true,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: Some(Utc::now().naive_utc()),
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::models::schema::picks)]
pub struct PickScoreUpdate {
    pub safe_correct: Option<bool>,
    pub voted_out_correct: Option<bool>,
    pub immunity_correct: Option<bool>,
    pub points_safe: i32,
    pub points_vo: i32,
    pub points_immunity: i32,
    pub points_wagers: i32,
    pub points_parlay: i32,
    pub points_week_total: i32,
    pub updated_at: Option<NaiveDateTime>,
}
