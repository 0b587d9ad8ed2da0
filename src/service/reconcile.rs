use crate::config::config::Config;
use crate::models::league::League;
use crate::models::pick::{NewPick, PickScoreUpdate};
use crate::models::profile::{ProfileAggregateUpdate, ProfileStandingUpdate};
use crate::repository::database::{
    all_leagues, distinct_tribes, find_contestant_by_name, find_week, insert_pick, league_profiles,
    mark_contestant_inactive, picks_for_week, prior_picks, season_contestants, season_picks,
    update_pick_score, update_profile_aggregates, update_profile_standing, upsert_week_result,
    Database,
};
use crate::service::scoring::{
    immunity_mode, prior_idols_available, recompute_aggregates, score_pick, stable_safe_choice,
    standing_transition, PickFacts, ScoringRules, Standing, StandingChange,
};
use chrono::{Duration, NaiveDateTime, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use log::{error, info, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("database pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("contestant '{name}' not found for season {season}")]
    ContestantNotFound { name: String, season: i32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    WeekMissing { number: i32 },
    NoReferenceTime { number: i32 },
    OutsideRecencyWindow { reference: NaiveDateTime },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::WeekMissing { number } => {
                write!(f, "week {number} does not exist for this league and season")
            }
            SkipReason::NoReferenceTime { number } => {
                write!(f, "week {number} has no lock time or start date to validate recency")
            }
            SkipReason::OutsideRecencyWindow { reference } => {
                write!(f, "reference time {reference} is outside the recency window")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LeagueReport {
    Processed {
        picks_scored: usize,
        picks_backfilled: usize,
    },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueLine {
    pub league: String,
    pub status: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub leagues: Vec<LeagueLine>,
}

/// The weekly results reconciler. One call per real-world elimination:
/// backfills missing picks, scores every pick, walks the exile/elimination
/// state machine, settles wagers and parlays, and rewrites aggregates.
/// Each league runs inside its own transaction; a failed league never stops
/// the rest of the batch, and re-running with the same inputs is a no-op
/// beyond the first application.
pub struct Reconciler {
    db: Database,
    season: i32,
    recency_window_days: i64,
    rules: ScoringRules,
}

impl Reconciler {
    pub fn new(db: Database, config: &Config) -> Self {
        let rules = ScoringRules {
            parlay_bonus: config.parlay_bonus,
            ..ScoringRules::default()
        };
        Reconciler {
            db,
            season: config.current_season,
            recency_window_days: config.recency_window_days,
            rules,
        }
    }

    pub async fn run(
        &self,
        week_number: i32,
        voted_out_name: &str,
        winner_name: &str,
    ) -> Result<RunSummary, ReconcileError> {
        let mut conn = self.db.get_db_conn().await?;
        let leagues = all_leagues(&mut conn).await?;
        let now = Utc::now().naive_utc();

        let mut summary = RunSummary::default();
        for league in &leagues {
            info!(
                "Processing league '{}' (season {})",
                league.name, self.season
            );
            let outcome = conn
                .transaction::<LeagueReport, ReconcileError, _>(|conn| {
                    async move {
                        self.reconcile_league(
                            conn,
                            league,
                            week_number,
                            voted_out_name,
                            winner_name,
                            now,
                        )
                        .await
                    }
                    .scope_boxed()
                })
                .await;

            match outcome {
                Ok(LeagueReport::Processed {
                    picks_scored,
                    picks_backfilled,
                }) => {
                    info!(
                        "Week {} processed for league '{}': {} pick(s) scored, {} backfilled",
                        week_number, league.name, picks_scored, picks_backfilled
                    );
                    summary.processed += 1;
                    summary.leagues.push(LeagueLine {
                        league: league.name.clone(),
                        status: "processed".to_string(),
                        detail: format!("{picks_scored} scored, {picks_backfilled} backfilled"),
                    });
                }
                Ok(LeagueReport::Skipped(reason)) => {
                    warn!("Skipping league '{}': {}", league.name, reason);
                    summary.skipped += 1;
                    summary.leagues.push(LeagueLine {
                        league: league.name.clone(),
                        status: "skipped".to_string(),
                        detail: reason.to_string(),
                    });
                }
                Err(err) => {
                    error!(
                        "Failed to reconcile week {} for league '{}': {}",
                        week_number, league.name, err
                    );
                    summary.failed += 1;
                    summary.leagues.push(LeagueLine {
                        league: league.name.clone(),
                        status: "failed".to_string(),
                        detail: err.to_string(),
                    });
                }
            }
        }
        Ok(summary)
    }

    async fn reconcile_league(
        &self,
        conn: &mut AsyncPgConnection,
        league: &League,
        week_number: i32,
        voted_out_name: &str,
        winner_name: &str,
        now: NaiveDateTime,
    ) -> Result<LeagueReport, ReconcileError> {
        let week = match find_week(conn, league.id, self.season, week_number).await? {
            Some(week) => week,
            None => {
                return Ok(LeagueReport::Skipped(SkipReason::WeekMissing {
                    number: week_number,
                }))
            }
        };

        // Recency guard against stale or premature invocations.
        let reference = match week.reference_time() {
            Some(reference) => reference,
            None => {
                return Ok(LeagueReport::Skipped(SkipReason::NoReferenceTime {
                    number: week_number,
                }))
            }
        };
        let window = Duration::days(self.recency_window_days);
        if reference < now - window || reference > now + window {
            return Ok(LeagueReport::Skipped(SkipReason::OutsideRecencyWindow {
                reference,
            }));
        }

        let voted_out = find_contestant_by_name(conn, self.season, voted_out_name)
            .await?
            .ok_or_else(|| ReconcileError::ContestantNotFound {
                name: voted_out_name.to_string(),
                season: self.season,
            })?;

        // The winner may be a contestant or, pre-merge, a tribe keyword.
        let (winner_id, winner_tribe) =
            match find_contestant_by_name(conn, self.season, winner_name).await? {
                Some(winner) => (Some(winner.id), winner.tribe),
                None => (None, Some(winner_name.to_string())),
            };

        if voted_out.is_active {
            mark_contestant_inactive(conn, voted_out.id).await?;
            info!("Marked '{}' as voted out", voted_out.name);
        }
        upsert_week_result(conn, week.id, voted_out.id).await?;

        let tribes = distinct_tribes(conn, self.season).await?;
        let mode = immunity_mode(tribes, winner_id, winner_tribe);

        let roster = season_contestants(conn, self.season).await?;
        let tribe_by_id: HashMap<i32, Option<String>> =
            roster.iter().map(|c| (c.id, c.tribe.clone())).collect();
        let name_by_id: HashMap<i32, String> =
            roster.iter().map(|c| (c.id, c.name.clone())).collect();
        let active: Vec<(i32, String)> = roster
            .iter()
            .filter(|c| c.is_active)
            .map(|c| (c.id, c.name.clone()))
            .collect();

        let members = league_profiles(conn, league.id).await?;
        let username_by_profile: HashMap<i32, String> = members
            .iter()
            .map(|(profile, user)| (profile.id, user.username.clone()))
            .collect();
        let mut standings: HashMap<i32, Standing> = members
            .iter()
            .map(|(profile, _)| {
                (
                    profile.id,
                    Standing {
                        exiled: profile.exiled,
                        eliminated: profile.eliminated,
                        exiled_week_id: profile.exiled_week_id,
                    },
                )
            })
            .collect();

        let submitted: HashSet<i32> = picks_for_week(conn, week.id)
            .await?
            .iter()
            .map(|p| p.profile_id)
            .collect();

        // Backfill: burn a banked idol when one is available, otherwise
        // auto-assign a safe pick the profile has never used.
        let mut picks_backfilled = 0;
        for (profile, user) in &members {
            if submitted.contains(&profile.id) {
                continue;
            }
            let prior =
                prior_picks(conn, profile.id, league.id, self.season, week.number).await?;
            if prior_idols_available(&prior) > 0 {
                insert_pick(conn, &NewPick::auto_idol_burn(profile.id, week.id)).await?;
                warn!("Auto-burned an idol for {} (missed week)", user.username);
            } else {
                let previously_safe: HashSet<i32> =
                    prior.iter().filter_map(|p| p.safe_pick_id).collect();
                let candidates: Vec<(i32, String)> = active
                    .iter()
                    .filter(|(id, _)| !previously_safe.contains(id))
                    .cloned()
                    .collect();
                let chosen = stable_safe_choice(&candidates, profile.id, week.id);
                insert_pick(conn, &NewPick::auto_safe(profile.id, week.id, chosen)).await?;
                match chosen.and_then(|id| name_by_id.get(&id)) {
                    Some(name) => warn!(
                        "Auto-assigned safe pick for {}: {}",
                        user.username, name
                    ),
                    None => warn!(
                        "No available safe candidate to auto-assign for {}",
                        user.username
                    ),
                }
            }
            picks_backfilled += 1;
        }

        // Score every pick for the week, submitted or backfilled.
        let week_picks = picks_for_week(conn, week.id).await?;
        for pick in &week_picks {
            let immunity_pick_tribe = pick
                .immunity_pick_id
                .and_then(|id| tribe_by_id.get(&id).cloned())
                .flatten();
            let facts = PickFacts::from_pick(pick, immunity_pick_tribe);
            let score = score_pick(&facts, voted_out.id, &mode, &self.rules);

            // Standing captured before this pick's mutations, so a single
            // pick cannot exile and eliminate in the same pass.
            if let Some(&before) = standings.get(&pick.profile_id) {
                let change = standing_transition(
                    before,
                    facts.safe_pick_id,
                    facts.used_immunity_idol,
                    voted_out.id,
                    week.number,
                    week.id,
                );
                if change != StandingChange::None {
                    let after = before.apply(change, week.id);
                    standings.insert(pick.profile_id, after);
                    update_profile_standing(
                        conn,
                        pick.profile_id,
                        &ProfileStandingUpdate {
                            exiled: after.exiled,
                            eliminated: after.eliminated,
                            exiled_week_id: Some(after.exiled_week_id),
                            updated_at: Some(Utc::now().naive_utc()),
                        },
                    )
                    .await?;
                    let username = username_by_profile
                        .get(&pick.profile_id)
                        .map(String::as_str)
                        .unwrap_or("unknown");
                    match change {
                        StandingChange::Exiled => warn!(
                            "{} has been exiled (safe pick went home, no idol)",
                            username
                        ),
                        StandingChange::Eliminated => warn!(
                            "{} was already exiled and missed safe again: eliminated",
                            username
                        ),
                        StandingChange::None => {}
                    }
                }
            }

            update_pick_score(
                conn,
                pick.id,
                &PickScoreUpdate {
                    safe_correct: Some(score.safe_correct),
                    voted_out_correct: Some(score.voted_out_correct),
                    immunity_correct: Some(score.immunity_correct),
                    points_safe: score.points_safe,
                    points_vo: score.points_vo,
                    points_immunity: score.points_immunity,
                    points_wagers: score.points_wagers,
                    points_parlay: score.points_parlay,
                    points_week_total: score.points_week_total,
                    updated_at: Some(Utc::now().naive_utc()),
                },
            )
            .await?;
        }

        // Full aggregate recompute across the season, never an increment.
        for (profile, _) in &members {
            let picks = season_picks(conn, profile.id, league.id, self.season).await?;
            let aggregates = recompute_aggregates(&picks, profile.exile_return_cost);
            update_profile_aggregates(
                conn,
                profile.id,
                &ProfileAggregateUpdate {
                    immunity_idols: aggregates.immunity_idols,
                    immunity_idols_played: aggregates.immunity_idols_played,
                    correct_safe_guesses: aggregates.correct_safe_guesses,
                    correct_voted_out_guesses: aggregates.correct_voted_out_guesses,
                    correct_immunity_guesses: aggregates.correct_immunity_guesses,
                    total_score: aggregates.total_score,
                    updated_at: Some(Utc::now().naive_utc()),
                },
            )
            .await?;
        }

        Ok(LeagueReport::Processed {
            picks_scored: week_picks.len(),
            picks_backfilled,
        })
    }
}
