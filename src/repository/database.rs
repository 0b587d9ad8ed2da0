use crate::config::config::Config;
use crate::models::contestant::Contestant;
use crate::models::league::League;
use crate::models::pick::{NewPick, Pick, PickScoreUpdate};
use crate::models::profile::{Profile, ProfileAggregateUpdate, ProfileStandingUpdate};
use crate::models::schema::{contestants, leagues, picks, profiles, users, week_results, weeks};
use crate::models::user::User;
use crate::models::week::{NewWeekResult, Week};
use chrono::Utc;
use deadpool::managed::Object;
use diesel::{BoolExpressionMethods, ExpressionMethods, OptionalExtension, QueryDsl};
use diesel_async::{
    pooled_connection::{deadpool::Pool, AsyncDieselConnectionManager},
    AsyncPgConnection, RunQueryDsl,
};
use uuid::Uuid;

pub type DBPool = deadpool::managed::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;
pub type DBConn = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

pub struct Database {
    pool: DBPool,
}

impl Database {
    pub fn new(config: &Config) -> Self {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.clone());
        let pool = Pool::builder(manager)
            .build()
            .expect("Failed to create pool.");
        Database { pool }
    }

    pub async fn get_db_conn(
        &self,
    ) -> Result<DBConn, diesel_async::pooled_connection::deadpool::PoolError> {
        self.pool.get().await
    }
}

pub async fn all_leagues(conn: &mut AsyncPgConnection) -> Result<Vec<League>, diesel::result::Error> {
    leagues::table
        .order(leagues::id.asc())
        .load::<League>(conn)
        .await
}

pub async fn find_week(
    conn: &mut AsyncPgConnection,
    league_id: i32,
    season: i32,
    number: i32,
) -> Result<Option<Week>, diesel::result::Error> {
    weeks::table
        .filter(
            weeks::league_id
                .eq(league_id)
                .and(weeks::season.eq(season))
                .and(weeks::number.eq(number)),
        )
        .first::<Week>(conn)
        .await
        .optional()
}

pub async fn find_contestant_by_name(
    conn: &mut AsyncPgConnection,
    season: i32,
    contestant_name: &str,
) -> Result<Option<Contestant>, diesel::result::Error> {
    contestants::table
        .filter(
            contestants::season
                .eq(season)
                .and(contestants::name.eq(contestant_name)),
        )
        .first::<Contestant>(conn)
        .await
        .optional()
}

pub async fn season_contestants(
    conn: &mut AsyncPgConnection,
    season: i32,
) -> Result<Vec<Contestant>, diesel::result::Error> {
    contestants::table
        .filter(contestants::season.eq(season))
        .order(contestants::id.asc())
        .load::<Contestant>(conn)
        .await
}

/// Distinct tribe values for the season, nulls included; the merged phase
/// shows up as a single all-null "tribe".
pub async fn distinct_tribes(
    conn: &mut AsyncPgConnection,
    season: i32,
) -> Result<i64, diesel::result::Error> {
    let tribes = contestants::table
        .filter(contestants::season.eq(season))
        .select(contestants::tribe)
        .distinct()
        .load::<Option<String>>(conn)
        .await?;
    Ok(tribes.len() as i64)
}

pub async fn mark_contestant_inactive(
    conn: &mut AsyncPgConnection,
    contestant_id: i32,
) -> Result<(), diesel::result::Error> {
    diesel::update(contestants::table.find(contestant_id))
        .set((
            contestants::is_active.eq(false),
            contestants::updated_at.eq(Some(Utc::now().naive_utc())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn upsert_week_result(
    conn: &mut AsyncPgConnection,
    week_id: i32,
    voted_out_contestant_id: i32,
) -> Result<(), diesel::result::Error> {
    let row = NewWeekResult {
        uuid: Uuid::new_v4().to_string(),
        week_id,
        voted_out_contestant_id: Some(voted_out_contestant_id),
        created_at: Some(Utc::now().naive_utc()),
        updated_at: Some(Utc::now().naive_utc()),
    };
    diesel::insert_into(week_results::table)
        .values(&row)
        .on_conflict(week_results::week_id)
        .do_update()
        .set((
            week_results::voted_out_contestant_id.eq(Some(voted_out_contestant_id)),
            week_results::updated_at.eq(Some(Utc::now().naive_utc())),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn league_profiles(
    conn: &mut AsyncPgConnection,
    league_id: i32,
) -> Result<Vec<(Profile, User)>, diesel::result::Error> {
    profiles::table
        .inner_join(users::table)
        .filter(profiles::league_id.eq(league_id))
        .order(profiles::id.asc())
        .select((profiles::all_columns, users::all_columns))
        .load::<(Profile, User)>(conn)
        .await
}

/// This profile's picks from earlier weeks of the same league and season.
pub async fn prior_picks(
    conn: &mut AsyncPgConnection,
    profile_id: i32,
    league_id: i32,
    season: i32,
    before_week_number: i32,
) -> Result<Vec<Pick>, diesel::result::Error> {
    picks::table
        .inner_join(weeks::table)
        .filter(
            picks::profile_id
                .eq(profile_id)
                .and(weeks::league_id.eq(league_id))
                .and(weeks::season.eq(season))
                .and(weeks::number.lt(before_week_number)),
        )
        .order(picks::id.asc())
        .select(picks::all_columns)
        .load::<Pick>(conn)
        .await
}

pub async fn picks_for_week(
    conn: &mut AsyncPgConnection,
    week_id: i32,
) -> Result<Vec<Pick>, diesel::result::Error> {
    picks::table
        .filter(picks::week_id.eq(week_id))
        .order(picks::id.asc())
        .load::<Pick>(conn)
        .await
}

pub async fn insert_pick(
    conn: &mut AsyncPgConnection,
    new_pick: &NewPick,
) -> Result<Pick, diesel::result::Error> {
    diesel::insert_into(picks::table)
        .values(new_pick)
        .get_result::<Pick>(conn)
        .await
}

pub async fn update_pick_score(
    conn: &mut AsyncPgConnection,
    pick_id: i32,
    update: &PickScoreUpdate,
) -> Result<(), diesel::result::Error> {
    diesel::update(picks::table.find(pick_id))
        .set(update)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_profile_standing(
    conn: &mut AsyncPgConnection,
    profile_id: i32,
    update: &ProfileStandingUpdate,
) -> Result<(), diesel::result::Error> {
    diesel::update(profiles::table.find(profile_id))
        .set(update)
        .execute(conn)
        .await?;
    Ok(())
}

/// All of this profile's picks for the season, across every week of its
/// league. Feeds the full aggregate recompute.
pub async fn season_picks(
    conn: &mut AsyncPgConnection,
    profile_id: i32,
    league_id: i32,
    season: i32,
) -> Result<Vec<Pick>, diesel::result::Error> {
    picks::table
        .inner_join(weeks::table)
        .filter(
            picks::profile_id
                .eq(profile_id)
                .and(weeks::league_id.eq(league_id))
                .and(weeks::season.eq(season)),
        )
        .order(picks::id.asc())
        .select(picks::all_columns)
        .load::<Pick>(conn)
        .await
}

pub async fn update_profile_aggregates(
    conn: &mut AsyncPgConnection,
    profile_id: i32,
    update: &ProfileAggregateUpdate,
) -> Result<(), diesel::result::Error> {
    diesel::update(profiles::table.find(profile_id))
        .set(update)
        .execute(conn)
        .await?;
    Ok(())
}
