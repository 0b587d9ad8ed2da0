use dotenv::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub current_season: i32,
    pub recency_window_days: i64,
    pub parlay_bonus: i32,
}

impl Config {
    pub fn init() -> Config {
        dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let current_season = std::env::var("CURRENT_SEASON")
            .expect("CURRENT_SEASON must be set")
            .parse::<i32>()
            .expect("Failed to parse CURRENT_SEASON as i32");
        let recency_window_days = std::env::var("RECENCY_WINDOW_DAYS")
            .unwrap_or_else(|_| String::new());
        let parlay_bonus = std::env::var("PARLAY_BONUS")
            .unwrap_or_else(|_| String::new());

        let recency_window_days = if recency_window_days.is_empty() {
            60 // Default window of ±60 days around now
        } else {
            recency_window_days
                .parse::<i64>()
                .expect("Failed to parse RECENCY_WINDOW_DAYS as i64")
        };

        let parlay_bonus = if parlay_bonus.is_empty() {
            20 // Default all-or-nothing parlay bonus
        } else {
            parlay_bonus
                .parse::<i32>()
                .expect("Failed to parse PARLAY_BONUS as i32")
        };

        Config {
            database_url,
            current_season,
            recency_window_days,
            parlay_bonus,
        }
    }
}
