use chrono::{Local, NaiveDate};
use clap::Subcommand;
use serde::Serialize;
use studydash_core::activity::{format_hm, progress_pct, record_day, seconds_on, time_left, weekly_seconds};
use studydash_core::Config;

use super::{current_goal, current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Record seconds studied on a day
    Record {
        /// Seconds studied so far that day
        seconds: u64,
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show today's progress
    Show,
}

#[derive(Serialize)]
struct Progress {
    seconds_today: u64,
    goal_secs: u64,
    progress_pct: f64,
    time_left_secs: u64,
    studied: String,
    weekly_secs: u64,
}

pub async fn run(action: ActivityAction) -> CmdResult {
    let cache = open_cache()?;
    let profile = current_profile(&cache).await?;
    let today = Local::now().date_naive();
    match action {
        ActivityAction::Record { seconds, date } => {
            let day = date.unwrap_or(today);
            record_day(&cache, &profile.id, day, seconds).await?;
            println!("recorded {} on {day}", format_hm(seconds));
        }
        ActivityAction::Show => {
            let config = Config::load()?;
            let goal = current_goal(&cache, &config, &profile.id).await?.seconds();
            let seconds = seconds_on(&cache, &profile.id, today).await?;
            let progress = Progress {
                seconds_today: seconds,
                goal_secs: goal,
                progress_pct: progress_pct(seconds, goal),
                time_left_secs: time_left(seconds, goal),
                studied: format_hm(seconds),
                weekly_secs: weekly_seconds(&cache, &profile.id, today).await?,
            };
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
    }
    Ok(())
}
