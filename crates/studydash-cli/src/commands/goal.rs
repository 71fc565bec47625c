use clap::Subcommand;
use studydash_core::activity::format_hm;
use studydash_core::goal::{save_goal, DailyGoal, GOAL_PRESETS};
use studydash_core::Config;

use super::{current_goal, current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Show the current daily goal
    Get,
    /// Set the daily goal
    Set {
        /// Goal in hours
        #[arg(long, conflicts_with = "minutes")]
        hours: Option<u64>,
        /// Goal in minutes
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// List goal presets
    Presets,
}

pub async fn run(action: GoalAction) -> CmdResult {
    match action {
        GoalAction::Get => {
            let config = Config::load()?;
            let cache = open_cache()?;
            let profile = current_profile(&cache).await?;
            let goal = current_goal(&cache, &config, &profile.id).await?;
            println!("{} ({})", goal.seconds(), format_hm(goal.seconds()));
        }
        GoalAction::Set { hours, minutes } => {
            let goal = match (hours, minutes) {
                (Some(h), _) => DailyGoal::from_hours(h)?,
                (None, Some(m)) => DailyGoal::from_minutes(m)?,
                (None, None) => return Err("pass --hours or --minutes".into()),
            };
            let cache = open_cache()?;
            let profile = current_profile(&cache).await?;
            save_goal(&cache, &profile.id, goal).await?;
            println!("goal set: {}", format_hm(goal.seconds()));
        }
        GoalAction::Presets => {
            for (label, secs) in GOAL_PRESETS {
                println!("{label}\t{secs}");
            }
        }
    }
    Ok(())
}
