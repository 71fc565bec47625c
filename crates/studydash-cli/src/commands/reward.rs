use chrono::{Local, Utc};
use clap::Subcommand;
use studydash_core::activity::seconds_on;
use studydash_core::reward::{can_claim_iso, claim, ClaimOutcome, RewardClaimState};
use studydash_core::{Config, Notice};

use super::{current_goal, current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum RewardAction {
    /// Show whether today's reward can be claimed
    Status,
    /// Claim today's reward
    Claim,
    /// Evaluate eligibility for the given numbers without a signed-in user
    Check {
        /// Seconds studied today
        #[arg(long)]
        seconds: u64,
        /// Daily goal in seconds
        #[arg(long)]
        goal: u64,
        /// Last claim date (RFC 3339); an unparsable date counts as no claim
        #[arg(long)]
        last_claim: Option<String>,
    },
}

pub async fn run(action: RewardAction) -> CmdResult {
    if let RewardAction::Check {
        seconds,
        goal,
        last_claim,
    } = &action
    {
        println!("{}", can_claim_iso(*seconds, *goal, last_claim.as_deref(), Local::now()));
        return Ok(());
    }

    let config = Config::load()?;
    let cache = open_cache()?;
    let profile = current_profile(&cache).await?;
    let goal = current_goal(&cache, &config, &profile.id).await?.seconds();
    let now = Utc::now();
    let seconds = seconds_on(&cache, &profile.id, now.with_timezone(&Local).date_naive()).await?;

    match action {
        RewardAction::Status => {
            let state = RewardClaimState::evaluate(
                seconds,
                goal,
                profile.last_reward_claim_date,
                now.with_timezone(&Local),
            );
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        RewardAction::Claim => match claim(&profile, seconds, goal, &config.rewards, now) {
            ClaimOutcome::Claimed { amount, profile } => {
                cache.save_profile(&profile).await?;
                let notice = Notice::success(format!("Received: {amount} Free Credits!")).titled("Daily Goal Met");
                println!("{notice}");
                println!("credits: {}", profile.credits);
            }
            ClaimOutcome::Ignored => println!("nothing to claim"),
        },
        RewardAction::Check { .. } => {}
    }
    Ok(())
}
