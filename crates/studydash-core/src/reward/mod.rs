mod claim;
mod evaluator;
mod tiers;

pub use claim::{claim, ClaimOutcome};
pub use evaluator::{can_claim, can_claim_iso, RewardClaimState};
pub use tiers::reward_amount;
