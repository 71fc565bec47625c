use clap::Subcommand;
use studydash_core::profile::{mark_all_read, unread_count};

use super::{current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum InboxAction {
    /// List inbox messages
    List,
    /// Mark every message read
    Read,
}

pub async fn run(action: InboxAction) -> CmdResult {
    let cache = open_cache()?;
    let profile = current_profile(&cache).await?;
    match action {
        InboxAction::List => {
            println!("{}", serde_json::to_string_pretty(&profile.inbox)?);
            eprintln!("{} unread", unread_count(&profile));
        }
        InboxAction::Read => match mark_all_read(&profile) {
            Some(updated) => {
                cache.save_profile(&updated).await?;
                println!("marked {} messages read", unread_count(&profile));
            }
            None => println!("no unread messages"),
        },
    }
    Ok(())
}
