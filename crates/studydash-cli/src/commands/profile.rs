use clap::Subcommand;
use studydash_core::UserProfile;

use super::{current_profile, open_cache, CmdResult};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Create a profile on this device and make it the current user
    Init {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Class level (e.g. "10")
        #[arg(long)]
        class_level: Option<String>,
        /// Board (e.g. "CBSE")
        #[arg(long)]
        board: Option<String>,
        /// Stream (e.g. "Science")
        #[arg(long)]
        stream: Option<String>,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// Show the current profile as JSON
    Show,
}

pub async fn run(action: ProfileAction) -> CmdResult {
    let cache = open_cache()?;
    match action {
        ProfileAction::Init {
            name,
            email,
            class_level,
            board,
            stream,
            id,
        } => {
            let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let mut profile = UserProfile::new(id, name, email);
            profile.class_level = class_level;
            profile.board = board;
            profile.stream = stream;
            cache.register_user(&profile).await?;
            cache.save_profile(&profile).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        ProfileAction::Show => {
            let profile = current_profile(&cache).await?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
