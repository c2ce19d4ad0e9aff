//! Progress command handler

use crate::error::CliError;
use crate::render;
use lingua::{LinguaApp, LinguaConfig, UserId};

pub async fn run_progress(config: &LinguaConfig, user: &str, json: bool) -> Result<(), CliError> {
    let app = LinguaApp::from_config("lingua-cli", config).await?;
    let report = app
        .dispatcher()
        .progress(&UserId::from_string(user))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::progress(&report));
    }
    Ok(())
}
