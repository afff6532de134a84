//! Check command.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::render;
use crate::session::Session;

/// Runs the check workflow for `hashes`, or for hashes read from stdin.
pub async fn run(config: &ClientConfig, hashes: Vec<String>, json: bool) -> ClientResult<()> {
    let hashes = if hashes.is_empty() {
        read_stdin_lines().await?
    } else {
        hashes
    };
    if hashes.is_empty() {
        return Err(ClientError::Usage("no hashes given".into()));
    }

    info!(hashes = hashes.len(), "checking");
    let session = Session::from_config(config);
    let responses = session.check(&hashes).await?;

    if json {
        println!("{}", render::json(&responses)?);
    } else {
        for response in responses.into_array() {
            print!("{}", render::text(&response));
        }
    }
    Ok(())
}

async fn read_stdin_lines() -> ClientResult<Vec<String>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut hashes = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if !line.is_empty() {
            hashes.push(line.to_string());
        }
    }
    Ok(hashes)
}
