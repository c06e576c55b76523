//! Info command implementation.

use crate::display::print_media_info;
use anyhow::{Context, Result};
use aura_lib::prelude::*;

/// Show metadata for a URL.
pub(crate) async fn show_info(config: ToolConfig, url: &str, json: bool) -> Result<()> {
    let runner = ProcessRunner::new(config.line_buffer);
    let info = probe(&runner, &config.downloader, url)
        .await
        .with_context(|| format!("Could not read metadata for {url}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_media_info(&info);
    }
    Ok(())
}
