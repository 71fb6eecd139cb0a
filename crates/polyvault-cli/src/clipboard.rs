//! System clipboard delivery for `get-secret --copy`

use anyhow::{Context, Result};

/// Copy a secret value to the system clipboard
pub fn copy(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("failed to copy to clipboard")?;
    Ok(())
}
