//! Remove command implementation.

use anyhow::Result;
use geogallery_store::Gallery;

use super::emit;

pub async fn cmd_remove(gallery: &Gallery, id: i64, quiet: bool) -> Result<()> {
    if !gallery.remove(id).await? {
        anyhow::bail!("Photo {} not found", id);
    }

    if quiet {
        return Ok(());
    }
    emit(&format!("Removed photo {}\n", id))
}
