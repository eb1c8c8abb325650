//! Calendar export.

use std::path::{Path, PathBuf};

use nextrace_service::RaceService;
use tracing::debug;

use crate::error::ClientResult;

/// Exports one category, or every race, as an iCalendar document.
///
/// Without `output` the document is printed to stdout.
pub async fn run(
    service: &RaceService,
    category: Option<&str>,
    output: Option<&Path>,
) -> ClientResult<()> {
    let document = service.get_calendar_document(category).await?;

    match output {
        Some(output) => {
            let path = target_path(output, &document.filename);
            std::fs::write(&path, &document.body)?;
            debug!(path = %path.display(), bytes = document.body.len(), "Wrote calendar");
            println!("Wrote {}", path.display());
        }
        None => print!("{}", document.body),
    }
    Ok(())
}

/// Resolves where to write: into `output` if it is a directory, else `output` itself.
pub fn target_path(output: &Path, filename: &str) -> PathBuf {
    if output.is_dir() {
        output.join(filename)
    } else {
        output.to_path_buf()
    }
}
