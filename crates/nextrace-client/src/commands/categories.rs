//! Category listing.

use nextrace_core::CategoryDescriptor;
use nextrace_service::ServiceConfig;

use crate::error::ClientResult;

/// Prints the configured categories.
pub fn run(config: &ServiceConfig, json: bool) -> ClientResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&config.categories)?);
    } else {
        print!("{}", render(&config.categories));
    }
    Ok(())
}

/// One line per category: id, short name, adapter and full name.
pub fn render(categories: &[CategoryDescriptor]) -> String {
    categories
        .iter()
        .map(|c| {
            format!(
                "{:<8} {:<8} {:<8} {}\n",
                c.id,
                c.short_name,
                c.adapter.as_str(),
                c.name
            )
        })
        .collect()
}
