//! `trellis resolve` command implementation.

use clap::Args;
use trellis_site::{ResolveError, SiteError};

use super::ContentArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// URL path to resolve (e.g., "/react/guide/environment-setup").
    path: String,

    #[command(flatten)]
    content: ContentArgs,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve or the content store
    /// fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let site = self.content.site()?;

        let resolution = match site.resolve(&self.path) {
            Ok(resolution) => resolution,
            Err(e) => {
                if let SiteError::Resolve(ResolveError::PageNotFound {
                    available_menu_paths,
                    ..
                }) = &e
                {
                    output.info("Available menu paths:");
                    for path in available_menu_paths {
                        output.info(&format!("  {path}"));
                    }
                }
                return Err(e.into());
            }
        };

        output.result_highlight(&resolution.document.slug);
        output.result(&format!(
            "{} {}",
            resolution.document.data.title,
            output.dim(&format!("({})", resolution.found_by))
        ));
        output.success(&format!(
            "Resolved {} via {}",
            resolution.path, resolution.found_by
        ));
        Ok(())
    }
}
