//! Document ingestion: PDF bytes to plain text.

use std::panic;

use tracing::{debug, warn};

const PAGE_SEPARATOR: &str = "\n\n";

/// Extracts the text of every page and joins the non-empty ones.
///
/// Never fails: unreadable documents yield an empty string, which callers
/// must treat as "nothing to analyze".
pub fn extract_text(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed documents instead of returning an error.
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes));

    match pages {
        Ok(Ok(pages)) => {
            debug!("Extracted {} pages from PDF", pages.len());
            join_pages(pages)
        }
        Ok(Err(e)) => {
            warn!("Error extracting text from PDF: {e}");
            String::new()
        }
        Err(_) => {
            warn!("Error extracting text from PDF: parser panicked");
            String::new()
        }
    }
}

/// Trims each page, drops the empty ones, and separates the rest with a blank line.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .filter_map(|page| {
            let text = page.as_ref().trim();
            (!text.is_empty()).then(|| text.to_string())
        })
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}
