//! CSV report of processed pages

use crate::crawler::PageRecord;
use crate::output::OutputResult;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column names of the report, in order
pub const REPORT_HEADER: [&str; 5] = [
    "page_url",
    "h1",
    "first_paragraph",
    "outgoing_link_urls",
    "image_urls",
];

/// Separator used inside the list columns
pub const LIST_SEPARATOR: &str = ";";

/// Writes the report for `pages` to a file, replacing it if it exists
///
/// One row per processed page, ordered by normalized key; the `page_url`
/// column holds that key. The header is always written, so an empty crawl
/// produces a header-only file.
pub fn write_csv_report(pages: &BTreeMap<String, PageRecord>, path: &Path) -> OutputResult<()> {
    let file = File::create(path)?;
    write_csv(pages, file)
}

/// Writes the report for `pages` to any writer
pub fn write_csv<W: Write>(pages: &BTreeMap<String, PageRecord>, writer: W) -> OutputResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(REPORT_HEADER)?;

    for (key, page) in pages {
        let links = page.outgoing_links.join(LIST_SEPARATOR);
        let images = page.image_urls.join(LIST_SEPARATOR);
        writer.write_record([
            key.as_str(),
            page.h1.as_str(),
            page.first_paragraph.as_str(),
            links.as_str(),
            images.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
