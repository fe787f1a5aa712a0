//! Extraction stage: fetch the page and turn its first table into a dataset.

pub mod html_table;

pub use html_table::parse_first_table;

use crate::acquisition::HttpClient;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::progress::ProgressSink;

/// Fetch `url` and convert the first table on the page.
pub async fn extract(client: &HttpClient, url: &str, sink: &dyn ProgressSink) -> Result<Dataset> {
    sink.progress(&format!("Extracting data from {url}"));
    let html = client.get_text(url).await?;
    let dataset = parse_first_table(&html)?;
    sink.progress(&format!(
        "Extraction complete: {} rows retrieved",
        dataset.row_count()
    ));
    Ok(dataset)
}
