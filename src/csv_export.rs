//! CSV rendering: one row per post and one per comment.

use crate::error::{Result, ScrapeError};
use crate::records::{ScrapedThread, ThreadResult};

pub const THREAD_HEADER: [&str; 6] = ["Type", "Author", "Content", "Score", "Created", "URL"];
pub const COMBINED_HEADER: [&str; 7] = ["Thread", "Type", "Author", "Content", "Score", "Created", "URL"];

/// Uniform row shape shared by posts and comments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvRow {
    pub kind: &'static str,
    pub author: String,
    pub content: String,
    pub score: i64,
    pub created: String,
    pub url: String,
}

impl CsvRow {
    fn fields(&self) -> [String; 6] {
        [
            self.kind.to_string(),
            self.author.clone(),
            self.content.clone(),
            self.score.to_string(),
            self.created.clone(),
            self.url.clone(),
        ]
    }
}

/// Post first, then comments in stream order.
pub fn thread_rows(result: &ThreadResult) -> Vec<CsvRow> {
    let post = &result.post;
    let mut rows = Vec::with_capacity(result.comments.len() + 1);
    rows.push(CsvRow {
        kind: "POST",
        author: post.author.clone(),
        content: format!("{}\n\n{}", post.title, post.text),
        score: post.score,
        created: post.created_utc.clone(),
        url: post.permalink.clone(),
    });
    for c in &result.comments {
        rows.push(CsvRow {
            kind: "COMMENT",
            author: c.author.clone(),
            content: c.body.clone(),
            score: c.score,
            created: c.created_utc.clone(),
            url: c.permalink.clone(),
        });
    }
    rows
}

pub fn render_thread_csv(result: &ThreadResult) -> Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(THREAD_HEADER).map_err(csv_err)?;
    for row in thread_rows(result) {
        w.write_record(row.fields()).map_err(csv_err)?;
    }
    finish(w)
}

/// Rows from every thread in one file, tagged `Thread <n>` by input position.
pub fn render_combined_csv(threads: &[ScrapedThread]) -> Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(COMBINED_HEADER).map_err(csv_err)?;
    for t in threads {
        let label = format!("Thread {}", t.index);
        for row in thread_rows(&t.result) {
            let [kind, author, content, score, created, url] = row.fields();
            w.write_record([
                label.as_str(),
                kind.as_str(),
                author.as_str(),
                content.as_str(),
                score.as_str(),
                created.as_str(),
                url.as_str(),
            ])
            .map_err(csv_err)?;
        }
    }
    finish(w)
}

fn finish(w: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    w.into_inner().map_err(|e| ScrapeError::Export { path: "<csv>".to_string(), message: e.to_string() })
}

fn csv_err(e: csv::Error) -> ScrapeError {
    ScrapeError::Export { path: "<csv>".to_string(), message: e.to_string() }
}
