use crate::client::{FetchedThread, ThreadSource};
use crate::config::ScrapeOptions;
use crate::date::{file_stamp, now_rfc3339, now_utc_seconds};
use crate::error::{Result, ScrapeError};
use crate::export::{export_combined_files, export_console, export_thread_files, ExportFormat};
use crate::normalize::{normalize_comment, normalize_post};
use crate::progress::maybe_progress;
use crate::records::{ScrapedThread, ThreadResult};
use crate::thread_url::ThreadRef;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Run driver: fetch, flatten and normalize each URL in order, then export.
pub struct ThreadScraper<S> {
    source: S,
    pub(crate) opts: ScrapeOptions,
}

/// A URL that could not be scraped, with its 1-based input position.
#[derive(Debug)]
pub struct UrlFailure {
    pub index: usize,
    pub url: String,
    pub error: ScrapeError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub attempted: usize,
    pub threads: Vec<ScrapedThread>,
    pub failures: Vec<UrlFailure>,
    pub exports: Vec<PathBuf>,
    pub export_failures: Vec<ScrapeError>,
}

impl RunReport {
    /// True when URLs were given and none of them produced a thread.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.threads.is_empty()
    }

    pub fn results(&self) -> impl Iterator<Item = &ThreadResult> {
        self.threads.iter().map(|t| &t.result)
    }
}

impl<S: ThreadSource> ThreadScraper<S> {
    pub fn new(source: S) -> Self {
        Self { source, opts: ScrapeOptions::default() }
    }

    // -------- Builder methods --------
    pub fn options(mut self, opts: ScrapeOptions) -> Self { self.opts = opts; self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn format(mut self, format: ExportFormat) -> Self { self.opts = self.opts.with_format(format); self }
    pub fn preview_chars(mut self, n: usize) -> Self { self.opts = self.opts.with_preview_chars(n); self }
    pub fn combined(mut self, yes: bool) -> Self { self.opts = self.opts.with_combined(yes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch, flatten and normalize one thread.
    pub fn scrape_thread(&self, url: &str) -> Result<ThreadResult> {
        let thread = ThreadRef::parse(url)?;
        let FetchedThread { post: raw_post, comments } = self.source.fetch_thread(&thread)?;

        let mut post = normalize_post(&raw_post);
        if post.id.is_empty() {
            post.id = thread.fullname();
        }

        let mut out = Vec::new();
        for raw in comments {
            out.push(normalize_comment(&raw?));
        }

        let result = ThreadResult { post, comments: out, scraped_at: now_rfc3339() };
        if let Some(orphan) = result.first_orphan() {
            tracing::warn!(thread = %thread, comment = orphan, "Comment parent not found earlier in thread");
        }
        tracing::info!(thread = %thread, comments = result.comments.len(), "Scraped thread");
        Ok(result)
    }

    /// Scrape every URL in order. Per-URL failures are logged and collected;
    /// a fatal error (bad credentials) aborts the batch.
    pub fn fetch_all<I, U>(&self, urls: I) -> Result<(Vec<ScrapedThread>, Vec<UrlFailure>)>
    where
        I: IntoIterator<Item = U>,
        U: AsRef<str>,
    {
        let urls: Vec<String> = urls.into_iter().map(|u| u.as_ref().to_string()).collect();
        let pb = maybe_progress(self.opts.progress, urls.len() as u64, "Scraping threads");

        let mut threads = Vec::new();
        let mut failures = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            tracing::info!("Scraping thread {}/{}: {}", index, urls.len(), url);
            match self.scrape_thread(url) {
                Ok(result) => threads.push(ScrapedThread { index, url: url.clone(), result }),
                Err(e) if e.is_fatal() => {
                    if let Some(pb) = &pb { pb.abandon_with_message("aborted"); }
                    tracing::error!(url = %url, kind = e.kind(), error = %e, "Aborting run");
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(url = %url, kind = e.kind(), error = %e, "Error scraping thread; skipping");
                    failures.push(UrlFailure { index, url: url.clone(), error: e });
                }
            }
            if let Some(pb) = &pb { pb.inc(1); }
        }
        if let Some(pb) = pb { pb.finish_with_message("done"); }
        Ok((threads, failures))
    }

    /// Full run with console output on stdout.
    pub fn run<I, U>(&self, urls: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = U>,
        U: AsRef<str>,
    {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.run_with_console(urls, &mut lock)
    }

    /// Full run writing console output to `console`.
    pub fn run_with_console<I, U, W>(&self, urls: I, console: &mut W) -> Result<RunReport>
    where
        I: IntoIterator<Item = U>,
        U: AsRef<str>,
        W: Write,
    {
        let urls: Vec<String> = urls.into_iter().map(|u| u.as_ref().to_string()).collect();
        let (threads, failures) = self.fetch_all(&urls)?;
        let mut report = RunReport { attempted: urls.len(), threads, failures, ..Default::default() };
        self.export_all(&mut report, console);

        tracing::info!(
            attempted = report.attempted,
            succeeded = report.threads.len(),
            failed = report.failures.len(),
            files = report.exports.len(),
            "Run finished"
        );
        Ok(report)
    }

    fn export_all<W: Write>(&self, report: &mut RunReport, console: &mut W) {
        let format = self.opts.format;
        let dir = self.opts.output_dir.as_path();
        let stamp = file_stamp(now_utc_seconds());

        let mut outcomes = Vec::new();
        for t in &report.threads {
            if let Err(e) = export_console(console, t, format, self.opts.preview_chars) {
                outcomes.push(Err(e));
            }
            outcomes.extend(export_thread_files(t, format, dir, &stamp));
        }
        if self.opts.combined && report.threads.len() > 1 && format.writes_files() {
            outcomes.extend(export_combined_files(&report.threads, format, dir, &stamp));
        }

        for o in outcomes {
            match o {
                Ok(path) => report.exports.push(path),
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    report.export_failures.push(e);
                }
            }
        }
    }
}
