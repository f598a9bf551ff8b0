mod config;
mod date;
mod error;
mod json_utils;
mod thread_url;

mod model;
mod records;
mod client;
mod flatten;
mod normalize;

mod console;
mod csv_export;
mod json_export;
mod export;

mod progress;
mod util;
mod pipeline;

pub use crate::config::{Credentials, ScrapeOptions, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_USER_AGENT};
pub use crate::error::{Result, ScrapeError};
pub use crate::thread_url::ThreadRef;
pub use crate::pipeline::{RunReport, ThreadScraper, UrlFailure};

// Records produced by a run.
pub use crate::records::{Comment, Post, ScrapedThread, ThreadResult, DELETED_AUTHOR, REMOVED_BODY};

// API seam and the Reddit implementation.
pub use crate::client::{classify_status, is_retriable_status, strip_kind, ApiOptions, FetchedThread, RedditApi, ThreadSource};
pub use crate::model::{
    parse_more_children_response, parse_thread_response, CommentNode, Listing, MoreComments, RawComment, RawPost, RawThing,
};

// Flattening and normalization, usable without the network.
pub use crate::flatten::{assemble_tree, collect_comments, CommentStream, MoreLoader, NoMoreLoader};
pub use crate::normalize::{absolute_permalink, normalize_author, normalize_body, normalize_comment, normalize_post};

// Renderers and export dispatch.
pub use crate::console::{print_thread, truncate};
pub use crate::csv_export::{render_combined_csv, render_thread_csv, thread_rows, CsvRow, COMBINED_HEADER, THREAD_HEADER};
pub use crate::json_export::{render_combined_json, render_thread_json};
pub use crate::export::{export_combined_files, export_console, export_thread_files, output_file_name, ExportFormat};

pub use crate::date::{epoch_to_rfc3339, file_stamp, now_rfc3339};
pub use crate::util::{init_tracing_once, temp_path_for, write_file_atomic};
