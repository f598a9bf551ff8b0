//! JSON rendering. Output is produced fully in memory; writing is the caller's concern.

use crate::error::{Result, ScrapeError};
use crate::records::{ScrapedThread, ThreadResult};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// `{"post": {...}, "comments": [...], "scraped_at": "..."}`, pretty-printed.
///
/// The post object carries `id` (its `t3_` fullname) next to the descriptive fields,
/// so top-level comments' `parent_id` can be matched against it.
pub fn render_thread_json(result: &ThreadResult) -> Result<Vec<u8>> {
    to_pretty(result)
}

/// `{"combined": {"1": {...}, "2": {...}}}`, keyed by input position in run order.
pub fn render_combined_json(threads: &[ScrapedThread]) -> Result<Vec<u8>> {
    to_pretty(&CombinedDoc { combined: ByIndex(threads) })
}

#[derive(serde::Serialize)]
struct CombinedDoc<'a> {
    combined: ByIndex<'a>,
}

struct ByIndex<'a>(&'a [ScrapedThread]);

// Serialized by hand so keys keep run order instead of string order ("10" < "2").
impl Serialize for ByIndex<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for t in self.0 {
            map.serialize_entry(&t.index.to_string(), &t.result)?;
        }
        map.end()
    }
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(value)
        .map_err(|e| ScrapeError::Export { path: "<json>".to_string(), message: e.to_string() })?;
    buf.push(b'\n');
    Ok(buf)
}
