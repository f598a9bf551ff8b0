//! Human-readable thread dump. Not meant to be parsed.

use crate::records::ThreadResult;
use std::io::{self, Write};

const RULE_WIDTH: usize = 80;
const INDENT: &str = "    ";

pub fn print_thread<W: Write>(out: &mut W, result: &ThreadResult, preview_chars: usize) -> io::Result<()> {
    let post = &result.post;
    let comments = &result.comments;

    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "REDDIT THREAD")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;
    writeln!(out, "--- POST ---")?;
    writeln!(out, "Title: {}", post.title)?;
    writeln!(out, "Author: {}", post.author)?;
    writeln!(out, "Subreddit: r/{}", post.subreddit)?;
    writeln!(out, "Score: {} (Upvote Ratio: {})", post.score, post.upvote_ratio)?;
    writeln!(out, "Comments: {}", post.num_comments)?;
    writeln!(out, "Created: {}", post.created_utc)?;
    writeln!(out, "URL: {}", post.url)?;
    writeln!(out, "Text: {}", truncate(&post.text, preview_chars))?;

    writeln!(out)?;
    writeln!(out, "--- COMMENTS ({}) ---", comments.len())?;
    for (i, c) in comments.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{INDENT}Comment {}:", i + 1)?;
        writeln!(out, "{INDENT}Author: {}", c.author)?;
        writeln!(out, "{INDENT}Score: {}", c.score)?;
        writeln!(out, "{INDENT}Created: {}", c.created_utc)?;
        writeln!(out, "{INDENT}Text: {}", truncate(&c.body, preview_chars).replace('\n', &format!("\n{INDENT}      ")))?;
        writeln!(out, "{INDENT}{}", "-".repeat(RULE_WIDTH / 2))?;
    }
    out.flush()
}

/// Cut to `max_chars` characters, appending `...` when anything was dropped.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut result: String = text.chars().take(max_chars).collect();
    result.truncate(result.trim_end().len());
    result.push_str("...");
    result
}
