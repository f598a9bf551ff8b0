//! Comment-tree flattening.
//!
//! `CommentStream` walks the tree depth-first and yields each comment immediately
//! before its replies. "More" placeholders are expanded through a `MoreLoader`
//! when the walk reaches them, so the stream is lazy, finite and not restartable.

use crate::error::{Result, ScrapeError};
use crate::model::{CommentNode, MoreComments, RawComment};
use std::collections::{HashMap, HashSet};

/// Resolves a placeholder into the nodes it stands for.
/// Implementations may return a flat batch; `assemble_tree` re-nests it.
pub trait MoreLoader {
    fn load_more(&self, link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>>;
}

/// A loader for trees that are already complete. Any placeholder is an error.
pub struct NoMoreLoader;

impl MoreLoader for NoMoreLoader {
    fn load_more(&self, _link_id: &str, more: &MoreComments) -> Result<Vec<CommentNode>> {
        Err(ScrapeError::Network(format!(
            "cannot expand placeholder under {} ({} comments): no loader",
            more.parent_id, more.count
        )))
    }
}

pub struct CommentStream<'a> {
    link_id: String,
    // Reversed: the next node to visit is at the end.
    stack: Vec<CommentNode>,
    loader: &'a dyn MoreLoader,
    seen: HashSet<String>,
    expansions: usize,
    done: bool,
}

impl<'a> CommentStream<'a> {
    /// `link_id` is the post fullname (`t3_<id>`); `roots` are its top-level nodes in display order.
    pub fn new(link_id: impl Into<String>, roots: Vec<CommentNode>, loader: &'a dyn MoreLoader) -> Self {
        let mut stack = roots;
        stack.reverse();
        Self { link_id: link_id.into(), stack, loader, seen: HashSet::new(), expansions: 0, done: false }
    }

    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    /// Number of placeholders expanded so far.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    fn push_children(&mut self, children: Vec<CommentNode>) {
        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for CommentStream<'_> {
    type Item = Result<RawComment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        while let Some(node) = self.stack.pop() {
            match node {
                CommentNode::Comment(mut c) => {
                    let replies = std::mem::take(&mut c.replies);
                    self.push_children(replies);
                    // Already emitted; its replies may still be new.
                    if !self.seen.insert(c.fullname()) {
                        continue;
                    }
                    return Some(Ok(c));
                }
                CommentNode::More(more) => {
                    if !more.is_continue_thread() && more.children.is_empty() {
                        continue;
                    }
                    // A loader that hands back the same placeholder must not loop forever.
                    if !self.seen.insert(more.key()) {
                        continue;
                    }
                    tracing::debug!(parent = %more.parent_id, count = more.count, "Expanding placeholder");
                    match self.loader.load_more(&self.link_id, &more) {
                        Ok(batch) => {
                            self.expansions += 1;
                            let nested = assemble_tree(batch);
                            self.push_children(nested);
                        }
                        Err(e) => {
                            self.done = true;
                            self.stack.clear();
                            return Some(Err(e));
                        }
                    }
                }
            }
        }
        self.done = true;
        None
    }
}

/// Re-nest a flat batch by `parent_id`, keeping the batch order among siblings.
/// Nodes whose parent is not in the batch become roots, in batch order.
pub fn assemble_tree(flat: Vec<CommentNode>) -> Vec<CommentNode> {
    let names: HashSet<String> = flat
        .iter()
        .filter_map(|n| match n {
            CommentNode::Comment(c) => Some(c.fullname()),
            CommentNode::More(_) => None,
        })
        .collect();

    let mut roots = Vec::new();
    let mut by_parent: HashMap<String, Vec<CommentNode>> = HashMap::new();
    for node in flat {
        let parent = node.parent_id().to_string();
        if names.contains(&parent) {
            by_parent.entry(parent).or_default().push(node);
        } else {
            roots.push(node);
        }
    }

    roots.into_iter().map(|n| attach(n, &mut by_parent)).collect()
}

fn attach(node: CommentNode, by_parent: &mut HashMap<String, Vec<CommentNode>>) -> CommentNode {
    match node {
        CommentNode::Comment(mut c) => {
            if let Some(kids) = by_parent.remove(&c.fullname()) {
                for k in kids {
                    let k = attach(k, by_parent);
                    c.replies.push(k);
                }
            }
            CommentNode::Comment(c)
        }
        more => more,
    }
}

/// Drain a stream into a vector, stopping at the first error.
pub fn collect_comments(stream: CommentStream<'_>) -> Result<Vec<RawComment>> {
    stream.collect()
}
