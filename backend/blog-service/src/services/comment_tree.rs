//! Builds the populated comment tree of a post from flat comment records.
//!
//! Records are grouped by parent id in one pass, then nodes are assembled
//! with an explicit stack so nesting never grows the call stack. Top-level
//! comments come newest first, replies at every depth oldest first.

use crate::models::{CommentNode, CommentRecord};
use std::collections::HashMap;
use uuid::Uuid;

/// Deepest nesting level rendered; a top-level comment is level 1
pub const MAX_DEPTH: usize = 32;

type Children = HashMap<Option<Uuid>, Vec<CommentRecord>>;

pub fn build(records: Vec<CommentRecord>) -> Vec<CommentNode> {
    let mut children: Children = HashMap::new();
    for record in records {
        children
            .entry(record.comment.parent_id)
            .or_default()
            .push(record);
    }

    let mut roots = children.remove(&None).unwrap_or_default();
    roots.sort_by(|a, b| {
        b.comment
            .created_at
            .cmp(&a.comment.created_at)
            .then_with(|| b.comment.id.cmp(&a.comment.id))
    });

    let nodes = roots
        .into_iter()
        .map(|record| assemble(record, &mut children))
        .collect();

    if !children.is_empty() {
        let skipped: usize = children.values().map(Vec::len).sum();
        tracing::warn!(
            skipped,
            max_depth = MAX_DEPTH,
            "comments that are orphaned or nested too deep were skipped"
        );
    }

    nodes
}

/// A node whose replies are still being assembled
struct Frame {
    record: CommentRecord,
    pending: std::vec::IntoIter<CommentRecord>,
    replies: Vec<CommentNode>,
}

impl Frame {
    /// Open `record` at `depth`; past [`MAX_DEPTH`] its replies stay unclaimed
    fn open(record: CommentRecord, depth: usize, children: &mut Children) -> Self {
        let mut replies = if depth < MAX_DEPTH {
            children.remove(&Some(record.comment.id)).unwrap_or_default()
        } else {
            Vec::new()
        };
        replies.sort_by(|a, b| {
            a.comment
                .created_at
                .cmp(&b.comment.created_at)
                .then_with(|| a.comment.id.cmp(&b.comment.id))
        });

        Self {
            record,
            pending: replies.into_iter(),
            replies: Vec::new(),
        }
    }

    fn close(self) -> CommentNode {
        let CommentRecord {
            comment,
            author,
            likes,
        } = self.record;

        CommentNode {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            body: comment.body,
            author,
            likes_count: likes.len(),
            likes,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
            replies: self.replies,
        }
    }
}

fn assemble(root: CommentRecord, children: &mut Children) -> CommentNode {
    let mut current = Frame::open(root, 1, children);
    let mut ancestors: Vec<Frame> = Vec::new();

    loop {
        if let Some(reply) = current.pending.next() {
            let depth = ancestors.len() + 2;
            let child = Frame::open(reply, depth, children);
            ancestors.push(std::mem::replace(&mut current, child));
            continue;
        }

        match ancestors.pop() {
            Some(parent) => {
                let done = std::mem::replace(&mut current, parent);
                current.replies.push(done.close());
            }
            None => return current.close(),
        }
    }
}
