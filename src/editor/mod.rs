//! Comment editing over the AST
//!
//! All operations run off the walk dispatch in [`crate::ast::walk`], so the
//! editor needs no per-node knowledge of its own. Node-local operations
//! (`add`/`edit`/`delete`/`get`) take any [`Commented`] node; tree-wide
//! operations take the statement or query root.

use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::walk;
use crate::ast::{Commented, SelectQuery, Statement};
use crate::lexer::{Comment, CommentPlacement, CommentStyle};

/// Comment editing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentError {
    #[error("comment index {index} out of range for node with {len} comments")]
    InvalidCommentIndex { index: usize, len: usize },
}

/// A comment located by a tree-wide search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentHit {
    /// Component name of the owning node, e.g. `WithClause`
    pub component: &'static str,
    pub text: SmolStr,
    pub placement: CommentPlacement,
}

/// Editor over AST comment slots
pub struct CommentEditor;

impl CommentEditor {
    /// Attach a new block comment to a node.
    pub fn add_comment(node: &mut impl Commented, text: &str, placement: CommentPlacement) {
        let comment = Comment::new(text, CommentStyle::Block, placement);
        match placement {
            CommentPlacement::Leading => node.comments_mut().leading.push(comment),
            CommentPlacement::Trailing | CommentPlacement::Inline => {
                node.comments_mut().trailing.push(comment)
            }
        }
    }

    /// Replace the text of the comment at `idx` (leading first, then
    /// trailing).
    pub fn edit_comment(
        node: &mut impl Commented,
        idx: usize,
        text: &str,
    ) -> Result<(), CommentError> {
        let len = node.comments().len();
        match node.comments_mut().get_mut(idx) {
            Some(comment) => {
                comment.text = SmolStr::new(text);
                Ok(())
            }
            None => Err(CommentError::InvalidCommentIndex { index: idx, len }),
        }
    }

    /// Remove and return the comment at `idx`.
    pub fn delete_comment(node: &mut impl Commented, idx: usize) -> Result<Comment, CommentError> {
        let len = node.comments().len();
        node.comments_mut()
            .remove(idx)
            .ok_or(CommentError::InvalidCommentIndex { index: idx, len })
    }

    /// All comments on one node, leading first.
    pub fn get_comments(node: &impl Commented) -> Vec<Comment> {
        node.comments().iter().cloned().collect()
    }

    /// Total comments in the statement tree.
    pub fn count_comments(root: &Statement) -> usize {
        walk::count_comments(root)
    }

    /// Total comments in a query tree.
    pub fn count_query_comments(root: &SelectQuery) -> usize {
        walk::count_query_comments(root)
    }

    /// Drop every comment in the tree.
    pub fn delete_all_comments(root: &mut Statement) {
        walk::for_each_comments_mut(root, &mut |_, comments| comments.clear());
    }

    /// Replace `from` with `to` in every comment; returns the number of
    /// comments changed.
    pub fn replace_in_comments(root: &mut Statement, from: &str, to: &str) -> usize {
        let mut changed = 0;
        walk::for_each_comments_mut(root, &mut |_, comments| {
            for comment in comments.iter_mut() {
                if comment.text.contains(from) {
                    comment.text = SmolStr::new(comment.text.replace(from, to));
                    changed += 1;
                }
            }
        });
        changed
    }

    /// Find every component owning a comment containing `substring`.
    pub fn find_components_with_comment(root: &Statement, substring: &str) -> Vec<CommentHit> {
        let mut hits = Vec::new();
        walk::for_each_comments(root, &mut |component, comments| {
            for comment in comments.iter() {
                if comment.text.contains(substring) {
                    hits.push(CommentHit {
                        component,
                        text: comment.text.clone(),
                        placement: comment.placement,
                    });
                }
            }
        });
        hits
    }
}
