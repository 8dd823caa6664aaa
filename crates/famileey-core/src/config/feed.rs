//! Feed ranking configuration.

use serde::{Deserialize, Serialize};

/// Coefficients of the post relevance score
/// `like_weight * likes + comment_weight * comments + view_weight * views`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Weight of each like.
    pub like_weight: f64,
    /// Weight of each comment.
    pub comment_weight: f64,
    /// Weight of each recorded view.
    pub view_weight: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            like_weight: 2.0,
            comment_weight: 1.5,
            view_weight: 1.0,
        }
    }
}

impl FeedConfig {
    /// Computes the relevance score for the given engagement counts.
    pub fn score(&self, likes: u64, comments: u64, views: u64) -> f64 {
        self.like_weight * likes as f64
            + self.comment_weight * comments as f64
            + self.view_weight * views as f64
    }
}
