//! The family directory, ranked feeds, and the follow graph.

pub mod feed;
pub mod graph;

pub use feed::FeedService;
pub use graph::GraphService;
