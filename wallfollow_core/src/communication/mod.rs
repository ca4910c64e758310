//! In-process publish/subscribe between nodes

pub mod topic;

pub use topic::Topic;
