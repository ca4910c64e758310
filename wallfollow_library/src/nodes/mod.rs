//! Wall follower nodes
//!
//! - `WallFollowerNode` - drives the wall-follow controller from laser scans
//!
//! ```rust
//! use wallfollow_library::nodes::WallFollowerNode;
//! use wallfollow_library::WallFollowConfig;
//!
//! // Default topics: /diff_drive/scan in, /diff_drive/cmd_vel out
//! let node = WallFollowerNode::new();
//! assert_eq!(node.feed().name(), "/diff_drive/scan");
//!
//! let mut config = WallFollowConfig::default();
//! config.topics.cmd_vel = "/robot/cmd_vel".to_string();
//! let node = WallFollowerNode::from_config(&config);
//! assert_eq!(node.actuator().name(), "/robot/cmd_vel");
//! ```

pub mod wall_follower_node;

pub use wall_follower_node::WallFollowerNode;
