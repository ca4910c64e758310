//! # Nodes
//!
//! All nodes follow the same lifecycle:
//! 1. **Construction** - Node is created with its configuration and topics
//! 2. **Initialization** - `init()` is called once by the scheduler
//! 3. **Execution** - `tick()` and `on_timer()` are called serially
//! 4. **Shutdown** - `shutdown()` is called to release resources

pub mod node;

pub use node::{Node, NodeInfo, NodeState};
