use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

struct TopicBuffer<T> {
    queue: VecDeque<T>,
    depth: usize,
    published: u64,
    dropped: u64,
}

/// Named in-process message queue with keep-last history
///
/// Clones share the same queue: hand one clone to the publishing node and
/// another to the subscribing node. When more than `depth` messages are
/// pending the oldest one is dropped.
pub struct Topic<T> {
    name: Arc<str>,
    buffer: Arc<Mutex<TopicBuffer<T>>>,
}

impl<T> Topic<T> {
    /// Create a topic. A depth of zero is treated as one.
    pub fn new(name: &str, depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            name: Arc::from(name),
            buffer: Arc::new(Mutex::new(TopicBuffer {
                queue: VecDeque::with_capacity(depth),
                depth,
                published: 0,
                dropped: 0,
            })),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Publish a message
    pub fn send(&self, msg: T) {
        let mut buffer = self.buffer.lock();
        if buffer.queue.len() >= buffer.depth {
            buffer.queue.pop_front();
            buffer.dropped += 1;
            tracing::trace!(topic = %self.name, "queue full, dropped oldest message");
        }
        buffer.queue.push_back(msg);
        buffer.published += 1;
    }

    /// Take the oldest pending message
    pub fn recv(&self) -> Option<T> {
        self.buffer.lock().queue.pop_front()
    }

    /// Take every pending message, oldest first
    pub fn drain(&self) -> Vec<T> {
        self.buffer.lock().queue.drain(..).collect()
    }

    /// Take only the newest pending message, discarding older ones
    pub fn latest(&self) -> Option<T> {
        let mut buffer = self.buffer.lock();
        let newest = buffer.queue.pop_back();
        buffer.queue.clear();
        newest
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn published_count(&self) -> u64 {
        self.buffer.lock().published
    }

    pub fn dropped_count(&self) -> u64 {
        self.buffer.lock().dropped
    }
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl<T> fmt::Debug for Topic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topic")
            .field("name", &self.name)
            .field("pending", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let topic = Topic::new("numbers", 10);
        topic.send(1);
        topic.send(2);
        topic.send(3);
        assert_eq!(topic.recv(), Some(1));
        assert_eq!(topic.drain(), vec![2, 3]);
        assert!(topic.is_empty());
    }

    #[test]
    fn test_keep_last_drops_oldest() {
        let topic = Topic::new("numbers", 2);
        for i in 0..5 {
            topic.send(i);
        }
        assert_eq!(topic.drain(), vec![3, 4]);
        assert_eq!(topic.published_count(), 5);
        assert_eq!(topic.dropped_count(), 3);
    }

    #[test]
    fn test_clones_share_queue() {
        let publisher = Topic::new("shared", 10);
        let subscriber = publisher.clone();
        publisher.send("hello");
        assert_eq!(subscriber.recv(), Some("hello"));
        assert_eq!(subscriber.name(), "shared");
    }

    #[test]
    fn test_latest_discards_backlog() {
        let topic = Topic::new("cmd", 10);
        topic.send(1);
        topic.send(2);
        assert_eq!(topic.latest(), Some(2));
        assert_eq!(topic.recv(), None);
    }

    #[test]
    fn test_zero_depth_keeps_one() {
        let topic = Topic::new("tiny", 0);
        topic.send(1);
        topic.send(2);
        assert_eq!(topic.drain(), vec![2]);
    }
}
