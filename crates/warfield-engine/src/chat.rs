//! Fixed-size ring of recent chat frames.

use std::collections::VecDeque;

use warfield_core::Frame;

/// The last `capacity` chat frames, oldest first.
///
/// Owned by the hub loop and replayed to each newly registered
/// connection. A capacity of 0 keeps nothing.
#[derive(Clone, Debug)]
pub struct ChatBacklog {
    capacity: usize,
    frames: VecDeque<Frame>,
}

impl ChatBacklog {
    /// An empty backlog holding at most `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a frame, dropping the oldest when full.
    pub fn push(&mut self, frame: Frame) {
        if self.capacity == 0 {
            return;
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Frames oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    /// Number of frames held.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether nothing is held.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(b: &ChatBacklog) -> Vec<String> {
        b.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn keeps_most_recent_in_order() {
        let mut b = ChatBacklog::new(3);
        for line in ["a", "b", "c", "d", "e"] {
            b.push(Frame::from(line));
        }
        assert_eq!(b.len(), 3);
        assert_eq!(texts(&b), vec!["c", "d", "e"]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut b = ChatBacklog::new(0);
        b.push(Frame::from("x"));
        assert!(b.is_empty());
    }
}
