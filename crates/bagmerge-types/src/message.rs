use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// A single recorded message: one opaque payload on one topic.
///
/// The payload is never interpreted by bagmerge. An empty `data` is a valid
/// message; "no message" is always expressed as `Option::None` by callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BagMessage {
    pub topic_name: String,
    pub timestamp: Timestamp,
    pub data: Vec<u8>,
}

impl BagMessage {
    pub fn new(topic_name: impl Into<String>, timestamp: Timestamp, data: Vec<u8>) -> Self {
        Self {
            topic_name: topic_name.into(),
            timestamp,
            data,
        }
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_converts_inputs() {
        let msg = BagMessage::new("/imu", Timestamp::from_nanos(150), vec![1, 2, 3]);
        assert_eq!(msg.topic_name, "/imu");
        assert_eq!(msg.timestamp, Timestamp::from_nanos(150));
        assert_eq!(msg.len(), 3);
        assert!(!msg.is_empty());
    }

    #[test]
    fn empty_payload_is_still_a_message() {
        let msg = BagMessage::new("/heartbeat", Timestamp::from_nanos(0), Vec::new());
        assert!(msg.is_empty());
        let some: Option<BagMessage> = Some(msg);
        assert!(some.is_some());
    }
}
