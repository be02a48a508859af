//! Topic keys
//!
//! A topic is either the wildcard (`"*"`, every sensor) or a single sensor id.

use std::fmt;

use crate::proto::Subscription;

/// Wire and display form of the wildcard topic
pub const WILDCARD: &str = "*";

/// Fan-out key of the hub registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicKey {
    /// Every sensor
    Wildcard,
    /// One sensor id
    Sensor(String),
}

impl TopicKey {
    /// Topic for one sensor id (`"*"` maps to the wildcard)
    pub fn sensor(id: impl Into<String>) -> Self {
        let id = id.into();
        if id == WILDCARD {
            TopicKey::Wildcard
        } else {
            TopicKey::Sensor(id)
        }
    }

    /// Registry key string
    pub fn as_str(&self) -> &str {
        match self {
            TopicKey::Wildcard => WILDCARD,
            TopicKey::Sensor(id) => id,
        }
    }

    /// Topics a subscription registers under
    ///
    /// An empty sensor list yields the single wildcard topic; otherwise one
    /// topic per listed id, in order, duplicates kept.
    pub fn for_subscription(subscription: &Subscription) -> Vec<TopicKey> {
        if subscription.is_wildcard() {
            vec![TopicKey::Wildcard]
        } else {
            subscription
                .sensor_ids
                .iter()
                .map(|id| TopicKey::sensor(id.as_str()))
                .collect()
        }
    }
}

impl fmt::Display for TopicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TopicKey {
    fn from(id: &str) -> Self {
        TopicKey::sensor(id)
    }
}
