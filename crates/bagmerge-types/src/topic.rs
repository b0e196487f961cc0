use serde::{Deserialize, Serialize};

/// Declaration of a topic inside a bag.
///
/// Two declarations refer to the same topic when their `name` matches; the
/// remaining fields are carried along but never compared for identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub name: String,
    pub type_name: String,
    pub serialization_format: String,
    /// Opaque QoS description, passed through untouched.
    #[serde(default)]
    pub offered_qos_profiles: String,
}

impl TopicMetadata {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        serialization_format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            serialization_format: serialization_format.into(),
            offered_qos_profiles: String::new(),
        }
    }

    pub fn with_qos(mut self, offered_qos_profiles: impl Into<String>) -> Self {
        self.offered_qos_profiles = offered_qos_profiles.into();
        self
    }

    /// Returns `true` if both declarations name the same topic.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.name == other.name
    }

    /// Same topic name, but a different message type or wire format.
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.same_identity(other)
            && (self.type_name != other.type_name
                || self.serialization_format != other.serialization_format)
    }
}
