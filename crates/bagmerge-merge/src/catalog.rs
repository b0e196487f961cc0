use std::collections::HashMap;

use bagmerge_storage::BagReader;
use bagmerge_types::TopicMetadata;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MergeError, MergeResult};
use crate::stream::InputStream;

/// What to do when two inputs declare the same topic name with a different
/// type or serialization format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicConflictPolicy {
    /// Keep the first declaration and log a warning.
    #[default]
    FirstWins,
    /// Abort with [`MergeError::TopicConflict`].
    Reject,
}

/// Topic declarations from every input, deduplicated by name.
///
/// Entries keep the order of first occurrence: inputs in the order supplied,
/// and within an input the order it declares its topics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopicCatalog {
    topics: Vec<TopicMetadata>,
}

impl TopicCatalog {
    pub fn merge<R: BagReader>(
        streams: &[InputStream<R>],
        policy: TopicConflictPolicy,
    ) -> MergeResult<Self> {
        Self::from_declarations(streams.iter().map(InputStream::topics), policy)
    }

    /// Build a catalog from per-source topic lists, given in source order.
    pub fn from_declarations<I, T>(sources: I, policy: TopicConflictPolicy) -> MergeResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = TopicMetadata>,
    {
        let mut topics: Vec<TopicMetadata> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for (source, declared) in sources.into_iter().enumerate() {
            for topic in declared {
                let Some(&existing) = by_name.get(&topic.name) else {
                    by_name.insert(topic.name.clone(), topics.len());
                    topics.push(topic);
                    continue;
                };
                let first = &topics[existing];
                if !first.conflicts_with(&topic) {
                    continue;
                }
                match policy {
                    TopicConflictPolicy::FirstWins => warn!(
                        topic = %topic.name,
                        source,
                        kept_type = %first.type_name,
                        ignored_type = %topic.type_name,
                        "conflicting topic declaration ignored"
                    ),
                    TopicConflictPolicy::Reject => {
                        return Err(MergeError::TopicConflict {
                            name: topic.name,
                            first_type: first.type_name.clone(),
                            first_format: first.serialization_format.clone(),
                            other_type: topic.type_name,
                            other_format: topic.serialization_format,
                        })
                    }
                }
            }
        }

        Ok(Self { topics })
    }

    pub fn topics(&self) -> &[TopicMetadata] {
        &self.topics
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TopicMetadata> {
        self.topics.iter()
    }

    pub fn get(&self, name: &str) -> Option<&TopicMetadata> {
        self.topics.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

impl<'a> IntoIterator for &'a TopicCatalog {
    type Item = &'a TopicMetadata;
    type IntoIter = std::slice::Iter<'a, TopicMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
