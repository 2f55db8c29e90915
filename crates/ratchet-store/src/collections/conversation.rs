use super::record_collection;
use crate::namespace::{IdPolicy, Namespace};

record_collection! {
    /// Conversation metadata.
    Conversations, Namespace::CONVERSATION, IdPolicy::Opaque
}
