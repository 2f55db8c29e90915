//! Subcommand implementations.

pub(crate) mod records;
pub(crate) mod stats;
pub(crate) mod wipe;

use clap::ValueEnum;
use ratchet_store::collections::Collection;
use ratchet_store::{IdPolicy, Namespace, ProtocolStore};

/// Record kinds addressable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum RecordKind {
    /// Identity keys of remote and local addresses.
    Identity,
    /// Ratchet sessions.
    Session,
    /// One-time pre-keys.
    PreKey,
    /// Signed pre-keys.
    SignedPreKey,
    /// Queued unprocessed messages.
    Unprocessed,
    /// Configuration items.
    Item,
    /// Conversations.
    Conversation,
}

impl RecordKind {
    /// Every kind, in display order.
    pub(crate) const ALL: [Self; 7] = [
        Self::Identity,
        Self::Session,
        Self::PreKey,
        Self::SignedPreKey,
        Self::Unprocessed,
        Self::Item,
        Self::Conversation,
    ];

    pub(crate) fn namespace(self) -> Namespace {
        match self {
            Self::Identity => Namespace::IDENTITY_KEY,
            Self::Session => Namespace::SESSION,
            Self::PreKey => Namespace::PRE_KEY,
            Self::SignedPreKey => Namespace::SIGNED_PRE_KEY,
            Self::Unprocessed => Namespace::UNPROCESSED,
            Self::Item => Namespace::ITEM,
            Self::Conversation => Namespace::CONVERSATION,
        }
    }

    pub(crate) fn id_policy(self) -> IdPolicy {
        match self {
            Self::PreKey | Self::SignedPreKey => IdPolicy::Numeric,
            _ => IdPolicy::Opaque,
        }
    }

    /// Name as typed on the command line.
    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Session => "session",
            Self::PreKey => "pre-key",
            Self::SignedPreKey => "signed-pre-key",
            Self::Unprocessed => "unprocessed",
            Self::Item => "item",
            Self::Conversation => "conversation",
        }
    }

    /// The collection of this kind inside `store`.
    pub(crate) fn collection(self, store: &ProtocolStore) -> Collection {
        Collection::new(store.records().clone(), self.namespace(), self.id_policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_cover_every_namespace() {
        let namespaces: Vec<Namespace> = RecordKind::ALL.iter().map(|k| k.namespace()).collect();
        for ns in Namespace::ALL {
            assert!(namespaces.contains(&ns), "no kind for {ns}");
        }
    }

    #[test]
    fn test_pre_keys_are_numeric() {
        assert_eq!(RecordKind::PreKey.id_policy(), IdPolicy::Numeric);
        assert_eq!(RecordKind::SignedPreKey.id_policy(), IdPolicy::Numeric);
        assert_eq!(RecordKind::Session.id_policy(), IdPolicy::Opaque);
    }
}
