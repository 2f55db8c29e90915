//! Test fixtures for protocol records.

use ratchet_store::collections::{ATTEMPTS_FIELD, CONVERSATION_ID_FIELD};
use ratchet_store::{FieldMap, Record, Value};

/// Length of a Curve25519 key.
pub const KEY_LEN: usize = 32;

/// Deterministic 32-byte key material covering the full byte range.
///
/// Different seeds give different keys; every key contains `0x00` and
/// `0xFF` so that encoding edge cases are always exercised.
#[must_use]
pub fn test_key_bytes(seed: u8) -> Vec<u8> {
    let mut key: Vec<u8> = (0..KEY_LEN)
        .map(|i| u8::try_from(i).unwrap_or(0).wrapping_mul(7).wrapping_add(seed))
        .collect();
    key[0] = 0x00;
    key[KEY_LEN - 1] = 0xFF;
    key
}

fn key_pair(seed: u8) -> Value {
    let mut pair = FieldMap::new();
    pair.insert("pubKey".to_owned(), Value::Bytes(test_key_bytes(seed)));
    pair.insert(
        "privKey".to_owned(),
        Value::Bytes(test_key_bytes(seed.wrapping_add(1))),
    );
    Value::Map(pair)
}

/// An identity key record for `address`.
#[must_use]
pub fn test_identity_key(address: &str) -> Record {
    Record::with_id(address)
        .with("publicKey", test_key_bytes(1))
        .with("firstUse", true)
        .with("timestamp", 1_700_000_000_000u64)
        .with("verified", 0u32)
        .with("nonblockingApproval", false)
}

/// The local identity key pair, stored as an identity record with both
/// halves.
#[must_use]
pub fn test_own_identity_key(address: &str) -> Record {
    test_identity_key(address).with("privateKey", test_key_bytes(2))
}

/// A one-time pre-key record with a nested key pair.
#[must_use]
pub fn test_pre_key(id: u32) -> Record {
    Record::with_id(id)
        .with("keyId", id)
        .with("keyPair", key_pair(3))
}

/// A signed pre-key record with a nested key pair and signature.
#[must_use]
pub fn test_signed_pre_key(id: u32) -> Record {
    Record::with_id(id)
        .with("keyId", id)
        .with("keyPair", key_pair(5))
        .with("signature", "c2lnbmF0dXJl")
        .with("confirmed", false)
        .with("created_at", 1_700_000_000_000u64)
}

/// A session record for `address.device` belonging to `conversation_id`.
#[must_use]
pub fn test_session(address: &str, device: u32, conversation_id: &str) -> Record {
    Record::with_id(format!("{address}.{device}"))
        .with("number", address)
        .with("deviceId", device)
        .with(CONVERSATION_ID_FIELD, conversation_id)
        .with("record", "{\"sessions\":{}}")
}

/// A queued message with no delivery attempts yet.
#[must_use]
pub fn test_unprocessed(id: &str) -> Record {
    Record::with_id(id)
        .with("version", 2u32)
        .with("envelope", "CiQIARIg")
        .with("timestamp", 1_700_000_000_000u64)
        .with(ATTEMPTS_FIELD, 0u32)
}

/// A configuration item.
#[must_use]
pub fn test_item(id: &str, value: impl Into<Value>) -> Record {
    Record::with_id(id).with("value", value)
}

/// A conversation record.
#[must_use]
pub fn test_conversation(id: &str) -> Record {
    Record::with_id(id)
        .with("type", "private")
        .with("active_at", 1_700_000_000_000u64)
        .with("unreadCount", 0u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bytes_cover_edges() {
        let key = test_key_bytes(9);
        assert_eq!(key.len(), KEY_LEN);
        assert_eq!(key[0], 0x00);
        assert_eq!(key[KEY_LEN - 1], 0xFF);
        assert_ne!(test_key_bytes(1), test_key_bytes(2));
    }

    #[test]
    fn test_session_id_includes_device() {
        let session = test_session("+15550001", 2, "conv-a");
        assert_eq!(session.get_str("id"), Some("+15550001.2"));
        assert_eq!(session.get_str(CONVERSATION_ID_FIELD), Some("conv-a"));
    }
}
