//! Per-kind record commands: list, get, remove, clear.

use ratchet_store::ProtocolStore;

use super::RecordKind;
use crate::formatter::{OutputFormat, print_record, print_records};
use crate::theme::{Outcome, Theme};

/// List every record of `kind`.
pub(crate) async fn list(
    store: &ProtocolStore,
    kind: RecordKind,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let collection = kind.collection(store);
    let mut entries = store.records().entries(collection.namespace()).await?;
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    if entries.is_empty() && format == OutputFormat::Pretty {
        println!("{}", Theme::outcome(Outcome::Empty, &format!("No {} records", kind.name())));
        return Ok(());
    }
    if format == OutputFormat::Pretty {
        println!(
            "\n{}",
            Theme::section(&format!("{} ({})", kind.name(), entries.len()))
        );
    }
    print_records(format, &entries);
    Ok(())
}

/// Show one record.
pub(crate) async fn get(
    store: &ProtocolStore,
    kind: RecordKind,
    id: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let collection = kind.collection(store);
    let id = collection.id_policy().normalize(id.into())?;
    match collection.get(id.clone()).await? {
        Some(record) => print_record(format, &id, &record),
        None => anyhow::bail!("no {} record with id '{id}'", kind.name()),
    }
    Ok(())
}

/// Remove one record. Missing records are reported, not treated as errors.
pub(crate) async fn remove(store: &ProtocolStore, kind: RecordKind, id: &str) -> anyhow::Result<()> {
    if kind.collection(store).remove(id).await? {
        println!("{}", Theme::outcome(Outcome::Done, &format!("Removed {} '{id}'", kind.name())));
    } else {
        println!("{}", Theme::outcome(Outcome::Missing, &format!("No {} '{id}'", kind.name())));
    }
    Ok(())
}

/// Remove every record of `kind`.
pub(crate) async fn clear(store: &ProtocolStore, kind: RecordKind) -> anyhow::Result<()> {
    let removed = kind.collection(store).clear().await?;
    println!(
        "{}",
        Theme::outcome(Outcome::Done, &format!("Removed {removed} {} record(s)", kind.name()))
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use ratchet_store::Record;

    use super::*;

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = ProtocolStore::in_memory();
        store
            .pre_keys()
            .bulk_add(&[Record::with_id(1u32), Record::with_id(2u32)])
            .await
            .unwrap();

        remove(&store, RecordKind::PreKey, "01").await.unwrap();
        assert!(store.pre_keys().get_by_id(1u32).await.unwrap().is_none());

        clear(&store, RecordKind::PreKey).await.unwrap();
        assert!(store.pre_keys().get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_is_error() {
        let store = ProtocolStore::in_memory();
        assert!(get(&store, RecordKind::Item, "nope", OutputFormat::Json).await.is_err());
    }

    #[tokio::test]
    async fn test_get_rejects_non_numeric_pre_key_id() {
        let store = ProtocolStore::in_memory();
        assert!(get(&store, RecordKind::PreKey, "abc", OutputFormat::Json).await.is_err());
    }
}
