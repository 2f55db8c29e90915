//! Record counts per kind.

use colored::Colorize;
use ratchet_store::ProtocolStore;
use serde_json::json;

use super::RecordKind;
use crate::formatter::OutputFormat;
use crate::theme::Theme;

/// Count of each kind plus backend keys outside every known namespace.
pub(crate) async fn collect(store: &ProtocolStore) -> anyhow::Result<(Vec<(RecordKind, u64)>, u64)> {
    let mut counts = Vec::with_capacity(RecordKind::ALL.len());
    let mut known: u64 = 0;
    for kind in RecordKind::ALL {
        let count = kind.collection(store).count().await?;
        known = known.saturating_add(count);
        counts.push((kind, count));
    }
    let total = store.records().backend().keys().await?.len() as u64;
    Ok((counts, total.saturating_sub(known)))
}

/// Print record counts.
pub(crate) async fn run(store: &ProtocolStore, format: OutputFormat) -> anyhow::Result<()> {
    let (counts, other) = collect(store).await?;

    match format {
        OutputFormat::Json => {
            let mut obj = serde_json::Map::new();
            for (kind, count) in &counts {
                obj.insert(kind.name().to_owned(), json!(count));
            }
            obj.insert("other".to_owned(), json!(other));
            println!("{}", serde_json::Value::Object(obj));
        },
        OutputFormat::Pretty => {
            println!("\n{}", Theme::section("Record Store"));
            println!("{:<16} {:>8}", "KIND".dimmed(), "COUNT".dimmed());
            for (kind, count) in &counts {
                println!("{:<16} {count:>8}", kind.name());
            }
            if other > 0 {
                println!("{:<16} {other:>8}", "other".dimmed());
            }
            println!();
        },
    }
    Ok(())
}
