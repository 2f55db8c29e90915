//! Wipe the whole store.

use ratchet_store::ProtocolStore;
use tracing::warn;

use crate::theme::{Outcome, Theme};

/// Remove every entry in the backend. Refuses without `yes`.
pub(crate) async fn run(store: &ProtocolStore, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("refusing to wipe the store without --yes");
    }
    let removed = store.remove_all().await?;
    warn!(removed, "wiped record store");
    println!("{}", Theme::outcome(Outcome::Done, &format!("Wiped {removed} entries")));
    Ok(())
}

#[cfg(test)]
mod tests {
    use ratchet_test::prelude::*;

    use super::*;

    #[tokio::test]
    async fn test_wipe_requires_confirmation() {
        let store = ProtocolStore::in_memory();
        store.items().create_or_update(&test_item("a", 1u32)).await.unwrap();

        assert!(run(&store, false).await.is_err());
        assert!(store.items().get_by_id("a").await.unwrap().is_some());

        run(&store, true).await.unwrap();
        assert!(store.items().get_by_id("a").await.unwrap().is_none());
    }
}
