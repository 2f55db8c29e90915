use super::record_collection;
use crate::namespace::{IdPolicy, Namespace};

record_collection! {
    /// Opaque configuration items (registration id, local identity key
    /// pair, settings).
    Items, Namespace::ITEM, IdPolicy::Opaque
}
