use super::record_collection;
use crate::namespace::{IdPolicy, Namespace};

record_collection! {
    /// Identity keys of the local user and of every remote party, keyed by
    /// an opaque address string. Key bytes live in `publicKey` and
    /// `privateKey`.
    IdentityKeys, Namespace::IDENTITY_KEY, IdPolicy::Opaque
}
