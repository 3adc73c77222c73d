use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kind::EntityKind;
use crate::temporal::Timestamp;

/// A value managed by a content-addressed repository.
///
/// Identity is the caller-assigned [`Entity::id`]; the content identifier is
/// derived by the store on every write and never lives on the entity itself.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Partial update merged over an existing value by `update()`.
    ///
    /// Patches have no id field, so an entity id cannot change.
    type Patch: Send;

    /// Which index table and cache namespace this entity lives in.
    const KIND: EntityKind;

    /// Logical identifier, stable across rewrites.
    fn id(&self) -> &str;

    /// Sort key for listings; larger means more recent.
    fn recency(&self) -> Timestamp;

    /// Shallow-merge `patch` into `self`.
    fn apply(&mut self, patch: Self::Patch);
}
