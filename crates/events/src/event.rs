use chrono::{DateTime, Utc};

/// A recorded fact about an aggregate.
///
/// Events are never edited once appended to a stream. Consumers key on
/// `event_type` plus `version` to read the payload.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Namespaced name, `<module>.<aggregate>.<what_happened>`.
    fn event_type(&self) -> &'static str;

    /// Payload schema version.
    fn version(&self) -> u32;

    /// Business time of the change.
    fn occurred_at(&self) -> DateTime<Utc>;
}
