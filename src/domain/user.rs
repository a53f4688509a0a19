//! Registered users of the alerting service.

/// A user as the store hands it back. The broker token is an opaque
/// credential passed through to the snapshot source, never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub channel_id: String,
    pub broker_token: String,
}
