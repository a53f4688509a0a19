//! Notification channel port trait.

use crate::domain::error::LaddersimError;
use crate::domain::user::User;

/// Delivery guarantees are the collaborator's concern; the core only
/// propagates failures.
pub trait NotifyPort {
    fn send(&self, user: &User, text: &str) -> Result<(), LaddersimError>;
}
