//! Portfolio snapshot source port trait.

use crate::domain::error::LaddersimError;
use crate::domain::trigger::PositionSnapshot;
use crate::domain::user::User;

/// Supplies the live holdings a user's triggers are evaluated against.
/// Sourced externally (a brokerage client in production, files in tests).
pub trait SnapshotPort {
    fn positions_for_user(&self, user: &User) -> Result<Vec<PositionSnapshot>, LaddersimError>;
}
