//! Report sink port trait.

use crate::domain::error::LaddersimError;
use crate::domain::simulation::SimulationResult;

/// Port for writing the human-readable simulation summary.
pub trait ReportPort {
    fn write(&self, result: &SimulationResult) -> Result<(), LaddersimError>;
}
