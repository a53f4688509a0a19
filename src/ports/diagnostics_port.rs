//! Diagnostics sink port trait.
//!
//! The simulator and the alert cycle narrate skips, opens, closes and
//! deposits through this sink instead of printing ambiently; callers inject
//! whichever implementation suits the run.

pub trait DiagnosticsPort {
    fn note(&self, message: &str);
}
