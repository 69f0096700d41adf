//! Constraint-model construction: variables, hard constraints, elective
//! synchronization, soft penalties, and pre-solve diagnostics.

pub mod builder;
pub mod context;
pub mod diagnostics;

pub use builder::{build_model, TimetableModel};
pub use context::{AssignKey, Assignment, ElectiveMaster, Interner, SlotKey, Sym};
pub use diagnostics::DiagnosticsReport;
