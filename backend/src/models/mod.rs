//! Domain records for the clinic front desk.
//!
//! Records are plain data: they carry no persistence or validation logic.
//! Validated inputs (`New*` and `*Changes`) are produced by
//! [`crate::validation`] and consumed by the repositories.

pub mod appointment;
pub mod doctor;
pub mod ids;
pub mod macros;
pub mod patient;
pub mod queue;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use ids::*;
pub use patient::*;
pub use queue::*;
pub use user::*;
