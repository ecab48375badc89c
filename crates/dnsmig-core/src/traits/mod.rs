//! Core traits for the migration system
//!
//! This module defines the abstract interfaces that registrar implementations must follow.
//!
//! - [`Registrar`]: List domains and records, remove and add records
//! - [`RegistrarFactory`]: Build a registrar from configuration

pub mod registrar;

pub use registrar::{Registrar, RegistrarFactory};
