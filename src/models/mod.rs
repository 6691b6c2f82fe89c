//! Wire models and REST operations for the Rosalution API

pub mod analyses;
pub mod annotations;
pub mod authentication;
pub mod status;
