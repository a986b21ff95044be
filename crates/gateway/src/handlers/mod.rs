//! API handlers module
//!
//! Reads take `AuthContext`, writes on reference data and flights take
//! `Admin`, so authentication and role checks run before the body is read.

pub mod airplane_types;
pub mod airplanes;
pub mod airports;
pub mod countries;
pub mod crew;
pub mod flights;
pub mod health;
pub mod orders;
pub mod routes;
