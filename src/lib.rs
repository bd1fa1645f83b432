//! CRM core for insurance sales teams.
//!
//! Domain types, ownership-hierarchy scoping, entity ↔ row mapping, a
//! generic CRUD synchronizer against the hosted Entity Store, funnel
//! metrics, the UDI projection calculator, and the administrative HTTP
//! surface. Row-level security at the store is the security boundary;
//! everything here fails closed and never panics on remote failure.

pub mod admin;
pub mod error;
pub mod rates;
pub mod scope;
pub mod services;
pub mod store;
pub mod sync;
pub mod types;
pub mod udi;
pub mod util;
