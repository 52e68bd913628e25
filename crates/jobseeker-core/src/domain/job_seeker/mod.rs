//! Job seeker domain module
//!
//! Contains the job seeker entity, the store trait with its derived
//! queries, the store policies, and the registration service.

pub mod entity;
pub mod repository;
pub mod service;
pub mod value_object;

pub use entity::*;
pub use repository::*;
pub use service::*;
pub use value_object::*;
