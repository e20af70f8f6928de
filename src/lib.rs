//! publishable - scheduled visibility windows for stored records
//!
//! Models adopt the publishable behavior to gain two timestamp columns.
//! A standing scope hides every record outside its window unless a query
//! opts out with `with_not_published`.

pub mod cli;
pub mod clock;
pub mod config;
pub mod events;
pub mod executor;
pub mod model;
pub mod observability;
pub mod publishable;
pub mod query;
pub mod storage;
