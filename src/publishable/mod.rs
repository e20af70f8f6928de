//! Publishable behavior
//!
//! Gives a model a scheduled visibility window held in two timestamp
//! columns. A record is visible at `now` iff
//!
//! ```text
//! published_at IS NOT NULL AND published_at <= now
//!     AND (expired_at IS NULL OR expired_at > now)
//! ```
//!
//! # Pieces
//!
//! - [`Publishable`]: the behavior adopted at model registration
//! - [`PublishedScope`]: the standing query filter it registers
//! - [`PublishableQueryExt::with_not_published`]: per-query bypass
//! - [`Publisher`]: `publish` / `expire` with lifecycle events
//!
//! # Example
//!
//! ```ignore
//! let registry = ModelRegistry::new();
//! let articles = registry.register(
//!     ModelDefinition::new("article")
//!         .with_table("articles")
//!         .with_behavior(Publishable::new()),
//! )?;
//!
//! events.publishing("article", |record| record.get("title").is_some());
//! publisher.publish(&articles, &mut record, None)?;
//!
//! let visible = executor.fetch(&*store, &Query::new("articles"), &articles)?;
//! let everything = executor.fetch(&*store, &Query::new("articles").with_not_published(), &articles)?;
//! ```

mod behavior;
mod columns;
mod errors;
mod publisher;
mod scope;
mod window;

pub use behavior::Publishable;
pub use columns::{PublishableColumns, DEFAULT_EXPIRED_AT, DEFAULT_PUBLISHED_AT};
pub use errors::{PublishError, PublishResult};
pub use publisher::{PublishableEvents, Publisher};
pub use scope::{PublishableQueryExt, PublishedScope};
pub use window::{VisibilityState, VisibilityWindow};
