//! Test doubles for collection views.
//!
//! - **[`ScriptedSource`]**: a [`CollectionSource`](crate::view::CollectionSource)
//!   whose responses are released by the test, for exercising out-of-order and
//!   in-flight loads
//! - **[`RecordingHandler`]**: a bulk action handler that records its calls
//! - **[`Ticket`]**: a small record type with a ready-made schema
//!
//! ```rust,ignore
//! use ragdash::testkit::{ticket_schema, tickets, ScriptedSource};
//!
//! let source = ScriptedSource::new(tickets(25));
//! let reply = source.push_pending();
//! // ... start a load, mutate the view, then
//! reply.send(Ok(tickets(3))).ok();
//! ```

mod fixtures;
mod sources;

pub use fixtures::{ticket_schema, tickets, Ticket};
pub use sources::{RecordingHandler, ScriptedSource};
