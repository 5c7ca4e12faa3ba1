//! Conversation renderer for the Chef AI recipe API.
//!
//! [`Conversation`] owns the session's chat entries and drives one
//! submission at a time through a [`RecipeBoundary`]; [`render`] turns
//! entries into terminal text.

pub mod boundary;
pub mod conversation;
pub mod render;

pub use boundary::{BoundaryReply, ClientError, HttpRecipeBoundary, RecipeBoundary};
pub use conversation::{ChatEntry, Conversation, EntryId, PendingSubmission, Phase};
