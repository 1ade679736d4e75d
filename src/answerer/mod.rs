//! Answering chat queries through the library backend.
//!
//! This module provides the `QueryService` which sends a query to the answer
//! backend with bounded retries and renders the reply, with its citation
//! markers turned into links, for the chat.

mod formatter;
mod query_service;

pub(crate) use formatter::escape_html;
pub use formatter::format_answer;
pub use query_service::{QueryError, QueryService};
