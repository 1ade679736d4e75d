/// Answer-backend HTTP client module.
///
/// This module provides a blocking HTTP client for the library "ask" endpoint,
/// the wire types it exchanges, and its error taxonomy.
mod client;
mod types;

pub use client::{
    AskClient, AskClientBuilder, AskClientTrait, BackendError, DEFAULT_ASK_ENDPOINT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use types::{AnswerResponse, AskRequest, Document};
