//! # airtable-api
//!
//! Typed client for the Airtable Web API with a built-in reliability layer.
//!
//! The crate is organized around four pieces:
//! - [`schema`]: field types, the options union, and the normalization rule
//!   applied before schema-mutating requests
//! - [`error`]: the closed error classification produced at the HTTP
//!   boundary ([`AirtableError::is_retryable`])
//! - [`retry`]: a generic [`with_retry`] executor with capped exponential
//!   backoff, jitter, and `Retry-After` override
//! - [`client`]: the [`AirtableClient`] itself, one method per endpoint
//!
//! ```rust,no_run
//! use airtable_api::AirtableClient;
//!
//! # async fn example() -> airtable_api::Result<()> {
//! let client = AirtableClient::builder()
//!     .api_key("pat-your-token")
//!     .build()?;
//!
//! for base in client.list_bases().await? {
//!     println!("{} ({})", base.name, base.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod schema;

pub use client::{AirtableClient, AirtableClientBuilder, AIRTABLE_API_URL};
pub use config::{ClientConfig, RetryConfig};
pub use error::{AirtableError, Result};
pub use retry::with_retry;
pub use schema::{
    Base, CreateTableRequest, DeletedRecord, Field, FieldOptions, FieldSpec, FieldType,
    FieldUpdate, Record, Table, UpdateTableRequest, View,
};
