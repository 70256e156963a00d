//! # FinWise - A client for the FinWise financial-data API
//!
//! `finwise` is an async client built on top of `reqwest`. It authenticates
//! every request, retries transient failures with exponential backoff, maps
//! error responses to typed errors and decodes paginated lists.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use finwise::models::TransactionCreateRequest;
//! use finwise::resources::ListTransactionsParams;
//! use finwise::Client;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), finwise::Error> {
//!     // Reads FINWISE_API_KEY from the environment
//!     let client = Client::from_env()?;
//!
//!     let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//!     let txn = client
//!         .transactions()
//!         .create(
//!             &TransactionCreateRequest::new("acc_123", Decimal::new(-5000, 2), date)
//!                 .description("Grocery shopping"),
//!         )
//!         .await?;
//!     println!("Recorded {} on {}", txn.amount, txn.transaction_date);
//!
//!     let page = client
//!         .transactions()
//!         .list(ListTransactionsParams::default().account_id("acc_123"))
//!         .await?;
//!     println!("{} of {} transactions", page.len(), page.total_count());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed models** - Decimal money values (never floats) and `chrono` dates
//! - **Typed errors** - One [`Error`] variant per failure class, with the HTTP status, server message and request id
//! - **Retries** - Rate limits, 5xx responses, connection failures and timeouts are retried; `Retry-After` is honoured
//! - **Pagination** - [`Page`] carries the items and consistent page metadata
//! - **Logging** - Structured `tracing` events at debug level
//! - **Shared client** - Clones share one connection pool; [`Client::close`] releases it
//!
//! ## Error Handling
//!
//! ```no_run
//! use finwise::{Client, Error};
//!
//! # async fn example(client: Client) -> Result<(), Error> {
//! match client.accounts().retrieve("acc_123").await {
//!     Ok(account) => println!("{}: {:?}", account.name, account.current_balance),
//!     Err(Error::RateLimited { retry_after, .. }) => {
//!         eprintln!("Still rate limited after retries, server asked for {:?}", retry_after);
//!     }
//!     Err(Error::Deserialization { raw_response, message, status }) => {
//!         eprintln!("Unexpected body (status {}): {}", status, message);
//!         eprintln!("  Raw response: {}", raw_response);
//!     }
//!     Err(e) => {
//!         eprintln!("Request {:?} failed: {}", e.request_id(), e);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```no_run
//! use finwise::{Client, RetryPolicy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), finwise::Error> {
//! let client = Client::builder()
//!     .api_key("sk_live_...")
//!     .timeout(Duration::from_secs(10))
//!     .retry_policy(
//!         RetryPolicy::default()
//!             .with_max_retries(5)
//!             .with_max_delay(Duration::from_secs(30)),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod models;
pub mod pagination;
mod rate_limit;
mod request;
pub mod resources;
pub mod retry;
mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{ApiKey, ClientConfig};
pub use error::{ApiError, Error, Result};
pub use pagination::{Page, PageParams};
pub use request::ApiRequest;
pub use retry::RetryPolicy;
