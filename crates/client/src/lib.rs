//! Encore Client Library
//!
//! HTTP transport for the Encore backend. It resolves endpoint paths against
//! the configured base address, attaches the bearer token from a
//! [`TokenStore`], unwraps the `{success, data, error}` envelope, and turns
//! every failure into an [`ApiError`] of a known [`ErrorKind`].
//!
//! A 401 from any call evicts the stored token before the error is returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use encore_client::{Client, ConnectionInfo, MemoryTokenStore};
//! use encore_primitives::api::FriendApi;
//! use encore_primitives::id::UserId;
//!
//! # async fn run() -> eyre::Result<()> {
//! let connection = ConnectionInfo::new(
//!     "https://api.encore.test/v1/".parse()?,
//!     std::time::Duration::from_secs(15),
//!     MemoryTokenStore::new(),
//! )?;
//! let client = Client::new(connection);
//!
//! let friends = client.list_friends(&UserId::from("u1")).await?;
//! println!("{} friends", friends.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod storage;

pub use client::Client;
pub use connection::ConnectionInfo;
pub use encore_primitives::api::TokenStore;
pub use encore_primitives::error::{ApiError, ErrorKind};
pub use storage::MemoryTokenStore;
pub use url::Url;
