//! PH24 Cloud API client
//!
//! Thin asynchronous wrapper around the PH24 REST API (`/v1/cloud/...` and
//! `/v1/vps/...`). Every call returns a normalized [`ApiResponse`]:
//!
//! - transport failure: `code == 0`, [`Payload::Transport`] with the error text
//! - JSON body: `code` is the HTTP status, [`Payload::Json`]
//! - anything else: `code` is the HTTP status, [`Payload::Malformed`] with the
//!   exact body text
//!
//! No retries, no caching, no timeouts beyond the transport defaults.
//!
//! # Example
//!
//! ```ignore
//! use ph24_api::{Ph24Client, Server};
//!
//! let client = Ph24Client::new("ph24_xxx", None)?;
//! let response = client.server("project-id", "server-id").await;
//! if response.is_success() {
//!     let server: Server = response.parse().unwrap_or_default();
//!     println!("{:?}", server.status);
//! }
//! ```

pub mod action;
pub mod client;
pub mod error;
pub mod models;
pub mod response;

pub use action::ServerAction;
pub use client::{API_KEY_HEADER, DEFAULT_API_URL, Ph24Client};
pub use error::{ApiError, Result};
pub use models::{
    AvailabilityZone, CreateServerRequest, Firewall, Flavor, FlavorMeta, Image, Network, Project,
    Resource, Server, ServerActionRequest, UpdateServerRequest,
};
pub use response::{ApiResponse, Payload};
pub use reqwest::Url;
