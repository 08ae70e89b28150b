//! Typed client core for the story-schematics service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for every
//! beats-sheet, logline and story-plan operation of the service. Bodies are
//! validated against the schemas in `bindings` on the way out and on the way
//! back; non-2xx statuses become one of five typed error kinds.
//!
//! # Design
//! - `StorySchematicsClient` is stateless: it holds only a `ClientConfig`.
//!   Each operation is split into `build_*` and `parse_*` so the I/O boundary
//!   stays explicit and testable without a network.
//! - `StorySchematicsApi` joins the two halves over an `HttpTransport`
//!   (blocking `ureq` by default).
//! - Status handling is declarative: `status::Operation` lists the statuses
//!   each operation recognizes; everything else non-2xx is `Internal`.

pub mod api;
pub mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod status;

pub use api::StorySchematicsApi;
pub use client::StorySchematicsClient;
pub use config::{init, ClientConfig, InitProps, QueryParams};
pub use error::{error_response_message, ApiError, ConfigError, ErrorKind, SchemaError, TransportError};
pub use headers::{with_auth_headers, with_default_headers};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ResponseBody, UreqTransport};
pub use status::Operation;
