//! Asynchronous client for the ArangoDB HTTP API.
//!
//! # Overview
//! Resource clients (collections, databases, documents, graphs, cursors)
//! turn typed calls into HTTP requests and typed answers or failures. They
//! all share one pipeline:
//!
//! - [`transport::Transport`] sends requests; [`transport::HttpApiTransport`]
//!   is the `reqwest` implementation and [`transport::MockTransport`] a
//!   scripted test double.
//! - [`serialization`] encodes bodies and decodes answers under an explicit
//!   per-call [`serialization::Convention`].
//! - [`query`] renders option structs as query strings.
//! - [`pipeline`] runs the send / classify / decode sequence.
//!
//! # Design
//! - The transport is bound to one database and one set of credentials at
//!   construction and holds nothing mutable afterwards.
//! - Non-2xx answers are data at the transport level and become
//!   [`ClientError::Api`] in the pipeline. Transport, decode and argument
//!   failures each have their own variant.
//! - Nothing is retried or cached.

pub mod client;
pub mod collection;
pub mod config;
pub mod cursor;
pub mod database;
pub mod document;
pub mod error;
pub mod graph;
pub mod http;
pub mod pipeline;
pub mod query;
pub mod serialization;
pub mod transport;

pub use client::ArangoClient;
pub use config::ConnectionConfig;
pub use error::{ApiError, ClientError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use serialization::{Convention, FieldCase, NullHandling, UnknownFields};
pub use transport::{HttpApiTransport, MockTransport, Transport};
