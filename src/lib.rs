//! `command-query` routes strongly-typed [Query] and [Command] requests
//! to the data source they are handled against.
//!
//! Callers only know the abstract request: the [Dispatcher] looks up the
//! concrete data source through a [Resolver], and runs the request handler
//! against it, optionally through a [Retry] capability configured once at
//! construction.
//!
//! ```text
//! caller → Dispatcher::get/execute → Resolver → [Retry] → handler(source)
//! ```

#![deny(unsafe_code, unused_qualifications, trivial_casts)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]

pub mod command;
pub mod dispatcher;
pub mod query;
pub mod resolver;
pub mod retry;

pub use {
    command::Command,
    dispatcher::{ConfigurationError, Dispatcher, Error},
    query::Query,
    resolver::{DataSourceId, Registry, ResolutionError, Resolver},
    retry::Retry,
};
