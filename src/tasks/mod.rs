//! The task pages and everything behind them.
//!
//! - [`normalize`]: pure conversions: query → list parameters, form input →
//!   API payload, API payload → view model
//! - [`client`]: the remote task REST API
//! - [`views`]: HTML rendering
//! - `routes`: the handlers tying them together

pub mod client;
mod error;
pub mod model;
pub mod normalize;
mod routes;
pub mod views;

pub use client::TaskApi;
pub use error::TaskError;
pub use model::{Task, TaskListQuery, TaskListView, TaskPage, TaskPayload};
pub use routes::routes;
