pub mod auth;
pub mod budgets;
pub mod categories;
pub mod health;
pub mod transactions;
pub mod users;

use axum::{Json, extract::rejection::JsonRejection};
use serde_json::Value;

use crate::{error::Result, validation::Payload};

/// Request body as extracted by axum, kept raw until the allow-list check.
pub type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

/// Turns a raw JSON body into a [`Payload`] restricted to `allowed` keys.
pub(crate) fn payload(body: JsonBody, allowed: &[&str]) -> Result<Payload> {
    let Json(value) = body?;
    Payload::from_json(value, allowed)
}

pub use auth::*;
pub use budgets::*;
pub use categories::*;
pub use health::*;
pub use transactions::*;
pub use users::*;
