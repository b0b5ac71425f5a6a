#![allow(dead_code)]

pub mod database;
pub mod test_app;

pub use database::TestDb;
pub use helpers::*;
pub use test_app::{TestApp, TestAppOptions};
