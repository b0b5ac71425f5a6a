pub mod budgets;
pub mod categories;
pub mod jwt;
pub mod ownership;
pub mod progress;
pub mod refresh_tokens;
pub mod sessions;
pub mod transactions;
pub mod users;
