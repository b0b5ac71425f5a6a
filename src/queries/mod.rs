pub mod budgets;
pub mod categories;
pub mod sessions;
pub mod transactions;
pub mod users;
