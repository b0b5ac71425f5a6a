mod budgets;
mod transactions;
mod users;
