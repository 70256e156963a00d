//! Resource facades for the FinWise API endpoints.
//!
//! Each facade builds a request for one endpoint group and hands it to the
//! shared transport. Facades are obtained from [`Client`](crate::Client) and
//! share its connection pool, retry policy and closed state.

mod account_balances;
mod accounts;
mod transaction_categories;
mod transactions;

pub use account_balances::{AccountBalances, AggregatedBalanceParams, ListAccountBalancesParams};
pub use accounts::Accounts;
pub use transaction_categories::{ListTransactionCategoriesParams, TransactionCategories};
pub use transactions::{AggregatedTransactionsParams, ListTransactionsParams, Transactions};
