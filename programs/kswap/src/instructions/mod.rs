pub mod activate;
pub mod add_liquidity;
pub mod callers;
pub mod governance;
pub mod initialize_controller;
pub mod initialize_pool;
pub mod k_table;
pub mod price_feed;
pub mod query_oracle;
pub mod remove_liquidity;
pub mod swap;

pub use activate::*;
pub use add_liquidity::*;
pub use callers::*;
pub use governance::*;
pub use initialize_controller::*;
pub use initialize_pool::*;
pub use k_table::*;
pub use price_feed::*;
pub use query_oracle::*;
pub use remove_liquidity::*;
pub use swap::*;
