pub mod caller;
pub mod controller;
pub mod k_info;
pub mod k_table;
pub mod pool;
pub mod price_feed;

pub use caller::*;
pub use controller::*;
pub use k_info::*;
pub use k_table::*;
pub use pool::*;
pub use price_feed::*;
