//! Order engine services and read models

pub mod actions;
pub mod inventory_adjustment;
pub mod lookup;
pub mod order_lifecycle;
pub mod seller_orders;
pub mod status_projection;
pub mod transactions;

pub use actions::StorefrontActions;
pub use order_lifecycle::OrderService;
pub use seller_orders::SellerOrderService;
pub use transactions::TransactionService;
