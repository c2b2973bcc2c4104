//! Type definitions for the storefront order engine

pub mod catalog;
pub mod document;
pub mod order;
pub mod profile;

pub use catalog::{Product, ProductId, ProductVariant};
pub use document::StoredRecord;
pub use order::{
    AdminVerificationStatus, CodStatus, GeoPoint, LineItem, Order, OrderAction,
    OrderHistoryEvent, OrderId, OrderStatus, PaymentMethod, PaymentStatus, SelectedVariant,
    SellerId, SellerPayout, SellerTransferData, SellerTransferStatus, ShippingAddress,
    StockReduction, TransferStatus, TransferVerificationStatus, UserId,
};
pub use profile::{BankAccount, UserProfile};
