//! Fixtures shared by the unit tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::{
    config::CommerceConfig,
    implementation::order_lifecycle::{CheckoutRequest, OrderService},
    store::{Document, DocumentStore, InMemoryDocumentStore},
    types::{LineItem, Order, PaymentMethod, ProductId, SellerId, ShippingAddress, UserId},
};

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).single().expect("valid date")
}

pub fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

pub fn address() -> ShippingAddress {
    ShippingAddress::new("Rina", "081234567890", "Jl. Merdeka 1", "Bandung", "40111")
}

pub fn item(product: &str, seller: &str, price: u64, quantity: u32) -> LineItem {
    LineItem::new(ProductId::new(product), format!("Produk {product}"), price, quantity, SellerId::new(seller))
}

pub fn checkout(method: PaymentMethod, items: Vec<LineItem>) -> CheckoutRequest {
    let mut request = CheckoutRequest::new(UserId::new("buyer-1"), method, address());
    request.items = items;
    request
}

/// An unsaved order with a fixed id.
pub fn order(method: PaymentMethod, items: Vec<LineItem>) -> Order {
    let mut order = Order::place(checkout(method, items), 1500, fixed_time()).expect("valid order");
    order.id = crate::types::OrderId::new("order-1");
    order
}

pub fn seed_product(store: &InMemoryDocumentStore, id: &str, stock: u32) {
    store
        .insert("products", id, doc(json!({ "name": format!("Produk {id}"), "stock": stock, "sold": 0 })))
        .expect("seed product");
}

pub fn seed_variant_product(store: &InMemoryDocumentStore, id: &str, variants: &[(&str, u32)]) {
    let variants: Vec<Value> = variants
        .iter()
        .map(|(variant, stock)| json!({ "id": variant, "name": variant, "stock": stock }))
        .collect();
    store
        .insert("products", id, doc(json!({ "name": format!("Produk {id}"), "stock": 0, "sold": 0, "variants": variants })))
        .expect("seed product");
}

pub fn seed_user(store: &InMemoryDocumentStore, id: &str, value: Value) {
    store.insert("users", id, doc(value)).expect("seed user");
}

pub fn product_field(store: &InMemoryDocumentStore, id: &str, field: &str) -> Value {
    store.get("products", id).expect("get").expect("product exists").data[field].clone()
}

pub fn service() -> (InMemoryDocumentStore, OrderService) {
    service_with(CommerceConfig::default())
}

pub fn service_with(config: CommerceConfig) -> (InMemoryDocumentStore, OrderService) {
    let store = InMemoryDocumentStore::new();
    store.set_time(fixed_time());
    let service = OrderService::new(Arc::new(store.clone()), config);
    (store, service)
}
