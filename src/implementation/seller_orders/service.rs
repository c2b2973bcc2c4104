//! Seller projector and listing.

use std::sync::Arc;

use tracing::debug;

use super::{
    BuyerSnapshot, SellerOrderItem, SellerOrderService, SellerOrderSummary, SellerOrderView,
    SellerStatus,
};
use crate::{
    config::CommerceConfig,
    errors::CommerceResult,
    implementation::{
        lookup::LookupCache,
        status_projection::{derive_stage, status_presentation},
    },
    store::DocumentStore,
    types::{Order, PaymentMethod, SellerId, document::decode_listing},
};

/// Projects an order for one seller.
///
/// Returns `None` when the seller has no items in the order. Product and
/// buyer fields come from the snapshots embedded in the order.
#[must_use]
pub fn project_seller_order(order: &Order, seller_id: &SellerId) -> Option<SellerOrderView> {
    let items: Vec<SellerOrderItem> = order
        .items_for_seller(seller_id)
        .map(|item| SellerOrderItem {
            product_id:       item.product_id.clone(),
            name:             item.name.clone(),
            image:            item.image.clone(),
            category:         item.category.clone(),
            price:            item.price,
            quantity:         item.quantity,
            line_total:       item.line_total(),
            selected_variant: item.selected_variant.clone(),
        })
        .collect();

    if items.is_empty() {
        return None;
    }

    let status = SellerStatus::from_stage(&derive_stage(order));
    // COD orders keep their own wording; transfer orders are labelled by the seller status
    let presentation = if order.is_cod() {
        status_presentation(order.status.as_str())
    } else {
        status_presentation(status.as_str())
    };

    let payout = order
        .seller_transfer_data
        .as_ref()
        .and_then(|data| data.payouts.get(seller_id))
        .cloned();

    Some(SellerOrderView {
        order_id: order.id.clone(),
        order_number: order.order_number.clone(),
        payment_method: order.payment_method(),
        status,
        raw_status: order.status.as_str().to_string(),
        status_label: presentation.label,
        status_color: presentation.color,
        status_icon: presentation.icon,
        subtotal: items.iter().map(|i| i.line_total).sum(),
        item_count: items.iter().map(|i| i.quantity).sum(),
        items,
        buyer: BuyerSnapshot {
            user_id: order.user_id.clone(),
            name:    order.shipping_address.recipient.clone(),
            phone:   Some(order.shipping_address.phone.clone()).filter(|p| !p.is_empty()),
            avatar:  None,
        },
        shipping_address: order.shipping_address.clone(),
        tracking_number: order.tracking_number.clone(),
        courier_whatsapp: order.courier_whatsapp.clone(),
        payout,
        created_at: order.created_at,
        updated_at: order.updated_at,
    })
}

impl SellerOrderService {
    /// Creates a seller order service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, config: CommerceConfig) -> Self {
        Self { store, config }
    }

    /// Every order containing the seller's items, newest first, enriched
    /// with live product and buyer details.
    pub fn list_seller_orders(&self, seller_id: &SellerId) -> CommerceResult<Vec<SellerOrderView>> {
        let mut views: Vec<SellerOrderView> = self
            .load_orders()?
            .iter()
            .filter_map(|order| project_seller_order(order, seller_id))
            .collect();

        let mut cache = LookupCache::new(self.store.as_ref(), &self.config.collections);
        for view in &mut views {
            enrich(view, &mut cache);
        }

        views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(seller_id = %seller_id, orders = views.len(), "Seller orders listed");
        Ok(views)
    }

    /// Status counters and revenue for one seller. No lookups are made.
    pub fn seller_summary(&self, seller_id: &SellerId) -> CommerceResult<SellerOrderSummary> {
        let mut summary = SellerOrderSummary::default();

        for view in self.load_orders()?.iter().filter_map(|o| project_seller_order(o, seller_id)) {
            summary.total_orders += 1;
            *summary.by_status.entry(view.status.as_str().to_string()).or_insert(0) += 1;

            if view.status.is_fulfilled() {
                summary.revenue += view.subtotal;
            }

            let cod_to_accept = view.payment_method == PaymentMethod::Cod
                && view.status == SellerStatus::PendingVerification;
            if cod_to_accept || view.status == SellerStatus::Processing {
                summary.awaiting_action += 1;
            }
        }

        Ok(summary)
    }

    fn load_orders(&self) -> CommerceResult<Vec<Order>> {
        let docs = self.store.query(&self.config.collections.orders, &[])?;
        Ok(decode_listing(docs))
    }
}

fn enrich(view: &mut SellerOrderView, cache: &mut LookupCache<'_>) {
    for item in &mut view.items {
        if let Some(product) = cache.product(item.product_id.as_str()) {
            if !product.name.trim().is_empty() {
                item.name.clone_from(&product.name);
            }
            if product.image.is_some() {
                item.image.clone_from(&product.image);
            }
            if product.category.is_some() {
                item.category.clone_from(&product.category);
            }
        }
    }

    if let Some(profile) = cache.user(view.buyer.user_id.as_str()) {
        if let Some(name) = profile.display_name() {
            view.buyer.name = name.to_string();
        }
        if profile.phone.is_some() {
            view.buyer.phone.clone_from(&profile.phone);
        }
        view.buyer.avatar.clone_from(&profile.avatar);
    }
}
