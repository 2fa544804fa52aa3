use std::time::Instant;

use chrono::Utc;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{AddressDetails, Order, OrderItem, OrderStatus};
use crate::notify::{order_placed_message, EmailMessage};
use crate::state::{AppState, Pricing};

#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_id: Option<Uuid>,
    pub address: AddressDetails,
    pub items: Vec<OrderItem>,
}

/// A catalog line chosen by the shopper; everything else about the product
/// is snapshotted from the catalog at this moment.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRef {
    pub product_id: Uuid,
    pub quantity: u32,
}

pub fn snapshot_items(state: &AppState, refs: &[ItemRef]) -> Result<Vec<OrderItem>, AppError> {
    refs.iter()
        .map(|item| {
            if item.quantity == 0 {
                return Err(AppError::Validation(format!(
                    "zero quantity for product {}",
                    item.product_id
                )));
            }

            let product = state.products.get(&item.product_id).ok_or_else(|| {
                AppError::Validation(format!("unknown product {}", item.product_id))
            })?;

            Ok(OrderItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity: item.quantity,
                unit: product.unit.clone(),
                image_ref: product.image.clone(),
            })
        })
        .collect()
}

/// Creates a `Pending` order. The order-placed email to the store admin is
/// awaited first: until it has gone out the order does not exist anywhere,
/// so a failed checkout leaves nothing behind for an admin to assign, and
/// the customer's manual retry starts clean.
pub async fn place_order(state: &AppState, input: CheckoutInput) -> Result<Order, AppError> {
    validate(&input)?;

    let total_amount = compute_total(&input.items, state.pricing);

    let order = Order {
        id: Uuid::new_v4(),
        customer_name: input.customer_name,
        customer_email: input.customer_email,
        customer_id: input.customer_id,
        address_details: input.address,
        items: input.items,
        total_amount,
        status: OrderStatus::Pending,
        delivery_agent_id: None,
        created_at: Utc::now(),
    };

    send_order_placed(state, &order).await?;

    state.orders.insert(order.id, order.clone());
    state.metrics.orders_placed_total.inc();
    info!(order_id = %order.id, total_amount, "order placed");

    Ok(order)
}

/// subtotal + tax + flat delivery fee, rounded to 2 decimals and fixed for
/// the life of the order.
pub fn compute_total(items: &[OrderItem], pricing: Pricing) -> f64 {
    let subtotal: f64 = items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum();
    let tax = round2(subtotal * pricing.tax_rate);

    round2(subtotal + tax + pricing.delivery_fee)
}

fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn validate(input: &CheckoutInput) -> Result<(), AppError> {
    if input.customer_name.trim().is_empty() {
        return Err(AppError::Validation("customer name is required".to_string()));
    }

    if !input.customer_email.contains('@') {
        return Err(AppError::Validation(format!(
            "invalid customer email: {}",
            input.customer_email
        )));
    }

    if input.items.is_empty() {
        return Err(AppError::Validation("order has no items".to_string()));
    }

    for item in &input.items {
        if item.quantity == 0 {
            return Err(AppError::Validation(format!(
                "zero quantity for {}",
                item.name
            )));
        }
        if item.unit_price < 0.0 {
            return Err(AppError::Validation(format!(
                "negative price for {}",
                item.name
            )));
        }
    }

    validate_address(&input.address)
}

fn validate_address(address: &AddressDetails) -> Result<(), AppError> {
    let required = [
        ("first name", &address.first_name),
        ("last name", &address.last_name),
        ("phone", &address.phone),
        ("full address", &address.full_address),
        ("city", &address.city),
        ("pincode", &address.pincode),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }

    Ok(())
}

async fn send_order_placed(state: &AppState, order: &Order) -> Result<(), AppError> {
    let message = order_placed_message(&state.admin_email, order);

    match send_with_timeout(state, message.clone()).await {
        Ok(()) => Ok(()),
        Err(first_err) => {
            warn!(
                order_id = %order.id,
                error = %first_err,
                "order confirmation email failed, retrying once"
            );
            send_with_timeout(state, message).await
        }
    }
}

async fn send_with_timeout(state: &AppState, message: EmailMessage) -> Result<(), AppError> {
    let template = message.template;

    let start = Instant::now();
    let result = match timeout(state.email_timeout, state.mailer.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(AppError::ExternalService(
            "email provider timed out".to_string(),
        )),
    };

    let outcome = if result.is_ok() { "success" } else { "error" };
    state
        .metrics
        .email_send_seconds
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());
    state
        .metrics
        .notifications_total
        .with_label_values(&[template, outcome])
        .inc();

    result
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{compute_total, round2};
    use crate::models::order::OrderItem;
    use crate::state::Pricing;

    fn item(price: f64, quantity: u32) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            name: "test-item".to_string(),
            unit_price: price,
            quantity,
            unit: "pcs".to_string(),
            image_ref: None,
        }
    }

    const PRICING: Pricing = Pricing {
        tax_rate: 0.05,
        delivery_fee: 40.0,
    };

    #[test]
    fn subtotal_1000_totals_1090() {
        // 1000 subtotal, 50 tax, 40 delivery fee
        let total = compute_total(&[item(100.0, 10)], PRICING);
        assert_eq!(total, 1090.0);
    }

    #[test]
    fn total_is_rounded_to_two_decimals() {
        // subtotal 99.99, tax 5.00 (rounded from 4.9995), fee 40
        let total = compute_total(&[item(33.33, 3)], PRICING);
        assert_eq!(total, 144.99);
    }

    #[test]
    fn empty_items_total_is_just_the_fee() {
        let total = compute_total(&[], PRICING);
        assert_eq!(total, 40.0);
    }

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(2.346), 2.35);
    }
}
