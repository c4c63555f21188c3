//! Checkout service.
//!
//! Turns the user's cart into an order: validates shipping and card input,
//! takes stock for tracked products, stores the order and empties the cart.
//! No payment is processed; only the card's last four digits and network
//! are kept.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument};

use inmind_core::{CardExpiry, CardNumber, Cvv, OrderId, OrderStatus, ProductId, round_money};

use crate::config::ShopConfig;
use crate::models::cart::{CartItem, cart_item_count, cart_total};
use crate::models::order::{NewOrder, OrderItem, OrderPaymentMethod, ShippingAddress};
use crate::models::user::User;
use crate::services::cart::{CartError, CartService};
use crate::services::inventory::{InventoryError, InventoryService};
use crate::services::orders::{OrderError, OrderService};
use crate::services::validation::{ValidationError, Validator};
use crate::storage::SlotStore;

/// Days from order to estimated delivery.
const DELIVERY_DAYS: i64 = 3;

/// Shipping form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Payment form. Never logged.
#[derive(Clone, Default, Deserialize)]
pub struct PaymentInfo {
    pub card_number: String,
    pub card_name: String,
    /// `MM/YY`
    pub expiry_date: String,
    pub cvv: String,
}

impl fmt::Debug for PaymentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentInfo")
            .field("card_name", &self.card_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
}

/// A cart line that cannot be fulfilled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockShortage {
    pub product_id: ProductId,
    pub title: String,
    pub available: u32,
    pub requested: u32,
}

/// What the confirmation page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub order_date: DateTime<Utc>,
    pub customer_name: String,
    pub email: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub item_count: u64,
    pub payment_method: OrderPaymentMethod,
    pub shipping_address: ShippingAddress,
    pub estimated_delivery: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Errors from checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Some items are not available in the requested quantity")]
    OutOfStock(Vec<StockShortage>),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

/// Validated card details, reduced to what an order keeps.
struct ParsedCard {
    number: CardNumber,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    store: &'a SlotStore,
    shop: &'a ShopConfig,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore, shop: &'a ShopConfig) -> Self {
        Self { store, shop }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// Tracked products must have enough stock; every short line is reported
    /// together and nothing changes. Untracked products are unlimited.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` for bad form input,
    /// `CheckoutError::EmptyCart`, or `CheckoutError::OutOfStock`.
    #[instrument(skip(self, user, request), fields(user_id = %user.id))]
    pub async fn place_order(
        &self,
        user: &User,
        request: CheckoutRequest,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let card = validate(&request)?;

        let carts = CartService::new(self.store);
        let items = carts.items(user.id).await?;
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let inventory = InventoryService::new(self.store, self.shop.low_stock_threshold);
        let lines: Vec<(ProductId, u32)> = items
            .iter()
            .map(|item| (item.product_id(), item.quantity))
            .collect();
        if let Err(errors) = inventory.reduce_lines(&lines, true).await {
            return Err(shortage_error(errors, &items));
        }

        let subtotal = round_money(cart_total(&items));
        let tax = round_money(subtotal * self.shop.tax_rate);
        let total = round_money(subtotal + tax);

        let shipping = request.shipping;
        let customer_name = format!(
            "{} {}",
            shipping.first_name.trim(),
            shipping.last_name.trim()
        );
        let payment_method = OrderPaymentMethod {
            card_last4: card.number.last4().to_string(),
            card_type: card.number.card_type(),
        };
        let shipping_address = ShippingAddress {
            address: shipping.address.trim().to_string(),
            city: shipping.city.trim().to_string(),
            state: shipping.state.trim().to_string(),
            zip_code: shipping.zip_code.trim().to_string(),
            country: shipping.country.trim().to_string(),
        };
        let order_items: Vec<OrderItem> = items.iter().map(order_item).collect();

        let new_order = NewOrder {
            customer_name,
            email: user.email.to_string(),
            total,
            date: None,
            status: OrderStatus::Processing,
            shipping_address,
            payment_method,
            items: order_items,
        };

        let order = match OrderService::new(self.store).add(new_order).await {
            Ok(order) => order,
            Err(e) => {
                error!(error = %e, "Failed to store order, restoring stock");
                for (product_id, quantity) in lines {
                    if let Err(restore) = inventory.restore_stock(product_id, quantity).await {
                        error!(error = %restore, %product_id, "Failed to restore stock");
                    }
                }
                return Err(e.into());
            }
        };

        carts.clear(user.id).await?;
        info!(order_id = %order.id, %total, "Order placed");

        Ok(OrderConfirmation {
            order_id: order.id,
            order_date: order.date,
            customer_name: order.customer_name,
            email: order.email,
            subtotal,
            tax,
            total,
            item_count: cart_item_count(&items),
            payment_method: order.payment_method,
            shipping_address: order.shipping_address,
            estimated_delivery: order.date + Duration::days(DELIVERY_DAYS),
            items: order.items,
        })
    }
}

fn order_item(item: &CartItem) -> OrderItem {
    OrderItem {
        product_id: item.product_id(),
        name: item.product.title.clone(),
        quantity: item.quantity,
        price: item.product.price,
        image: item.product.image.clone(),
    }
}

fn shortage_error(errors: Vec<InventoryError>, items: &[CartItem]) -> CheckoutError {
    let mut shortages = Vec::new();
    for error in errors {
        match error {
            InventoryError::InsufficientStock {
                product_id,
                available,
                requested,
            } => shortages.push(StockShortage {
                product_id,
                title: items
                    .iter()
                    .find(|i| i.product_id() == product_id)
                    .map(|i| i.product.title.clone())
                    .unwrap_or_default(),
                available,
                requested,
            }),
            other => return CheckoutError::Inventory(other),
        }
    }
    CheckoutError::OutOfStock(shortages)
}

/// Validate both forms, collecting every failing field.
fn validate(request: &CheckoutRequest) -> Result<ParsedCard, ValidationError> {
    let shipping = &request.shipping;
    let payment = &request.payment;

    let mut v = Validator::new();
    v.required("first_name", &shipping.first_name)
        .required("last_name", &shipping.last_name)
        .required("phone", &shipping.phone)
        .required("address", &shipping.address)
        .required("city", &shipping.city)
        .required("state", &shipping.state)
        .required("zip_code", &shipping.zip_code)
        .required("country", &shipping.country)
        .required("card_name", &payment.card_name);
    v.email("email", &shipping.email);

    let number = CardNumber::parse(&payment.card_number)
        .map_err(|e| v.fail("card_number", e.to_string()))
        .ok();
    if let Err(e) = CardExpiry::parse(&payment.expiry_date) {
        v.fail("expiry_date", e.to_string());
    }
    if let Err(e) = Cvv::parse(&payment.cvv) {
        v.fail("cvv", e.to_string());
    }
    v.finish()?;

    number
        .map(|number| ParsedCard { number })
        .ok_or_else(|| ValidationError::field("card_number", "is invalid"))
}
