//! Cart service.
//!
//! One slot per user (`cart_user_<id>`). Guests have no cart; the routes
//! require a logged-in user.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, instrument};

use inmind_core::{ProductId, UserId};

use crate::catalog::Product;
use crate::models::cart::{
    CartItem, CartSummary, MAX_LINE_QUANTITY, cart_item_count, cart_total,
};
use crate::services::validation::ValidationError;
use crate::storage::{SlotStore, StorageError, keys};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Cart service.
pub struct CartService<'a> {
    store: &'a SlotStore,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(store: &'a SlotStore) -> Self {
        Self { store }
    }

    /// Cart lines in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn items(&self, user: UserId) -> Result<Vec<CartItem>, CartError> {
        Ok(self.store.load(&keys::cart(user)).await?)
    }

    /// Add a product. An existing line has its quantity increased, up to
    /// `MAX_LINE_QUANTITY`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` for a zero quantity and
    /// `CartError::Validation` above `MAX_LINE_QUANTITY`.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(
        &self,
        user: UserId,
        product: Product,
        quantity: u32,
    ) -> Result<Vec<CartItem>, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        check_max(i64::from(quantity))?;

        let items = self
            .store
            .update(&keys::cart(user), |items: &mut Vec<CartItem>| {
                if let Some(line) = items.iter_mut().find(|i| i.product_id() == product.id) {
                    line.quantity = line
                        .quantity
                        .saturating_add(quantity)
                        .min(MAX_LINE_QUANTITY);
                } else {
                    items.push(CartItem { product, quantity });
                }
                items.clone()
            })
            .await?;

        debug!(lines = items.len(), "Added to cart");
        Ok(items)
    }

    /// Set a line's quantity. Zero or less removes the line; an unknown
    /// product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` above `MAX_LINE_QUANTITY`, or an
    /// error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Vec<CartItem>, CartError> {
        check_max(quantity)?;
        let items = self
            .store
            .update(&keys::cart(user), |items: &mut Vec<CartItem>| {
                if quantity <= 0 {
                    items.retain(|i| i.product_id() != product_id);
                } else if let Some(line) = items.iter_mut().find(|i| i.product_id() == product_id) {
                    line.quantity = u32::try_from(quantity).unwrap_or(MAX_LINE_QUANTITY);
                }
                items.clone()
            })
            .await?;
        Ok(items)
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be updated.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        user: UserId,
        product_id: ProductId,
    ) -> Result<Vec<CartItem>, CartError> {
        let items = self
            .store
            .update(&keys::cart(user), |items: &mut Vec<CartItem>| {
                items.retain(|i| i.product_id() != product_id);
                items.clone()
            })
            .await?;
        Ok(items)
    }

    /// Empty the cart. The empty list is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub async fn clear(&self, user: UserId) -> Result<(), CartError> {
        self.store
            .save(&keys::cart(user), &Vec::<CartItem>::new())
            .await?;
        Ok(())
    }

    /// Sum of price times quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn total(&self, user: UserId) -> Result<Decimal, CartError> {
        Ok(cart_total(&self.items(user).await?))
    }

    /// Sum of quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn item_count(&self, user: UserId) -> Result<u64, CartError> {
        Ok(cart_item_count(&self.items(user).await?))
    }

    /// Whether the product has a line in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn contains(&self, user: UserId, product_id: ProductId) -> Result<bool, CartError> {
        Ok(self.quantity_of(user, product_id).await? > 0)
    }

    /// Quantity of a product in the cart, 0 when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn quantity_of(&self, user: UserId, product_id: ProductId) -> Result<u32, CartError> {
        Ok(self
            .items(user)
            .await?
            .iter()
            .find(|i| i.product_id() == product_id)
            .map_or(0, |i| i.quantity))
    }

    /// Item count and total for the header badge.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub async fn summary(&self, user: UserId) -> Result<CartSummary, CartError> {
        let items = self.items(user).await?;
        Ok(CartSummary {
            user_id: user,
            item_count: cart_item_count(&items),
            total: cart_total(&items),
        })
    }
}

fn check_max(quantity: i64) -> Result<(), ValidationError> {
    if quantity > i64::from(MAX_LINE_QUANTITY) {
        return Err(ValidationError::field(
            "quantity",
            format!("must be at most {MAX_LINE_QUANTITY}"),
        ));
    }
    Ok(())
}
