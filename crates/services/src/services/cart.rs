//! Customer cart: a small reducer over lines keyed by menu item, persisted per client cart id.

use db::models::{cart::StoredCart, menu_item::MenuItem};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;
use utils::money::{line_amount, sum_amounts};
use uuid::Uuid;

/// Largest quantity of one line.
pub const MAX_QUANTITY: i32 = 999;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to encode cart: {0}")]
    Json(#[from] serde_json::Error),
    #[error("menu item not found: {0}")]
    MenuItemNotFound(Uuid),
    #[error("menu item is not available: {0}")]
    ItemUnavailable(String),
    #[error("item not in cart: {0}")]
    ItemNotInCart(Uuid),
    #[error("quantity must be between 1 and {MAX_QUANTITY}, got {0}")]
    InvalidQuantity(i32),
    #[error("table number must not be empty")]
    InvalidTableNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct CartItem {
    pub menu_item_id: Uuid,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> i64 {
        line_amount(self.price, self.quantity)
    }
}

/// Lines keep insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Cart {
    pub id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub table_number: Option<String>,
    pub items: Vec<CartItem>,
}

/// Cart plus derived totals, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CartView {
    #[serde(flatten)]
    pub cart: Cart,
    pub total_price: i64,
    pub total_quantity: i64,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let total_price = cart.total_price();
        let total_quantity = cart.total_quantity();
        Self {
            cart,
            total_price,
            total_quantity,
        }
    }
}

impl Cart {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            restaurant_id: None,
            table_number: None,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn line_mut(&mut self, menu_item_id: Uuid) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|line| line.menu_item_id == menu_item_id)
    }

    /// Adds one unit of `item`. A cart bound to another restaurant starts over.
    pub fn add_item(&mut self, item: &MenuItem) -> Result<(), CartError> {
        if !item.is_available {
            return Err(CartError::ItemUnavailable(item.name.clone()));
        }
        if self.restaurant_id.is_some_and(|id| id != item.restaurant_id) {
            debug!(cart_id = %self.id, restaurant_id = %item.restaurant_id, "Cart switched restaurant, resetting");
            self.clear();
        }
        self.restaurant_id = Some(item.restaurant_id);

        match self.line_mut(item.id) {
            Some(line) if line.quantity >= MAX_QUANTITY => {
                return Err(CartError::InvalidQuantity(line.quantity.saturating_add(1)));
            }
            Some(line) => line.quantity += 1,
            None => self.items.push(CartItem {
                menu_item_id: item.id,
                name: item.name.clone(),
                price: item.price,
                quantity: 1,
                image_url: item.image_url.clone(),
            }),
        }
        Ok(())
    }

    pub fn update_quantity(&mut self, menu_item_id: Uuid, quantity: i32) -> Result<(), CartError> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let line = self
            .line_mut(menu_item_id)
            .ok_or(CartError::ItemNotInCart(menu_item_id))?;
        line.quantity = quantity;
        Ok(())
    }

    /// Removes a line. Emptying the cart releases its restaurant.
    pub fn remove_item(&mut self, menu_item_id: Uuid) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|line| line.menu_item_id != menu_item_id);
        if self.items.len() == before {
            return Err(CartError::ItemNotInCart(menu_item_id));
        }
        if self.items.is_empty() {
            self.restaurant_id = None;
        }
        Ok(())
    }

    pub fn set_table(&mut self, table_number: &str) -> Result<(), CartError> {
        let table_number = table_number.trim();
        if table_number.is_empty() {
            return Err(CartError::InvalidTableNumber);
        }
        self.table_number = Some(table_number.to_string());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.restaurant_id = None;
        self.table_number = None;
    }

    pub fn total_price(&self) -> i64 {
        sum_amounts(self.items.iter().map(CartItem::line_total))
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|line| i64::from(line.quantity)).sum()
    }

    fn from_stored(stored: StoredCart) -> Self {
        let items = serde_json::from_str(&stored.items).unwrap_or_else(|e| {
            warn!(cart_id = %stored.id, error = %e, "Discarding unreadable cart contents");
            Vec::new()
        });
        let mut cart = Self {
            id: stored.id,
            restaurant_id: stored.restaurant_id,
            table_number: stored.table_number,
            items,
        };
        if cart.items.is_empty() {
            cart.restaurant_id = None;
        }
        cart
    }
}

pub struct CartService;

impl CartService {
    pub async fn create(pool: &SqlitePool) -> Result<Cart, CartError> {
        Self::save(pool, &Cart::new(Uuid::new_v4())).await
    }

    /// Stored cart, or a fresh empty one carrying `id` when nothing is stored yet.
    pub async fn load<'e, E>(executor: E, id: Uuid) -> Result<Cart, CartError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        Ok(StoredCart::find_by_id(executor, id)
            .await?
            .map(Cart::from_stored)
            .unwrap_or_else(|| Cart::new(id)))
    }

    pub async fn save<'e, E>(executor: E, cart: &Cart) -> Result<Cart, CartError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let items = serde_json::to_string(&cart.items)?;
        let stored = StoredCart::upsert(
            executor,
            cart.id,
            cart.restaurant_id,
            cart.table_number.as_deref(),
            &items,
        )
        .await?;
        Ok(Cart::from_stored(stored))
    }

    async fn modify<F>(pool: &SqlitePool, id: Uuid, change: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError>,
    {
        let mut tx = pool.begin().await?;
        // Take the write lock before reading so concurrent edits serialize.
        StoredCart::touch(&mut *tx, id).await?;
        let mut cart = Self::load(&mut *tx, id).await?;
        change(&mut cart)?;
        let saved = Self::save(&mut *tx, &cart).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn add_item(
        pool: &SqlitePool,
        id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<Cart, CartError> {
        let item = MenuItem::find_by_id(pool, menu_item_id)
            .await?
            .ok_or(CartError::MenuItemNotFound(menu_item_id))?;
        Self::modify(pool, id, |cart| cart.add_item(&item)).await
    }

    pub async fn update_quantity(
        pool: &SqlitePool,
        id: Uuid,
        menu_item_id: Uuid,
        quantity: i32,
    ) -> Result<Cart, CartError> {
        Self::modify(pool, id, |cart| cart.update_quantity(menu_item_id, quantity)).await
    }

    pub async fn remove_item(
        pool: &SqlitePool,
        id: Uuid,
        menu_item_id: Uuid,
    ) -> Result<Cart, CartError> {
        Self::modify(pool, id, |cart| cart.remove_item(menu_item_id)).await
    }

    pub async fn set_table(
        pool: &SqlitePool,
        id: Uuid,
        table_number: &str,
    ) -> Result<Cart, CartError> {
        Self::modify(pool, id, |cart| cart.set_table(table_number)).await
    }

    pub async fn clear(pool: &SqlitePool, id: Uuid) -> Result<(), CartError> {
        StoredCart::delete(pool, id).await?;
        Ok(())
    }
}
