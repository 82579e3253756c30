//! Turns a stored cart into a pending order in one transaction.

use std::collections::HashMap;

use db::models::{
    cart::StoredCart,
    menu_item::MenuItem,
    order::{Order, OrderStatus},
    order_item::{CreateOrderItem, OrderItem},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::{
    cart::{Cart, CartError, CartService},
    order_events::{OrderEvents, OrderStatusEvent},
    orders::{order_total, qr_payload},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("cart is empty")]
    EmptyCart,
    #[error("table number is required")]
    MissingTableNumber,
    #[error("menu item no longer exists: {0}")]
    MenuItemGone(Uuid),
    #[error("menu item is not available: {0}")]
    ItemUnavailable(String),
    #[error("menu item belongs to another restaurant: {0}")]
    ForeignItem(String),
}

/// What the order will be created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan {
    pub restaurant_id: Uuid,
    pub table_number: String,
    pub items: Vec<CreateOrderItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub qr_payload: String,
    pub restaurant_id: Uuid,
    pub table_number: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub total_price: i64,
}

/// Validates `cart` against the current menu. Snapshots take the menu's name and price.
pub fn plan(cart: &Cart, menu: &HashMap<Uuid, MenuItem>) -> Result<OrderPlan, CheckoutError> {
    let restaurant_id = match cart.restaurant_id {
        Some(id) if !cart.is_empty() => id,
        _ => return Err(CheckoutError::EmptyCart),
    };
    let table_number = cart
        .table_number
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(CheckoutError::MissingTableNumber)?
        .to_string();

    let items = cart
        .items
        .iter()
        .map(|line| {
            let item = menu
                .get(&line.menu_item_id)
                .ok_or(CheckoutError::MenuItemGone(line.menu_item_id))?;
            if item.restaurant_id != restaurant_id {
                return Err(CheckoutError::ForeignItem(item.name.clone()));
            }
            if !item.is_available {
                return Err(CheckoutError::ItemUnavailable(item.name.clone()));
            }
            Ok(CreateOrderItem {
                menu_item_id: item.id,
                name_snapshot: item.name.clone(),
                price_snapshot: item.price,
                quantity: line.quantity,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OrderPlan {
        restaurant_id,
        table_number,
        items,
    })
}

pub struct CheckoutService;

impl CheckoutService {
    pub async fn checkout(
        pool: &SqlitePool,
        events: &OrderEvents,
        cart_id: Uuid,
    ) -> Result<PlacedOrder, CheckoutError> {
        let cart = CartService::load(pool, cart_id).await?;

        let mut menu = HashMap::with_capacity(cart.items.len());
        for line in &cart.items {
            if let Some(item) = MenuItem::find_by_id(pool, line.menu_item_id).await? {
                menu.insert(item.id, item);
            }
        }
        let plan = plan(&cart, &menu)?;

        let mut tx = pool.begin().await?;
        let order = Order::create(
            &mut *tx,
            Uuid::new_v4(),
            plan.restaurant_id,
            Some(&plan.table_number),
        )
        .await?;
        let mut items = Vec::with_capacity(plan.items.len());
        for data in &plan.items {
            items.push(OrderItem::create(&mut *tx, order.id, data).await?);
        }
        StoredCart::delete(&mut *tx, cart.id).await?;
        tx.commit().await?;

        let total_price = order_total(&items);
        info!(
            order_id = %order.id,
            restaurant_id = %order.restaurant_id,
            items = items.len(),
            total_price,
            "Order placed"
        );
        events.publish(OrderStatusEvent::now(order.id, order.status));

        Ok(PlacedOrder {
            order_id: order.id,
            qr_payload: qr_payload(order.id),
            restaurant_id: order.restaurant_id,
            table_number: order.table_number,
            status: order.status,
            items,
            total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use db::models::menu_item::UpdateMenuItem;

    use super::*;
    use crate::services::test_support::{seed_menu_item, seed_restaurant, test_pool};

    #[tokio::test]
    async fn test_checkout_creates_order_and_clears_cart() {
        let pool = test_pool().await;
        let events = OrderEvents::new(8);
        let mut rx = events.subscribe();
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let teh = seed_menu_item(&pool, resto.id, "Es Teh", 5_000).await;

        let cart = CartService::create(&pool).await.unwrap();
        CartService::add_item(&pool, cart.id, nasi.id).await.unwrap();
        CartService::add_item(&pool, cart.id, teh.id).await.unwrap();
        CartService::update_quantity(&pool, cart.id, teh.id, 2)
            .await
            .unwrap();
        CartService::set_table(&pool, cart.id, "5").await.unwrap();

        let placed = CheckoutService::checkout(&pool, &events, cart.id)
            .await
            .unwrap();
        assert_eq!(placed.total_price, 35_000);
        assert_eq!(placed.status, OrderStatus::Pending);
        assert_eq!(placed.qr_payload, placed.order_id.to_string());
        assert_eq!(placed.table_number.as_deref(), Some("5"));

        let stored = OrderItem::find_by_order_id(&pool, placed.order_id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 2);
        assert!(StoredCart::find_by_id(&pool, cart.id).await.unwrap().is_none());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.order_id, placed.order_id);
        assert_eq!(event.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_checkout_snapshots_current_price() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let cart = CartService::create(&pool).await.unwrap();
        CartService::add_item(&pool, cart.id, nasi.id).await.unwrap();
        CartService::set_table(&pool, cart.id, "1").await.unwrap();

        MenuItem::update(
            &pool,
            nasi.id,
            &UpdateMenuItem {
                price: Some(27_000),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let placed = CheckoutService::checkout(&pool, &OrderEvents::default(), cart.id)
            .await
            .unwrap();
        assert_eq!(placed.items[0].price_snapshot, 27_000);
        assert_eq!(placed.total_price, 27_000);
    }

    #[tokio::test]
    async fn test_checkout_rejects_unavailable_item_and_keeps_cart() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let cart = CartService::create(&pool).await.unwrap();
        CartService::add_item(&pool, cart.id, nasi.id).await.unwrap();
        CartService::set_table(&pool, cart.id, "1").await.unwrap();
        MenuItem::update(
            &pool,
            nasi.id,
            &UpdateMenuItem {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = CheckoutService::checkout(&pool, &OrderEvents::default(), cart.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::ItemUnavailable(_)));
        assert_eq!(Order::count(&pool).await.unwrap(), 0);
        assert!(!CartService::load(&pool, cart.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_preconditions() {
        let pool = test_pool().await;
        let events = OrderEvents::default();
        let empty = CartService::create(&pool).await.unwrap();
        assert!(matches!(
            CheckoutService::checkout(&pool, &events, empty.id).await,
            Err(CheckoutError::EmptyCart)
        ));

        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        CartService::add_item(&pool, empty.id, nasi.id).await.unwrap();
        assert!(matches!(
            CheckoutService::checkout(&pool, &events, empty.id).await,
            Err(CheckoutError::MissingTableNumber)
        ));
    }

    #[tokio::test]
    async fn test_checkout_with_deleted_menu_item() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let cart = CartService::create(&pool).await.unwrap();
        CartService::add_item(&pool, cart.id, nasi.id).await.unwrap();
        CartService::set_table(&pool, cart.id, "2").await.unwrap();
        MenuItem::delete(&pool, nasi.id).await.unwrap();

        assert!(matches!(
            CheckoutService::checkout(&pool, &OrderEvents::default(), cart.id).await,
            Err(CheckoutError::MenuItemGone(id)) if id == nasi.id
        ));
    }
}
