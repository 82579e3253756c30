use db::{
    DBService,
    models::{
        menu_item::{CreateMenuItem, MenuItem},
        order::Order,
        order_item::{CreateOrderItem, OrderItem},
        restaurant::{CreateRestaurant, Restaurant},
        user::{CreateUser, User, UserRole},
    },
};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::auth::PasswordHash;

pub async fn test_pool() -> SqlitePool {
    DBService::new_in_memory().await.unwrap().pool
}

pub async fn seed_restaurant(pool: &SqlitePool, name: &str) -> Restaurant {
    Restaurant::create(
        pool,
        Uuid::new_v4(),
        &CreateRestaurant {
            name: name.to_string(),
            location: Some("Jl. Merdeka 1".to_string()),
            logo_url: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_menu_item(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    name: &str,
    price: i64,
) -> MenuItem {
    MenuItem::create(
        pool,
        Uuid::new_v4(),
        &CreateMenuItem {
            restaurant_id,
            name: name.to_string(),
            description: None,
            category: "Makanan".to_string(),
            price,
            image_url: None,
            is_available: None,
        },
    )
    .await
    .unwrap()
}

async fn seed_user(pool: &SqlitePool, email: &str, password: &str, role: UserRole) -> User {
    let hashed = PasswordHash::new(password);
    User::create(
        pool,
        Uuid::new_v4(),
        &CreateUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: hashed.hash,
            password_salt: hashed.salt,
            role,
            restaurant_id: None,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_admin(pool: &SqlitePool, email: &str, password: &str) -> User {
    seed_user(pool, email, password, UserRole::Admin).await
}

pub async fn seed_kasir(pool: &SqlitePool, email: &str, password: &str) -> User {
    seed_user(pool, email, password, UserRole::Kasir).await
}

/// Pending order with one line per `(menu item, quantity)`.
pub async fn seed_order(
    pool: &SqlitePool,
    restaurant_id: Uuid,
    lines: &[(&MenuItem, i32)],
) -> Order {
    let order = Order::create(pool, Uuid::new_v4(), restaurant_id, Some("7"))
        .await
        .unwrap();
    for (item, quantity) in lines {
        OrderItem::create(
            pool,
            order.id,
            &CreateOrderItem {
                menu_item_id: item.id,
                name_snapshot: item.name.clone(),
                price_snapshot: item.price,
                quantity: *quantity,
            },
        )
        .await
        .unwrap();
    }
    order
}
