use sqlx::SqlitePool;
use uuid::Uuid;

use super::{
    menu_item::{CreateMenuItem, MenuItem},
    restaurant::{CreateRestaurant, Restaurant},
};
use crate::DBService;

pub async fn test_pool() -> SqlitePool {
    DBService::new_in_memory().await.unwrap().pool
}

pub async fn seed_restaurant(pool: &SqlitePool, name: &str) -> Restaurant {
    Restaurant::create(
        pool,
        Uuid::new_v4(),
        &CreateRestaurant {
            name: name.to_string(),
            location: None,
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
    category: &str,
    price: i64,
) -> MenuItem {
    MenuItem::create(
        pool,
        Uuid::new_v4(),
        &CreateMenuItem {
            restaurant_id,
            name: name.to_string(),
            description: None,
            category: category.to_string(),
            price,
            image_url: None,
            is_available: None,
        },
    )
    .await
    .unwrap()
}
