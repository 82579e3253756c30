//! Customer-facing read side of restaurants and their menus.

use db::models::{
    menu_item::{MenuFilter, MenuItem},
    restaurant::Restaurant,
};
use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

/// Category value meaning "no filter".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("restaurant not found")]
    RestaurantNotFound,
}

/// Maps the `category` query value to a filter. Empty and `all` (any case) select everything.
pub fn category_filter(category: Option<&str>) -> Option<&str> {
    category
        .map(str::trim)
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case(ALL_CATEGORIES))
}

pub struct CatalogService;

impl CatalogService {
    pub async fn list_restaurants(pool: &SqlitePool) -> Result<Vec<Restaurant>, CatalogError> {
        Ok(Restaurant::find_all(pool).await?)
    }

    pub async fn get_restaurant(pool: &SqlitePool, id: Uuid) -> Result<Restaurant, CatalogError> {
        Restaurant::find_by_id(pool, id)
            .await?
            .ok_or(CatalogError::RestaurantNotFound)
    }

    /// Available items of a restaurant, sorted by category then name.
    pub async fn list_menu(
        pool: &SqlitePool,
        restaurant_id: Uuid,
        category: Option<&str>,
    ) -> Result<Vec<MenuItem>, CatalogError> {
        Self::get_restaurant(pool, restaurant_id).await?;
        let filter = MenuFilter {
            available_only: true,
            category: category_filter(category),
        };
        Ok(MenuItem::find_by_restaurant(pool, restaurant_id, &filter).await?)
    }

    pub async fn list_categories(
        pool: &SqlitePool,
        restaurant_id: Uuid,
    ) -> Result<Vec<String>, CatalogError> {
        Self::get_restaurant(pool, restaurant_id).await?;
        Ok(MenuItem::categories(pool, restaurant_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use db::models::menu_item::UpdateMenuItem;

    use super::*;
    use crate::services::test_support::{seed_menu_item, seed_restaurant, test_pool};

    #[test]
    fn test_category_filter() {
        assert_eq!(category_filter(None), None);
        assert_eq!(category_filter(Some("")), None);
        assert_eq!(category_filter(Some("All")), None);
        assert_eq!(category_filter(Some(" Minuman ")), Some("Minuman"));
    }

    #[tokio::test]
    async fn test_menu_hides_unavailable_items() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let soto = seed_menu_item(&pool, resto.id, "Soto Ayam", 20_000).await;
        MenuItem::update(
            &pool,
            soto.id,
            &UpdateMenuItem {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let menu = CatalogService::list_menu(&pool, resto.id, Some("all"))
            .await
            .unwrap();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].id, nasi.id);

        let none = CatalogService::list_menu(&pool, resto.id, Some("Minuman"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_restaurant() {
        let pool = test_pool().await;
        assert!(matches!(
            CatalogService::list_categories(&pool, Uuid::new_v4()).await,
            Err(CatalogError::RestaurantNotFound)
        ));
    }
}
