//! Admin back office: restaurants, menu items and cashier accounts.

use db::{
    is_foreign_key_violation, is_unique_violation,
    models::{
        menu_item::{CreateMenuItem, MenuFilter, MenuItem, UpdateMenuItem},
        order::Order,
        restaurant::{CreateRestaurant, Restaurant, UpdateRestaurant},
        sales_log::SalesLog,
        user::{CashierWithRestaurant, CreateUser, UpdateUser, User, UserRole},
    },
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::auth::{AuthError, PasswordHash, normalize_email, validate_password};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("restaurant not found")]
    RestaurantNotFound,
    #[error("menu item not found")]
    MenuItemNotFound,
    #[error("cashier not found")]
    CashierNotFound,
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("restaurant has {0} order(s) on record and cannot be deleted")]
    RestaurantHasOrders(i64),
    #[error("cashier has {0} sale(s) on record and cannot be deleted")]
    CashierHasSales(i64),
}

impl From<AuthError> for AdminError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => AdminError::Database(e),
            AuthError::EmailTaken(email) => AdminError::EmailTaken(email),
            other => AdminError::Validation(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCashier {
    pub name: String,
    pub email: String,
    pub password: String,
    pub restaurant_id: Option<Uuid>,
}

/// `password` replaces the stored one when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateCashier {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub restaurant_id: Option<Uuid>,
}

fn required(field: &str, value: &str) -> Result<String, AdminError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AdminError::Validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn optional_required(field: &str, value: Option<&str>) -> Result<Option<String>, AdminError> {
    value.map(|v| required(field, v)).transpose()
}

fn validate_price(price: i64) -> Result<(), AdminError> {
    if price < 0 {
        return Err(AdminError::Validation("price must not be negative".to_string()));
    }
    Ok(())
}

fn email_conflict(email: &str) -> impl FnOnce(sqlx::Error) -> AdminError + '_ {
    move |e| {
        if is_unique_violation(&e) {
            AdminError::EmailTaken(email.to_string())
        } else {
            AdminError::Database(e)
        }
    }
}

pub struct AdminService;

impl AdminService {
    // Restaurants

    pub async fn get_restaurant(pool: &SqlitePool, id: Uuid) -> Result<Restaurant, AdminError> {
        Restaurant::find_by_id(pool, id)
            .await?
            .ok_or(AdminError::RestaurantNotFound)
    }

    pub async fn create_restaurant(
        pool: &SqlitePool,
        data: &CreateRestaurant,
    ) -> Result<Restaurant, AdminError> {
        let data = CreateRestaurant {
            name: required("name", &data.name)?,
            location: data.location.clone(),
            logo_url: data.logo_url.clone(),
        };
        let restaurant = Restaurant::create(pool, Uuid::new_v4(), &data).await?;
        info!(restaurant_id = %restaurant.id, name = %restaurant.name, "Restaurant created");
        Ok(restaurant)
    }

    pub async fn update_restaurant(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateRestaurant,
    ) -> Result<Restaurant, AdminError> {
        let data = UpdateRestaurant {
            name: optional_required("name", data.name.as_deref())?,
            ..data.clone()
        };
        Restaurant::update(pool, id, &data)
            .await?
            .ok_or(AdminError::RestaurantNotFound)
    }

    /// Only restaurants without orders can be deleted; their menu items go with them.
    pub async fn delete_restaurant(pool: &SqlitePool, id: Uuid) -> Result<(), AdminError> {
        let orders = Order::count_by_restaurant(pool, id).await?;
        if orders > 0 {
            return Err(AdminError::RestaurantHasOrders(orders));
        }
        // An order placed after the count still trips the RESTRICT key.
        let deleted = Restaurant::delete(pool, id).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                AdminError::RestaurantHasOrders(1)
            } else {
                AdminError::Database(e)
            }
        })?;
        if deleted == 0 {
            return Err(AdminError::RestaurantNotFound);
        }
        info!(restaurant_id = %id, "Restaurant deleted");
        Ok(())
    }

    // Menu items

    /// Every item, available or not. `restaurant_id` narrows to one restaurant.
    pub async fn list_menu_items(
        pool: &SqlitePool,
        restaurant_id: Option<Uuid>,
    ) -> Result<Vec<MenuItem>, AdminError> {
        match restaurant_id {
            Some(id) => {
                Self::get_restaurant(pool, id).await?;
                Ok(MenuItem::find_by_restaurant(pool, id, &MenuFilter::default()).await?)
            }
            None => Ok(MenuItem::find_all(pool).await?),
        }
    }

    pub async fn get_menu_item(pool: &SqlitePool, id: Uuid) -> Result<MenuItem, AdminError> {
        MenuItem::find_by_id(pool, id)
            .await?
            .ok_or(AdminError::MenuItemNotFound)
    }

    pub async fn create_menu_item(
        pool: &SqlitePool,
        data: &CreateMenuItem,
    ) -> Result<MenuItem, AdminError> {
        validate_price(data.price)?;
        let data = CreateMenuItem {
            name: required("name", &data.name)?,
            category: required("category", &data.category)?,
            ..data.clone()
        };
        Self::get_restaurant(pool, data.restaurant_id).await?;

        let item = MenuItem::create(pool, Uuid::new_v4(), &data).await?;
        info!(menu_item_id = %item.id, restaurant_id = %item.restaurant_id, "Menu item created");
        Ok(item)
    }

    pub async fn update_menu_item(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateMenuItem,
    ) -> Result<MenuItem, AdminError> {
        if let Some(price) = data.price {
            validate_price(price)?;
        }
        let data = UpdateMenuItem {
            name: optional_required("name", data.name.as_deref())?,
            category: optional_required("category", data.category.as_deref())?,
            ..data.clone()
        };
        MenuItem::update(pool, id, &data)
            .await?
            .ok_or(AdminError::MenuItemNotFound)
    }

    pub async fn delete_menu_item(pool: &SqlitePool, id: Uuid) -> Result<(), AdminError> {
        if MenuItem::delete(pool, id).await? == 0 {
            return Err(AdminError::MenuItemNotFound);
        }
        info!(menu_item_id = %id, "Menu item deleted");
        Ok(())
    }

    pub async fn menu_categories(
        pool: &SqlitePool,
        restaurant_id: Uuid,
    ) -> Result<Vec<String>, AdminError> {
        Self::get_restaurant(pool, restaurant_id).await?;
        Ok(MenuItem::categories(pool, restaurant_id).await?)
    }

    // Cashiers

    pub async fn list_cashiers(pool: &SqlitePool) -> Result<Vec<CashierWithRestaurant>, AdminError> {
        Ok(User::find_cashiers_with_restaurant(pool).await?)
    }

    pub async fn get_cashier(pool: &SqlitePool, id: Uuid) -> Result<User, AdminError> {
        User::find_by_id_and_role(pool, id, UserRole::Kasir)
            .await?
            .ok_or(AdminError::CashierNotFound)
    }

    pub async fn create_cashier(pool: &SqlitePool, data: &CreateCashier) -> Result<User, AdminError> {
        let name = required("name", &data.name)?;
        let email = normalize_email(&data.email)?;
        validate_password(&data.password)?;
        if let Some(restaurant_id) = data.restaurant_id {
            Self::get_restaurant(pool, restaurant_id).await?;
        }

        let password = PasswordHash::new(&data.password);
        let kasir = User::create(
            pool,
            Uuid::new_v4(),
            &CreateUser {
                name,
                email: email.clone(),
                password_hash: password.hash,
                password_salt: password.salt,
                role: UserRole::Kasir,
                restaurant_id: data.restaurant_id,
            },
        )
        .await
        .map_err(email_conflict(&email))?;

        info!(kasir_id = %kasir.id, "Cashier created");
        Ok(kasir)
    }

    pub async fn update_cashier(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCashier,
    ) -> Result<User, AdminError> {
        let email = data.email.as_deref().map(normalize_email).transpose()?;
        if let Some(restaurant_id) = data.restaurant_id {
            Self::get_restaurant(pool, restaurant_id).await?;
        }
        let password = match data.password.as_deref() {
            Some(password) => {
                validate_password(password)?;
                Some(PasswordHash::new(password))
            }
            None => None,
        };

        let update = UpdateUser {
            name: optional_required("name", data.name.as_deref())?,
            email: email.clone(),
            restaurant_id: data.restaurant_id,
            password_hash: password.as_ref().map(|p| p.hash.clone()),
            password_salt: password.map(|p| p.salt),
        };
        User::update(pool, id, UserRole::Kasir, &update)
            .await
            .map_err(email_conflict(email.as_deref().unwrap_or_default()))?
            .ok_or(AdminError::CashierNotFound)
    }

    /// Only cashiers without sales can be deleted; their shifts and sessions go with them.
    pub async fn delete_cashier(pool: &SqlitePool, id: Uuid) -> Result<(), AdminError> {
        let sales = SalesLog::count_by_kasir(pool, id).await?;
        if sales > 0 {
            return Err(AdminError::CashierHasSales(sales));
        }
        let deleted = User::delete(pool, id, UserRole::Kasir).await.map_err(|e| {
            if is_foreign_key_violation(&e) {
                AdminError::CashierHasSales(1)
            } else {
                AdminError::Database(e)
            }
        })?;
        if deleted == 0 {
            return Err(AdminError::CashierNotFound);
        }
        info!(kasir_id = %id, "Cashier deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        auth::AuthService,
        test_support::{seed_admin, seed_restaurant, test_pool},
    };

    fn menu_item(restaurant_id: Uuid, name: &str, price: i64) -> CreateMenuItem {
        CreateMenuItem {
            restaurant_id,
            name: name.to_string(),
            description: None,
            category: " Minuman ".to_string(),
            price,
            image_url: None,
            is_available: Some(false),
        }
    }

    fn cashier(email: &str, restaurant_id: Option<Uuid>) -> CreateCashier {
        CreateCashier {
            name: "Siti".to_string(),
            email: email.to_string(),
            password: "kasir123".to_string(),
            restaurant_id,
        }
    }

    #[tokio::test]
    async fn test_restaurant_crud() {
        let pool = test_pool().await;
        let created = AdminService::create_restaurant(
            &pool,
            &CreateRestaurant {
                name: "  Sate Pak Min ".to_string(),
                location: None,
                logo_url: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.name, "Sate Pak Min");

        let updated = AdminService::update_restaurant(
            &pool,
            created.id,
            &UpdateRestaurant {
                location: Some("Blok M".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Sate Pak Min");
        assert_eq!(updated.location.as_deref(), Some("Blok M"));

        assert!(matches!(
            AdminService::update_restaurant(
                &pool,
                created.id,
                &UpdateRestaurant {
                    name: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await,
            Err(AdminError::Validation(_))
        ));

        AdminService::delete_restaurant(&pool, created.id).await.unwrap();
        assert!(matches!(
            AdminService::delete_restaurant(&pool, created.id).await,
            Err(AdminError::RestaurantNotFound)
        ));
    }

    #[tokio::test]
    async fn test_menu_item_validation() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;

        assert!(matches!(
            AdminService::create_menu_item(&pool, &menu_item(resto.id, "Jus", -1)).await,
            Err(AdminError::Validation(_))
        ));
        assert!(matches!(
            AdminService::create_menu_item(&pool, &menu_item(Uuid::new_v4(), "Jus", 1)).await,
            Err(AdminError::RestaurantNotFound)
        ));

        let jus = AdminService::create_menu_item(&pool, &menu_item(resto.id, "Jus Alpukat", 12_000))
            .await
            .unwrap();
        assert_eq!(jus.category, "Minuman");
        assert!(!jus.is_available);

        let all = AdminService::list_menu_items(&pool, Some(resto.id)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(
            AdminService::menu_categories(&pool, resto.id).await.unwrap(),
            vec!["Minuman".to_string()]
        );

        let updated = AdminService::update_menu_item(
            &pool,
            jus.id,
            &UpdateMenuItem {
                price: Some(15_000),
                is_available: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 15_000);
        assert!(updated.is_available);

        AdminService::delete_menu_item(&pool, jus.id).await.unwrap();
        assert!(matches!(
            AdminService::get_menu_item(&pool, jus.id).await,
            Err(AdminError::MenuItemNotFound)
        ));
    }

    #[tokio::test]
    async fn test_cashier_lifecycle() {
        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let kasir = AdminService::create_cashier(&pool, &cashier("Siti@Resto.id", Some(resto.id)))
            .await
            .unwrap();
        assert_eq!(kasir.email, "siti@resto.id");
        assert_eq!(kasir.role, UserRole::Kasir);

        assert!(matches!(
            AdminService::create_cashier(&pool, &cashier("siti@resto.id", None)).await,
            Err(AdminError::EmailTaken(_))
        ));

        let listed = AdminService::list_cashiers(&pool).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].restaurant_name.as_deref(), Some("Warung Sari"));

        AdminService::update_cashier(
            &pool,
            kasir.id,
            &UpdateCashier {
                password: Some("baru12345".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        AuthService::verify_credentials(&pool, "siti@resto.id", "baru12345", UserRole::Kasir)
            .await
            .unwrap();

        AdminService::delete_cashier(&pool, kasir.id).await.unwrap();
        assert!(matches!(
            AdminService::get_cashier(&pool, kasir.id).await,
            Err(AdminError::CashierNotFound)
        ));
    }

    #[tokio::test]
    async fn test_cashier_operations_ignore_admins() {
        let pool = test_pool().await;
        let admin = seed_admin(&pool, "boss@resto.id", "secret99").await;
        assert!(matches!(
            AdminService::get_cashier(&pool, admin.id).await,
            Err(AdminError::CashierNotFound)
        ));
        assert!(matches!(
            AdminService::delete_cashier(&pool, admin.id).await,
            Err(AdminError::CashierNotFound)
        ));
    }

    #[tokio::test]
    async fn test_deletes_refused_while_sales_exist() {
        use chrono::Utc;
        use db::models::{order_item::OrderItem, shift::Shift};

        use crate::services::{
            order_events::OrderEvents,
            payment::PaymentService,
            test_support::{seed_kasir, seed_menu_item, seed_order},
        };

        let pool = test_pool().await;
        let resto = seed_restaurant(&pool, "Warung Sari").await;
        let nasi = seed_menu_item(&pool, resto.id, "Nasi Goreng", 25_000).await;
        let kasir = seed_kasir(&pool, "siti@resto.id", "kasir123").await;
        Shift::open(&pool, Uuid::new_v4(), kasir.id, Utc::now())
            .await
            .unwrap();
        let order = seed_order(&pool, resto.id, &[(&nasi, 2)]).await;
        PaymentService::confirm(&pool, &OrderEvents::default(), &kasir, order.id, "cash")
            .await
            .unwrap();

        assert!(matches!(
            AdminService::delete_restaurant(&pool, resto.id).await,
            Err(AdminError::RestaurantHasOrders(1))
        ));
        assert!(matches!(
            AdminService::delete_cashier(&pool, kasir.id).await,
            Err(AdminError::CashierHasSales(1))
        ));

        let sale = SalesLog::find_by_order_id(&pool, order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.kasir_id, kasir.id);
        assert_eq!(sale.total_price, 50_000);
        assert!(Order::find_by_id(&pool, order.id).await.unwrap().is_some());
        assert_eq!(
            OrderItem::find_by_order_id(&pool, order.id).await.unwrap().len(),
            1
        );
        AdminService::get_restaurant(&pool, resto.id).await.unwrap();
        AdminService::get_cashier(&pool, kasir.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let pool = test_pool().await;
        let mut data = cashier("budi@resto.id", None);
        data.password = "123".to_string();
        assert!(matches!(
            AdminService::create_cashier(&pool, &data).await,
            Err(AdminError::Validation(_))
        ));
    }
}
