//! Payment receipts and their fixed-width text layout.

use chrono::{DateTime, FixedOffset, Utc};
use db::models::{order_item::OrderItem, sales_log::SalesLog, user::User};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use ts_rs::TS;
use utils::money::format_rupiah;
use uuid::Uuid;

use super::orders::{OrderDetails, OrderError, OrderService};

const TITLE: &str = "STRUK PEMBAYARAN";
const MIN_WIDTH: usize = 24;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("order has not been paid")]
    NotSettled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub amount: i64,
}

impl From<&OrderItem> for ReceiptLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.name_snapshot.clone(),
            quantity: item.quantity,
            unit_price: item.price_snapshot,
            amount: item.line_total(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Receipt {
    pub order_id: Uuid,
    pub restaurant_name: String,
    pub restaurant_location: Option<String>,
    pub cashier_name: String,
    pub table_number: Option<String>,
    pub lines: Vec<ReceiptLine>,
    pub total: i64,
    pub payment_method: String,
    pub issued_at: DateTime<Utc>,
}

/// `left` and `right` on one line, `right` flush with `width`. Long names are cut.
fn two_column(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let room = width.saturating_sub(right_len + 1).max(1);
    let left: String = left.chars().take(room).collect();
    let pad = width.saturating_sub(left.chars().count() + right_len).max(1);
    format!("{left}{}{right}", " ".repeat(pad))
}

fn centered(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{text}", " ".repeat((width - len) / 2))
}

impl Receipt {
    pub fn from_sale(details: OrderDetails, sale: &SalesLog, cashier_name: String) -> Self {
        Self {
            order_id: details.order.id,
            restaurant_name: details.restaurant_name.unwrap_or_default(),
            restaurant_location: details.restaurant_location,
            cashier_name,
            table_number: details.order.table_number,
            lines: details.items.iter().map(ReceiptLine::from).collect(),
            total: sale.total_price,
            payment_method: sale.payment_method.clone(),
            issued_at: sale.created_at,
        }
    }

    /// Plain-text receipt, `width` columns wide, timestamps shown in `offset`.
    pub fn render_text(&self, width: usize, footer: &str, offset: FixedOffset) -> String {
        let width = width.max(MIN_WIDTH);
        let rule = "-".repeat(width);
        let mut out = Vec::new();

        if !self.restaurant_name.is_empty() {
            out.push(centered(&self.restaurant_name, width));
        }
        if let Some(location) = &self.restaurant_location {
            out.push(centered(location, width));
        }
        out.push(centered(TITLE, width));
        out.push(rule.clone());
        out.push("Order ID:".to_string());
        out.push(self.order_id.to_string());
        if let Some(table) = &self.table_number {
            out.push(two_column("Table", table, width));
        }
        out.push(two_column("Cashier", &self.cashier_name, width));
        let issued = self.issued_at.with_timezone(&offset);
        out.push(two_column("Date", &issued.format("%d-%m-%Y %H:%M").to_string(), width));
        out.push(rule.clone());

        for line in &self.lines {
            out.push(two_column(
                &format!("{} x{}", line.name, line.quantity),
                &format_rupiah(line.amount),
                width,
            ));
        }

        out.push(rule);
        out.push(two_column("TOTAL", &format_rupiah(self.total), width));
        out.push(two_column("Payment", &self.payment_method, width));
        if !footer.is_empty() {
            out.push(String::new());
            out.push(centered(footer, width));
        }

        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

pub struct ReceiptService;

impl ReceiptService {
    /// Receipt of a paid order.
    pub async fn for_order(pool: &SqlitePool, order_id: Uuid) -> Result<Receipt, ReceiptError> {
        let details = OrderService::details(pool, order_id).await?;
        let sale = SalesLog::find_by_order_id(pool, order_id)
            .await?
            .ok_or(ReceiptError::NotSettled)?;
        let cashier_name = User::find_by_id(pool, sale.kasir_id)
            .await?
            .map(|kasir| kasir.name)
            .unwrap_or_default();
        Ok(Receipt::from_sale(details, &sale, cashier_name))
    }
}
