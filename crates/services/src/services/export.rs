//! CSV exports of sales and cashier performance for spreadsheets.

use chrono::FixedOffset;
use db::models::sales_log::SalesLogWithCashier;
use thiserror::Error;

use super::reports::CashierReportRow;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// `created_at` is rendered in `offset`.
pub fn sales_csv(sales: &[SalesLogWithCashier], offset: FixedOffset) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "created_at",
        "order_id",
        "table_number",
        "cashier",
        "payment_method",
        "total_price",
    ])?;
    for sale in sales {
        writer.write_record([
            sale.created_at
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            sale.order_id.to_string(),
            sale.table_number.clone().unwrap_or_default(),
            sale.cashier_name.clone().unwrap_or_default(),
            sale.payment_method.clone(),
            sale.total_price.to_string(),
        ])?;
    }
    finish(writer)
}

pub fn cashiers_csv(rows: &[CashierReportRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["cashier", "email", "total_sales", "orders", "shift_hours"])?;
    for row in rows {
        writer.write_record([
            row.name.clone(),
            row.email.clone(),
            row.total_sales.to_string(),
            row.orders.to_string(),
            format!("{:.2}", row.shift_hours()),
        ])?;
    }
    finish(writer)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_sales_csv() {
        let order_id = Uuid::new_v4();
        let sales = vec![SalesLogWithCashier {
            id: Uuid::new_v4(),
            order_id,
            kasir_id: Uuid::new_v4(),
            cashier_name: Some("Siti, S.E.".to_string()),
            table_number: Some("12".to_string()),
            total_price: 45_000,
            payment_method: "cash".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, 5, 0, 0).unwrap(),
        }];
        let csv = sales_csv(&sales, FixedOffset::east_opt(7 * 3600).unwrap()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("created_at,order_id,table_number,cashier,payment_method,total_price")
        );
        assert_eq!(
            lines.next(),
            Some(format!("2025-03-10 12:00:00,{order_id},12,\"Siti, S.E.\",cash,45000").as_str())
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_cashiers_csv() {
        let rows = vec![CashierReportRow {
            kasir_id: Uuid::new_v4(),
            name: "Budi".to_string(),
            email: "budi@resto.id".to_string(),
            total_sales: 120_000,
            orders: 4,
            shift_minutes: 90,
        }];
        let csv = cashiers_csv(&rows).unwrap();
        assert_eq!(
            csv,
            "cashier,email,total_sales,orders,shift_hours\nBudi,budi@resto.id,120000,4,1.50\n"
        );
    }
}
