//! Sales reporting over local-time periods.
//!
//! Aggregation is done in Rust over rows fetched for the period, so every report has a
//! pure function that the tests drive directly.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use db::models::{
    menu_item::MenuItem,
    order::Order,
    order_item::{OrderItem, SoldItem},
    restaurant::Restaurant,
    sales_log::{SalesLog, SalesLogWithCashier},
    shift::Shift,
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::debug;
use ts_rs::TS;
use utils::money::{line_amount, sum_amounts};
use uuid::Uuid;

const TOP_ITEMS: usize = 5;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Half-open `[from, to)` interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }
}

/// UTC instant of local midnight starting `date`.
fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    (local - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

impl ReportPeriod {
    /// Daily is today, weekly the last seven local days including today, monthly and
    /// yearly the current calendar month and year.
    pub fn range(self, now: DateTime<Utc>, offset: FixedOffset) -> DateRange {
        self.range_on(now.with_timezone(&offset).date_naive(), offset)
    }

    /// Same as [`ReportPeriod::range`] with `today` as the anchoring local date.
    pub fn range_on(self, today: NaiveDate, offset: FixedOffset) -> DateRange {
        let (first, next) = match self {
            ReportPeriod::Daily => (today, today + Days::new(1)),
            ReportPeriod::Weekly => (today - Days::new(6), today + Days::new(1)),
            ReportPeriod::Monthly => {
                let first = today - Days::new(u64::from(today.day0()));
                (first, first + Months::new(1))
            }
            ReportPeriod::Yearly => {
                let first = today - Days::new(u64::from(today.ordinal0()));
                (first, first + Months::new(12))
            }
        };
        DateRange {
            from: local_midnight(first, offset),
            to: local_midnight(next, offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct CashierReportRow {
    pub kasir_id: Uuid,
    pub name: String,
    pub email: String,
    pub total_sales: i64,
    pub orders: i64,
    pub shift_minutes: i64,
}

impl CashierReportRow {
    pub fn shift_hours(&self) -> f64 {
        self.shift_minutes as f64 / 60.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ItemReportRow {
    pub name: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: i64,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Dashboard {
    pub period: ReportPeriod,
    pub range: DateRange,
    pub total_revenue: i64,
    pub completed_orders: i64,
    pub total_orders: i64,
    pub menu_count: i64,
    pub restaurant_count: i64,
    pub sales_by_date: Vec<DailySales>,
    pub top_items: Vec<ItemReportRow>,
}

/// One row per cashier, busiest first. Shift minutes cover shifts that started in the
/// period; an open shift counts up to `now`.
pub fn cashier_report(
    kasirs: &[User],
    sales: &[SalesLogWithCashier],
    shifts: &[Shift],
    now: DateTime<Utc>,
) -> Vec<CashierReportRow> {
    let mut rows: HashMap<Uuid, CashierReportRow> = kasirs
        .iter()
        .map(|kasir| {
            (
                kasir.id,
                CashierReportRow {
                    kasir_id: kasir.id,
                    name: kasir.name.clone(),
                    email: kasir.email.clone(),
                    total_sales: 0,
                    orders: 0,
                    shift_minutes: 0,
                },
            )
        })
        .collect();

    for sale in sales {
        if let Some(row) = rows.get_mut(&sale.kasir_id) {
            row.total_sales = row.total_sales.saturating_add(sale.total_price);
            row.orders += 1;
        }
    }
    for shift in shifts {
        if let Some(row) = rows.get_mut(&shift.kasir_id) {
            row.shift_minutes += shift.minutes_until(now);
        }
    }

    let mut rows: Vec<_> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        b.total_sales
            .cmp(&a.total_sales)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

/// Sold items grouped by name snapshot, most sold first.
pub fn item_report(items: &[SoldItem]) -> Vec<ItemReportRow> {
    let mut grouped: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for item in items {
        let quantity = i64::from(item.quantity);
        let entry = grouped.entry(item.name_snapshot.as_str()).or_default();
        entry.0 += quantity;
        entry.1 = entry.1.saturating_add(line_amount(item.price_snapshot, item.quantity));
    }

    let mut rows: Vec<_> = grouped
        .into_iter()
        .map(|(name, (quantity, revenue))| ItemReportRow {
            name: name.to_string(),
            quantity,
            revenue,
        })
        .collect();
    rows.sort_by(|a, b| b.quantity.cmp(&a.quantity).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Sales per local calendar date, oldest first.
pub fn sales_by_date(sales: &[SalesLogWithCashier], offset: FixedOffset) -> Vec<DailySales> {
    let mut days: BTreeMap<NaiveDate, DailySales> = BTreeMap::new();
    for sale in sales {
        let date = sale.created_at.with_timezone(&offset).date_naive();
        let day = days.entry(date).or_insert(DailySales {
            date,
            orders: 0,
            total: 0,
        });
        day.orders += 1;
        day.total = day.total.saturating_add(sale.total_price);
    }
    days.into_values().collect()
}

pub struct ReportService;

impl ReportService {
    pub async fn sales(
        pool: &SqlitePool,
        range: DateRange,
        kasir_id: Option<Uuid>,
    ) -> Result<Vec<SalesLogWithCashier>, ReportError> {
        Ok(SalesLog::find_between(pool, range.from, range.to, kasir_id).await?)
    }

    pub async fn cashiers(
        pool: &SqlitePool,
        range: DateRange,
        now: DateTime<Utc>,
    ) -> Result<Vec<CashierReportRow>, ReportError> {
        let kasirs = User::find_by_role(pool, UserRole::Kasir).await?;
        let sales = SalesLog::find_between(pool, range.from, range.to, None).await?;
        let shifts = Shift::find_started_between(pool, range.from, range.to).await?;
        debug!(
            kasirs = kasirs.len(),
            sales = sales.len(),
            shifts = shifts.len(),
            "Building cashier report"
        );
        Ok(cashier_report(&kasirs, &sales, &shifts, now))
    }

    pub async fn items(
        pool: &SqlitePool,
        range: DateRange,
    ) -> Result<Vec<ItemReportRow>, ReportError> {
        let sold = OrderItem::find_sold_between(pool, range.from, range.to).await?;
        Ok(item_report(&sold))
    }

    pub async fn dashboard(
        pool: &SqlitePool,
        period: ReportPeriod,
        range: DateRange,
        offset: FixedOffset,
    ) -> Result<Dashboard, ReportError> {
        let sales = SalesLog::find_between(pool, range.from, range.to, None).await?;
        let mut top_items = Self::items(pool, range).await?;
        top_items.truncate(TOP_ITEMS);

        Ok(Dashboard {
            period,
            range,
            total_revenue: sum_amounts(sales.iter().map(|sale| sale.total_price)),
            completed_orders: sales.len() as i64,
            total_orders: Order::count(pool).await?,
            menu_count: MenuItem::count(pool).await?,
            restaurant_count: Restaurant::count(pool).await?,
            sales_by_date: sales_by_date(&sales, offset),
            top_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn wib() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn kasir(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@resto.id", name.to_lowercase()),
            password_hash: String::new(),
            password_salt: String::new(),
            role: UserRole::Kasir,
            restaurant_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sale(kasir: &User, total_price: i64, at: DateTime<Utc>) -> SalesLogWithCashier {
        SalesLogWithCashier {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            kasir_id: kasir.id,
            cashier_name: Some(kasir.name.clone()),
            table_number: Some("3".to_string()),
            total_price,
            payment_method: "cash".to_string(),
            created_at: at,
        }
    }

    fn sold(name: &str, price: i64, quantity: i32) -> SoldItem {
        SoldItem {
            menu_item_id: None,
            name_snapshot: name.to_string(),
            price_snapshot: price,
            quantity,
            sold_at: Utc::now(),
        }
    }

    #[test]
    fn test_daily_range_uses_local_midnight() {
        // 2025-03-10 23:30 UTC is already 2025-03-11 06:30 in WIB.
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 23, 30, 0).unwrap();
        let range = ReportPeriod::Daily.range(now, wib());
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 3, 11, 17, 0, 0).unwrap());
        assert!(range.contains(now));
    }

    #[test]
    fn test_weekly_monthly_yearly_ranges() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 12, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(0).unwrap();

        let weekly = ReportPeriod::Weekly.range(now, offset);
        assert_eq!(weekly.from, Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap());
        assert_eq!(weekly.to, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let monthly = ReportPeriod::Monthly.range(now, offset);
        assert_eq!(monthly.from, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(monthly.to, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let yearly = ReportPeriod::Yearly.range(now, offset);
        assert_eq!(yearly.from, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(yearly.to, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_period_parsing() {
        assert_eq!("Monthly".parse::<ReportPeriod>().unwrap(), ReportPeriod::Monthly);
        assert_eq!(ReportPeriod::Weekly.to_string(), "weekly");
        assert!("hourly".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_cashier_report() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let budi = kasir("Budi");
        let siti = kasir("Siti");
        let ani = kasir("Ani");
        let sales = vec![
            sale(&siti, 50_000, now),
            sale(&siti, 20_000, now),
            sale(&budi, 30_000, now),
        ];
        let shifts = vec![
            Shift {
                id: Uuid::new_v4(),
                kasir_id: siti.id,
                start_time: now - TimeDelta::hours(3),
                end_time: Some(now - TimeDelta::hours(1)),
            },
            Shift {
                id: Uuid::new_v4(),
                kasir_id: budi.id,
                start_time: now - TimeDelta::minutes(45),
                end_time: None,
            },
        ];

        let rows = cashier_report(&[budi, siti, ani], &sales, &shifts, now);
        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.name.as_str(), r.total_sales, r.orders, r.shift_minutes))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Siti", 70_000, 2, 120),
                ("Budi", 30_000, 1, 45),
                ("Ani", 0, 0, 0)
            ]
        );
        assert_eq!(rows[0].shift_hours(), 2.0);
    }

    #[test]
    fn test_item_report_groups_by_name() {
        let rows = item_report(&[
            sold("Es Teh", 5_000, 2),
            sold("Nasi Goreng", 25_000, 1),
            sold("Es Teh", 5_000, 3),
            sold("Ayam Bakar", 30_000, 1),
        ]);
        assert_eq!(
            rows,
            vec![
                ItemReportRow {
                    name: "Es Teh".to_string(),
                    quantity: 5,
                    revenue: 25_000
                },
                ItemReportRow {
                    name: "Ayam Bakar".to_string(),
                    quantity: 1,
                    revenue: 30_000
                },
                ItemReportRow {
                    name: "Nasi Goreng".to_string(),
                    quantity: 1,
                    revenue: 25_000
                },
            ]
        );
    }

    #[test]
    fn test_sales_by_local_date() {
        let budi = kasir("Budi");
        let sales = vec![
            // 18:00 UTC is the next local day in WIB
            sale(&budi, 10_000, Utc.with_ymd_and_hms(2025, 3, 10, 18, 0, 0).unwrap()),
            sale(&budi, 15_000, Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()),
            sale(&budi, 5_000, Utc.with_ymd_and_hms(2025, 3, 11, 2, 0, 0).unwrap()),
        ];
        let days = sales_by_date(&sales, wib());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!((days[0].orders, days[0].total), (1, 15_000));
        assert_eq!((days[1].orders, days[1].total), (2, 15_000));
    }
}
