//! Period reports. `?period=` is daily, weekly, monthly or yearly and defaults to daily;
//! `?date=YYYY-MM-DD` anchors the period on that local date instead of today.

use axum::{
    Router,
    extract::{Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use db::models::sales_log::SalesLogWithCashier;
use deployment::Deployment;
use serde::Deserialize;
use services::services::reports::{
    CashierReportRow, Dashboard, DateRange, ItemReportRow, ReportPeriod, ReportService,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
    pub date: Option<String>,
    pub kasir_id: Option<Uuid>,
}

impl PeriodQuery {
    pub fn period(&self) -> Result<ReportPeriod, ApiError> {
        match self.period.as_deref().map(str::trim) {
            None | Some("") => Ok(ReportPeriod::default()),
            Some(value) => value
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("unknown report period: {value}"))),
        }
    }

    pub fn date(&self) -> Result<Option<NaiveDate>, ApiError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| ApiError::BadRequest(format!("invalid date: {value}"))),
        }
    }

    pub fn range_at(&self, now: DateTime<Utc>, offset: FixedOffset) -> Result<DateRange, ApiError> {
        let period = self.period()?;
        Ok(match self.date()? {
            Some(date) => period.range_on(date, offset),
            None => period.range(now, offset),
        })
    }

    /// Resolves the period against the configured local offset.
    pub async fn range(&self, deployment: &DeploymentImpl) -> Result<DateRange, ApiError> {
        let offset = deployment.config().read().await.local_offset();
        self.range_at(Utc::now(), offset)
    }
}

pub async fn sales_report(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<SalesLogWithCashier>>>, ApiError> {
    let range = query.range(&deployment).await?;
    let sales = ReportService::sales(&deployment.db().pool, range, query.kasir_id).await?;
    Ok(ResponseJson(ApiResponse::success(sales)))
}

pub async fn cashier_report(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<CashierReportRow>>>, ApiError> {
    let range = query.range(&deployment).await?;
    let rows = ReportService::cashiers(&deployment.db().pool, range, Utc::now()).await?;
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub async fn item_report(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<ItemReportRow>>>, ApiError> {
    let range = query.range(&deployment).await?;
    let rows = ReportService::items(&deployment.db().pool, range).await?;
    Ok(ResponseJson(ApiResponse::success(rows)))
}

pub async fn dashboard(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Dashboard>>, ApiError> {
    let period = query.period()?;
    let offset = deployment.config().read().await.local_offset();
    let range = query.range_at(Utc::now(), offset)?;
    let dashboard = ReportService::dashboard(&deployment.db().pool, period, range, offset).await?;
    Ok(ResponseJson(ApiResponse::success(dashboard)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/reports",
        Router::new()
            .route("/sales", get(sales_report))
            .route("/cashiers", get(cashier_report))
            .route("/items", get(item_report))
            .route("/dashboard", get(dashboard)),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_period_defaults_to_daily() {
        assert_eq!(PeriodQuery::default().period().unwrap(), ReportPeriod::Daily);

        let query = PeriodQuery {
            period: Some("Monthly".to_string()),
            ..Default::default()
        };
        assert_eq!(query.period().unwrap(), ReportPeriod::Monthly);

        let query = PeriodQuery {
            period: Some("hourly".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.period(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_date_anchors_the_period() {
        let offset = FixedOffset::east_opt(7 * 3600).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 3, 0, 0).unwrap();

        let query = PeriodQuery {
            period: Some("monthly".to_string()),
            date: Some("2025-02-14".to_string()),
            ..Default::default()
        };
        let range = query.range_at(now, offset).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 1, 31, 17, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 2, 28, 17, 0, 0).unwrap());

        let today = PeriodQuery::default().range_at(now, offset).unwrap();
        assert!(today.contains(now));

        let query = PeriodQuery {
            date: Some("14/02/2025".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            query.range_at(now, offset),
            Err(ApiError::BadRequest(_))
        ));
    }
}
