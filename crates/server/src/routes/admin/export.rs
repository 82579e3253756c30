//! CSV downloads of the period reports.

use axum::{
    Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use deployment::Deployment;
use services::services::{export, reports::ReportService};

use super::reports::PeriodQuery;
use crate::{DeploymentImpl, error::ApiError, extract::AdminAuth};

fn csv_download(filename: &str, body: String) -> impl IntoResponse + use<> {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

pub async fn export_sales(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = query.period()?;
    let range = query.range(&deployment).await?;
    let offset = deployment.config().read().await.local_offset();
    let sales = ReportService::sales(&deployment.db().pool, range, query.kasir_id).await?;
    let body = export::sales_csv(&sales, offset)?;
    Ok(csv_download(&format!("sales-{period}.csv"), body))
}

pub async fn export_cashiers(
    State(deployment): State<DeploymentImpl>,
    _auth: AdminAuth,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = query.period()?;
    let range = query.range(&deployment).await?;
    let rows = ReportService::cashiers(&deployment.db().pool, range, Utc::now()).await?;
    let body = export::cashiers_csv(&rows)?;
    Ok(csv_download(&format!("cashiers-{period}.csv"), body))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/export",
        Router::new()
            .route("/sales.csv", get(export_sales))
            .route("/cashiers.csv", get(export_cashiers)),
    )
}
