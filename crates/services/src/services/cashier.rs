//! Cashier sessions. Logging in opens (or resumes) a shift, logging out closes it.

use chrono::{DateTime, FixedOffset, Utc};
use db::models::{
    sales_log::{SalesLog, SalesLogWithCashier},
    session::Session,
    shift::Shift,
    user::{User, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use utils::money::sum_amounts;
use uuid::Uuid;

use super::{
    auth::{AuthError, AuthService, LoginRequest},
    reports::{DateRange, ReportPeriod},
};

#[derive(Debug, Error)]
pub enum CashierError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("no open shift")]
    NoOpenShift,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CashierSession {
    pub token: Uuid,
    pub kasir: User,
    pub shift: Shift,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct SalesSummary {
    pub sales: Vec<SalesLogWithCashier>,
    pub total: i64,
}

pub struct CashierService;

impl CashierService {
    pub async fn login(
        pool: &SqlitePool,
        request: &LoginRequest,
    ) -> Result<CashierSession, CashierError> {
        let kasir =
            AuthService::verify_credentials(pool, &request.email, &request.password, UserRole::Kasir)
                .await?;

        let shift = match Shift::find_open_for_kasir(pool, kasir.id).await? {
            Some(shift) => {
                info!(kasir_id = %kasir.id, shift_id = %shift.id, "Resuming open shift");
                shift
            }
            None => {
                let shift = Shift::open(pool, Uuid::new_v4(), kasir.id, Utc::now()).await?;
                info!(kasir_id = %kasir.id, shift_id = %shift.id, "Shift started");
                shift
            }
        };
        let session = Session::create(pool, kasir.id, UserRole::Kasir, Some(shift.id)).await?;

        Ok(CashierSession {
            token: session.token,
            kasir,
            shift,
        })
    }

    /// Ends the session's shift and drops every session bound to it.
    pub async fn logout(pool: &SqlitePool, session: &Session) -> Result<Option<Shift>, CashierError> {
        let Some(shift_id) = session.shift_id else {
            warn!(user_id = %session.user_id, "Cashier session without shift");
            Session::delete(pool, session.token).await?;
            return Ok(None);
        };

        let now = Utc::now();
        if !Shift::close(pool, shift_id, now).await? {
            warn!(shift_id = %shift_id, "Shift was already closed");
        }
        let dropped = Session::delete_by_shift(pool, shift_id).await?;
        Session::delete(pool, session.token).await?;
        info!(shift_id = %shift_id, sessions = dropped, "Shift ended");

        Ok(Shift::find_by_id(pool, shift_id).await?)
    }

    pub async fn current_shift(pool: &SqlitePool, session: &Session) -> Result<Shift, CashierError> {
        let shift_id = session.shift_id.ok_or(CashierError::NoOpenShift)?;
        Shift::find_by_id(pool, shift_id)
            .await?
            .filter(Shift::is_open)
            .ok_or(CashierError::NoOpenShift)
    }

    /// Every sale logged today (local time), newest first.
    pub async fn today_sales(
        pool: &SqlitePool,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Result<SalesSummary, CashierError> {
        Self::sales_between(pool, ReportPeriod::Daily.range(now, offset)).await
    }

    /// Every sale logged in `range`, newest first.
    pub async fn sales_between(
        pool: &SqlitePool,
        range: DateRange,
    ) -> Result<SalesSummary, CashierError> {
        let sales = SalesLog::find_between(pool, range.from, range.to, None).await?;
        let total = sum_amounts(sales.iter().map(|sale| sale.total_price));
        Ok(SalesSummary { sales, total })
    }
}
