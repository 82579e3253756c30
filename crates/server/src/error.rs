use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    admin::AdminError,
    auth::AuthError,
    cart::CartError,
    cashier::CashierError,
    catalog::CatalogError,
    checkout::CheckoutError,
    export::ExportError,
    orders::OrderError,
    payment::PaymentError,
    receipt::ReceiptError,
    reports::ReportError,
};
use thiserror::Error;
use tracing::error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Cashier(#[from] CashierError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Receipt(#[from] ReceiptError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Admin(#[from] AdminError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    BadRequest(String),
    #[error("missing or invalid session")]
    Unauthorized,
}

fn auth_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::UnknownEmail => StatusCode::NOT_FOUND,
        AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::EmailTaken(_) => StatusCode::CONFLICT,
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
    }
}

fn cart_status(err: &CartError) -> StatusCode {
    match err {
        CartError::Database(_) | CartError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CartError::MenuItemNotFound(_) | CartError::ItemNotInCart(_) => StatusCode::NOT_FOUND,
        CartError::ItemUnavailable(_) => StatusCode::CONFLICT,
        CartError::InvalidQuantity(_) | CartError::InvalidTableNumber => StatusCode::BAD_REQUEST,
    }
}

fn order_status(err: &OrderError) -> StatusCode {
    match err {
        OrderError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        OrderError::NotFound => StatusCode::NOT_FOUND,
        OrderError::InvalidQrPayload => StatusCode::BAD_REQUEST,
        OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => auth_status(e),
            ApiError::Catalog(CatalogError::RestaurantNotFound) => StatusCode::NOT_FOUND,
            ApiError::Cart(e) => cart_status(e),
            ApiError::Checkout(e) => match e {
                CheckoutError::Cart(e) => cart_status(e),
                CheckoutError::EmptyCart
                | CheckoutError::MissingTableNumber
                | CheckoutError::ForeignItem(_) => StatusCode::BAD_REQUEST,
                CheckoutError::MenuItemGone(_) | CheckoutError::ItemUnavailable(_) => {
                    StatusCode::CONFLICT
                }
                CheckoutError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Order(e) => order_status(e),
            ApiError::Cashier(e) => match e {
                CashierError::Auth(e) => auth_status(e),
                CashierError::NoOpenShift => StatusCode::CONFLICT,
                CashierError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Payment(e) => match e {
                PaymentError::Order(e) => order_status(e),
                PaymentError::EmptyOrder => StatusCode::BAD_REQUEST,
                PaymentError::NoOpenShift
                | PaymentError::AlreadySettled
                | PaymentError::NotPayable(_) => StatusCode::CONFLICT,
                PaymentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Receipt(e) => match e {
                ReceiptError::Order(e) => order_status(e),
                ReceiptError::NotSettled => StatusCode::CONFLICT,
                ReceiptError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Admin(e) => match e {
                AdminError::Validation(_) => StatusCode::BAD_REQUEST,
                AdminError::RestaurantNotFound
                | AdminError::MenuItemNotFound
                | AdminError::CashierNotFound => StatusCode::NOT_FOUND,
                AdminError::EmailTaken(_)
                | AdminError::RestaurantHasOrders(_)
                | AdminError::CashierHasSales(_) => StatusCode::CONFLICT,
                AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Catalog(CatalogError::Database(_))
            | ApiError::Report(_)
            | ApiError::Export(_)
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}
