use std::path::PathBuf;

use actix_multipart::form::MultipartFormConfig;
use actix_multipart::form::tempfile::TempFileConfig;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::Serialize;

use crate::API_PREFIX;
use crate::repository::DieselRepository;
use crate::services::products::ProductService;
use crate::services::{ErrorKind, ServiceError};

pub mod main;
pub mod products;

/// Product service as wired into the running application.
pub type AppProductService = ProductService<DieselRepository>;

/// Envelope wrapped around every successful response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip)]
    http_status: StatusCode,
    pub status: bool,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            http_status: status,
            status: true,
            status_code: status.as_u16(),
            message: message.into(),
            data,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.http_status).json(self)
    }
}

/// Respond with `status` and a payload.
pub fn respond<T: Serialize>(status: StatusCode, message: &str, data: T) -> HttpResponse {
    ApiResponse::new(status, message, Some(data)).into_response()
}

/// Respond with `status` and no payload.
pub fn respond_empty(status: StatusCode, message: &str) -> HttpResponse {
    ApiResponse::<()>::new(status, message, None).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    status: bool,
    status_code: u16,
    message: String,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {self}");
        }

        let message = self.to_string();
        HttpResponse::build(status).json(ErrorEnvelope {
            status: false,
            status_code: status.as_u16(),
            message: message.clone(),
            error: ErrorBody {
                kind: self.kind(),
                message,
                details: self.details().to_vec(),
            },
        })
    }
}

/// Register the API routes together with body limits and upload staging.
pub fn configure(
    upload_dir: PathBuf,
    max_upload_bytes: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ServiceError::bad_request(err.to_string()).into()),
        )
        .app_data(
            MultipartFormConfig::default()
                .total_limit(max_upload_bytes)
                .error_handler(|err, _req| ServiceError::bad_request(err.to_string()).into()),
        )
        .app_data(TempFileConfig::default().directory(upload_dir))
        .service(main::health)
        .service(
            web::scope(API_PREFIX)
                .service(products::list_products)
                .service(products::get_product)
                .service(products::create_product)
                .service(products::update_product)
                .service(products::delete_product),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn response_status_matches_envelope_code() {
        let response = respond(StatusCode::CREATED, "Product created successfully", 1);

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = to_bytes(response.into_body()).await.expect("body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["statusCode"], 201);
        assert_eq!(value["status"], true);
        assert!(value.get("httpStatus").is_none());
    }

    #[actix_web::test]
    async fn service_errors_render_the_error_envelope() {
        let response = ServiceError::not_found("Product not found").error_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body()).await.expect("body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["status"], false);
        assert_eq!(value["statusCode"], 404);
        assert_eq!(value["error"]["kind"], "NOT_FOUND");
        assert!(value["error"].get("details").is_none());
    }
}
