use std::future::Future;
use std::pin::Pin;

use actix_multipart::form::MultipartForm;
use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, HttpResponse, delete, get, post, put, web,
};

use crate::forms::products::{EditProductForm, ProductMultipartForm};
use crate::routes::{AppProductService, respond, respond_empty};
use crate::services::{ServiceError, ServiceResult};

/// Product fields as sent by the client, picked by the request content type.
///
/// Extraction failures of either kind surface as `BadRequest`.
pub enum ProductPayload {
    Multipart(ProductMultipartForm),
    Json(EditProductForm),
}

impl FromRequest for ProductPayload {
    type Error = ServiceError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let mut payload = payload.take();

        Box::pin(async move {
            let content_type = req.content_type().to_ascii_lowercase();
            if content_type == "multipart/form-data" {
                MultipartForm::<ProductMultipartForm>::from_request(&req, &mut payload)
                    .await
                    .map(|MultipartForm(form)| Self::Multipart(form))
                    .map_err(|err| ServiceError::bad_request(err.to_string()))
            } else if content_type == "application/json" || content_type.ends_with("+json") {
                web::Json::<EditProductForm>::from_request(&req, &mut payload)
                    .await
                    .map(|web::Json(form)| Self::Json(form))
                    .map_err(|err| ServiceError::bad_request(err.to_string()))
            } else {
                Err(ServiceError::bad_request(
                    "Expected a multipart/form-data or JSON body",
                ))
            }
        })
    }
}

#[get("/products")]
pub async fn list_products(service: web::Data<AppProductService>) -> ServiceResult<HttpResponse> {
    log::info!("Fetch all products request received");
    let products = service.get_all()?;
    Ok(respond(
        StatusCode::OK,
        "Products fetched successfully",
        products,
    ))
}

#[get("/products/{id}")]
pub async fn get_product(
    id: web::Path<String>,
    service: web::Data<AppProductService>,
) -> ServiceResult<HttpResponse> {
    log::info!("Fetch product by id request received with id: {id}");
    let product = service.get_by_id(&id)?;
    Ok(respond(
        StatusCode::OK,
        "Product fetched successfully",
        product,
    ))
}

#[post("/products")]
pub async fn create_product(
    service: web::Data<AppProductService>,
    payload: ProductPayload,
) -> ServiceResult<HttpResponse> {
    let ProductPayload::Multipart(form) = payload else {
        return Err(ServiceError::bad_request(
            "Product data must be sent as multipart/form-data",
        ));
    };
    log::info!(
        "Create product request received with name: {:?}",
        form.name.as_ref().map(|name| name.0.as_str())
    );
    let dto = form.into_create_dto()?;
    let product = service.create(dto).await?;
    Ok(respond(
        StatusCode::CREATED,
        "Product created successfully",
        product,
    ))
}

/// Accepts either multipart (optionally with a new `image`) or a JSON body.
#[put("/products/{id}")]
pub async fn update_product(
    id: web::Path<String>,
    service: web::Data<AppProductService>,
    payload: ProductPayload,
) -> ServiceResult<HttpResponse> {
    log::info!("Update product request received with id: {id}");
    let dto = match payload {
        ProductPayload::Multipart(form) => form.into_update_dto()?,
        ProductPayload::Json(form) => form.into_update_dto()?,
    };
    let product = service.update(&id, dto).await?;
    Ok(respond(
        StatusCode::OK,
        "Product updated successfully",
        product,
    ))
}

#[delete("/products/{id}")]
pub async fn delete_product(
    id: web::Path<String>,
    service: web::Data<AppProductService>,
) -> ServiceResult<HttpResponse> {
    log::info!("Delete product request received with id: {id}");
    service.delete(&id).await?;
    Ok(respond_empty(StatusCode::OK, "Product deleted successfully"))
}
