use crate::newsletter_service::NewsletterService;
use actix_web::{web, HttpResponse};

#[tracing::instrument(name = "Listing current subscribers", skip(service))]
pub async fn list_subscribers(service: web::Data<NewsletterService>) -> HttpResponse {
    HttpResponse::Ok().json(service.list_subscribers().await)
}
