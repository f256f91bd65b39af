use crate::newsletter_service::NewsletterService;
use crate::routes::subscriptions::respond;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
pub struct UnsubscribeFormData {
    email: String,
}

#[tracing::instrument(
    name = "Removing a subscriber",
    skip(form, service),
    fields(subscriber_email = %form.email)
)]
pub async fn unsubscribe(
    form: web::Form<UnsubscribeFormData>,
    service: web::Data<NewsletterService>,
) -> HttpResponse {
    respond(service.unsubscribe(&form.email).await)
}
