use crate::domain::{OperationResult, Subscriber};
use crate::newsletter_service::NewsletterService;
use actix_web::{web, HttpResponse};

#[derive(serde::Deserialize)]
pub struct FormData {
    email: String,
    name: String,
}

impl From<FormData> for Subscriber {
    fn from(form: FormData) -> Self {
        Subscriber::new(form.name, form.email)
    }
}

/// Turns a workflow outcome into a response: 200 on success, 400 otherwise. The body is the
/// `OperationResult` itself in both cases.
pub(crate) fn respond(outcome: OperationResult) -> HttpResponse {
    if outcome.succeeded {
        HttpResponse::Ok().json(outcome)
    } else {
        HttpResponse::BadRequest().json(outcome)
    }
}

/// actix-web hands us the `NewsletterService` registered with `app_data`: the handler never learns
/// which backend sits behind it.
#[tracing::instrument(
    name = "Adding a new subscriber",
    skip(form, service),
    fields(
        subscriber_email = %form.email,
        subscriber_name = %form.name
    )
)]
pub async fn subscribe(
    form: web::Form<FormData>,
    service: web::Data<NewsletterService>,
) -> HttpResponse {
    respond(service.sign_up(form.0.into()).await)
}
