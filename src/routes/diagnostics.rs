use crate::newsletter_service::NewsletterService;
use crate::selector::SelectionState;
use actix_web::{web, HttpResponse};

#[derive(serde::Serialize)]
struct Diagnostics<'a> {
    #[serde(flatten)]
    selection: &'a SelectionState,
    subscriber_count: usize,
}

/// Which backend the process ended up with, and why.
pub async fn diagnostics(
    service: web::Data<NewsletterService>,
    selection: web::Data<SelectionState>,
) -> HttpResponse {
    let subscriber_count = service.list_subscribers().await.len();
    HttpResponse::Ok().json(Diagnostics {
        selection: &selection,
        subscriber_count,
    })
}
