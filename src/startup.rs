use crate::configuration::Settings;
use crate::newsletter_service::NewsletterService;
use crate::repository::MongoConnector;
use crate::routes;
use crate::selector::{select_repository, EnvironmentVariables, SelectedRepository, SelectionState};
use crate::validation::SubscriberValidator;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Selects the subscriber repository, wires the service on top of it and binds the listener.
    /// An unreachable document store never makes this fail: the selector degrades instead.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let connector = MongoConnector::new(configuration.repository.server_selection_timeout());
        let SelectedRepository { repository, state } = select_repository(
            &configuration.repository,
            &EnvironmentVariables::from_process(),
            &connector,
        )
        .await;
        let service = NewsletterService::new(repository, Arc::new(SubscriberValidator));

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        // Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(listener, service, state)?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the application
    /// is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    service: NewsletterService,
    selection: SelectionState,
) -> Result<Server, std::io::Error> {
    // Wrap the shared state in a smart pointer
    let service = web::Data::new(service);
    let selection = web::Data::new(selection);
    let server = HttpServer::new(move || {
        App::new()
            // Middlewares are added using the `wrap` method on `App`
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(routes::health_check))
            .route("/subscriptions", web::post().to(routes::subscribe))
            .route(
                "/subscriptions/unsubscribe",
                web::post().to(routes::unsubscribe),
            )
            .route("/subscribers", web::get().to(routes::list_subscribers))
            .route("/diagnostics", web::get().to(routes::diagnostics))
            .app_data(service.clone())
            .app_data(selection.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
