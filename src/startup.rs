use crate::configuration::{ContactSettings, Settings};
use crate::email_client::EmailClient;
use crate::routes;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::io::ErrorKind;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, std::io::Error> {
        let email_client = EmailClient::new(
            configuration.email_client.base_url.clone(),
            configuration.email_client.timeout(),
        )
        .map_err(|e| std::io::Error::new(ErrorKind::Other, e))?;

        if !configuration.contact.is_complete() {
            tracing::warn!(
                "Contact settings are incomplete, every submission will be answered with a 500"
            );
        }

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        // Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(listener, email_client, configuration.contact)?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the
    /// application is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// # Application state
/// actix-web spins up one worker per available core and runs the `App` factory closure once per
/// worker. Anything handed to `.app_data` must therefore be shareable: `web::Data` wraps its value
/// in an `Arc`, so every worker sees the same `EmailClient` (and the same connection pool inside
/// it) and the same `ContactSettings`.
///
/// Neither value is mutated after start-up. Requests on different workers, or on the same worker
/// interleaved at `.await` points, do not observe each other.
///
/// # Routing
/// `/api/contact` is registered as a resource rather than a single route: the `POST` route does
/// the work and the resource's default service answers every other method with a `405` carrying
/// an `Allow` header. A bare `web::post()` route would leave other methods to fall through to the
/// app-wide `404`.
pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    contact_settings: ContactSettings,
) -> Result<Server, std::io::Error> {
    // Shared across workers, nothing request specific lives in either of them
    let email_client = web::Data::new(email_client);
    let contact_settings = web::Data::new(contact_settings);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(routes::health_check))
            .service(
                web::resource("/api/contact")
                    .route(web::post().to(routes::contact))
                    .default_service(web::to(routes::contact_method_not_allowed)),
            )
            .app_data(email_client.clone())
            .app_data(contact_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
