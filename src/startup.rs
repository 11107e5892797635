use crate::configuration::{Settings, SignupSettings};
use crate::provider::ProviderClient;
use crate::routes::{
    check_health, classify_viewport, clear_consent, get_consent, json_error_handler, save_consent,
    signup_config, subscribe,
};
use actix_web::dev::Server;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let Settings {
            application,
            signup,
            provider,
        } = settings;
        let timeout = provider.timeout();
        let provider_client = ProviderClient::new(
            provider.kind,
            provider.api_base_url,
            provider.api_key,
            provider.group_id,
            timeout,
        )?;
        tracing::info!(
            provider = provider_client.kind().as_ref(),
            "Signups will be forwarded"
        );

        // Use port 0 to ask the OS to pick a random free port
        let listener = TcpListener::bind(application.get_url())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, provider_client, signup)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // Only return when the server is stopped
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    provider_client: ProviderClient,
    signup: SignupSettings,
) -> Result<Server, std::io::Error> {
    // So to share data between threads, actix-web provide web::Data<T>(Arc<T>)
    let provider_client = Data::new(provider_client);
    let signup = Data::new(signup);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(check_health))
            .route("/api/subscribe", web::post().to(subscribe))
            .service(
                web::resource("/api/consent")
                    .route(web::get().to(get_consent))
                    .route(web::post().to(save_consent))
                    .route(web::delete().to(clear_consent)),
            )
            .route("/api/viewport", web::get().to(classify_viewport))
            .route("/api/signup/config", web::get().to(signup_config))
            .app_data(provider_client.clone())
            .app_data(signup.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
