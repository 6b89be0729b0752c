mod app;
mod cors;

use std::{io, sync::Arc, time::Duration};

use actix_web::{App, HttpServer, web};
use api_auth::AuthService;
use api_notes::NoteService;
use common::{
    env_config::Config,
    google::GoogleVerifier,
    http,
    mailer::{LogMailer, MailSender, SmtpMailer},
};
use db::{
    memory::{MemoryNoteStore, MemoryUserStore},
    note::{NoteStore, PgNoteStore},
    user::{PgUserStore, UserStore},
};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // get env vars
    let config = Config::from_env().map_err(io::Error::other)?;

    // init logger
    logger::setup(
        &config.log_level,
        config.console_logging_enabled,
        config.log_file.as_deref(),
    )
    .map_err(io::Error::other)?;
    if config.uses_dev_secret() {
        log::warn!("JWT_SECRET not set, signing tokens with the development secret");
    }

    // init stores
    let (users, notes): (Arc<dyn UserStore>, Arc<dyn NoteStore>) = match &config.database_url {
        Some(database_url) => {
            let pool = db::setup(database_url, config.database_require_ssl)
                .await
                .map_err(|e| io::Error::other(format!("Failed to set up database: {}", e)))?;
            (
                Arc::new(PgUserStore::new(pool.clone())),
                Arc::new(PgNoteStore::new(pool)),
            )
        }
        None => {
            log::warn!("DATABASE_URL not set, using the in-memory store");
            (
                Arc::new(MemoryUserStore::new()),
                Arc::new(MemoryNoteStore::new()),
            )
        }
    };

    // init outgoing mail and Google verification
    let timeout = Duration::from_secs(config.external_timeout_secs);
    let mailer: Arc<dyn MailSender> = match &config.mail {
        Some(mail) => Arc::new(SmtpMailer::new(mail, timeout).map_err(io::Error::other)?),
        None => {
            log::warn!("SMTP not configured, OTP codes are only written to the log");
            Arc::new(LogMailer)
        }
    };
    if config.google.client_id.is_empty() {
        log::warn!("GOOGLE_CLIENT_ID not set, Google sign-in will reject every token");
    }
    let verifier = GoogleVerifier::new(&config.google, timeout).map_err(io::Error::other)?;

    let auth = web::Data::new(
        AuthService::new(users, mailer, Arc::new(verifier), config.clone())
            .map_err(io::Error::other)?,
    );
    let notes = web::Data::new(NoteService::new(notes));

    let origin = config.cors_allowed_origin.clone();
    let dev_routes = config.is_development();
    log::info!(
        "Starting server on {}:{} ({})",
        config.server_host,
        config.server_port,
        config.environment
    );

    HttpServer::new(move || {
        App::new()
            .app_data(auth.clone())
            .app_data(notes.clone())
            .app_data(http::json_config())
            .wrap(logger::middleware()) // 2nd
            .wrap(cors::middleware(&origin)) // 1st
            .configure(|cfg| app::configure(cfg, dev_routes))
            .default_service(web::route().to(http::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
