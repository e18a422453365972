pub mod app;
pub mod database;
pub mod schema;

mod auth;
mod config;
mod forms;
mod routes;
mod views;

#[cfg(test)]
mod test_utils;

use std::io;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::info;

use crate::{app::AppState, auth::session, config::Config};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let app_state = AppState::new(&config.database_url)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    let session_key = config.session_key();
    let secure_cookies = config.secure_cookies;

    info!("Server running on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(Data::new(app_state.clone()))
            .wrap(session::middleware(session_key.clone(), secure_cookies))
            .wrap(Logger::default())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
