use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{http, web, App, HttpServer};

use crate::lib::state_machine::LaneTracker;
use crate::rest_api::services;
use crate::settings::AppSettings;

pub struct APIStorage {
    pub tracker: Arc<Mutex<LaneTracker>>,
    pub app_settings: AppSettings,
}

pub async fn start_rest_api(server_host: String, server_port: i32, tracker: Arc<Mutex<LaneTracker>>, app_settings: AppSettings) -> std::io::Result<()> {
    let bind_address = format!("{}:{}", server_host, server_port);
    log::info!("REST API is starting on host:port {}:{}", server_host, server_port);
    let storage = APIStorage { tracker, app_settings };
    let data = web::Data::new(storage);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_headers(vec![http::header::ORIGIN, http::header::AUTHORIZATION, http::header::CONTENT_TYPE, http::header::CONTENT_LENGTH, http::header::ACCEPT, http::header::ACCEPT_ENCODING])
            .allowed_methods(vec!["GET"])
            .expose_headers(vec![http::header::CONTENT_LENGTH])
            .supports_credentials()
            .max_age(5600);
        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .configure(services::init_routes())
    })
    .bind(&bind_address)
    .unwrap_or_else(|_| panic!("Could not bind server to address: {}", &bind_address))
    .run()
    .await
}
