use actix_web::{web, HttpResponse, Responder};

use crate::rest_api::snapshot;

async fn say_ping() -> impl Responder {
    HttpResponse::Ok().body("pong")
}

pub fn init_routes() -> impl Fn(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.service(
            web::scope("/api")
                .service(RapiDoc::with_openapi("/docs.json", ApiDoc::openapi()))
                .service(RapiDoc::new("/api/docs.json").path("/docs"))
                .route("/ping", web::get().to(say_ping))
                .route("/snapshot", web::get().to(snapshot::snapshot)),
        );
    }
}

/* Swagger section */
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(snapshot::snapshot),
    tags(
        (name = "Tracker", description = "Read-only view of the traversal tracker's current state"),
    ),
    components(
        schemas(
            crate::lib::visualization::Snapshot,
            crate::lib::visualization::SlotSnapshot,
            crate::lib::visualization::AoiSnapshot,
            crate::lib::geometry::Rect,
        ),
    )
)]
struct ApiDoc;
