use actix_web::{web, Error, HttpResponse};

use crate::lib::visualization::Snapshot;
use crate::rest_api::APIStorage;

/// Current tracker state, for dashboards and debugging (§6, §10.4).
#[utoipa::path(
    get,
    tag = "Tracker",
    path = "/api/snapshot",
    responses(
        (status = 200, description = "Point-in-time view of the tracker", body = Snapshot)
    )
)]
pub async fn snapshot(data: web::Data<APIStorage>) -> Result<HttpResponse, Error> {
    let guard = data.tracker.lock().expect("LaneTracker is poisoned [Mutex]");
    let snapshot = Snapshot::capture(&guard);
    Ok(HttpResponse::Ok().json(snapshot))
}
