//! The front end's route table.

use std::sync::Arc;

use crate::config::Config;
use crate::content::Site;
use crate::handler::with_state;
use crate::health;
use crate::intake::Intake;
use crate::method::Method;
use crate::router::Router;

/// `GET /`, `GET /blog`, `GET /healthz`, any other `GET` as a static file,
/// and `POST` to any path as a form submission.
pub fn router(config: &Config) -> Router {
    let site = Arc::new(Site::new(&config.site_root));
    let intake = Arc::new(Intake::new(config.datagram_addr));

    Router::new()
        .get("/",        with_state(&site, Site::index))
        .get("/blog",    with_state(&site, Site::blog))
        .get("/healthz", health::liveness)
        .fallback(Method::Get,  with_state(&site, Site::static_file))
        .fallback(Method::Post, with_state(&intake, Intake::submit))
}
