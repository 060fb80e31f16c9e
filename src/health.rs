//! Liveness probe.
//!
//! Mounted at `/healthz`. Reports on the HTTP front end only; the datagram
//! listener and the store are not consulted.

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}
