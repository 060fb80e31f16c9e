//! HTTP status codes as a typed enum.
//!
//! Only the codes formcast actually answers with. Use [`Status`] anywhere a
//! status code is accepted: `Response::status()`, `Response::builder().status()`,
//! or as a bare handler return value.
//!
//! ```rust
//! use formcast::{Response, Status};
//!
//! Response::status(Status::LengthRequired);
//! Response::builder()
//!     .status(Status::Found)
//!     .header("location", "/")
//!     .no_body();
//! ```

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Found,               // 302
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    LengthRequired,      // 411
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Found               => 302,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::MethodNotAllowed    => 405,
            Status::LengthRequired      => 411,
            Status::InternalServerError => 500,
        }
    }
}
