//! HTTP surface for report metadata, execution and templates.
//!
//! | Route                      | Handler                          |
//! |----------------------------|----------------------------------|
//! | `GET /reports/meta`        | entity list or one entity's keys |
//! | `POST /reports/run`        | compile and run one page         |
//! | `POST /reports/templates`  | save a template (201)            |
//! | `GET /reports/templates`   | list templates, newest first     |
//! | `GET /health`              | liveness                         |

mod error;
mod handlers;
mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{router, serve, AppState};
