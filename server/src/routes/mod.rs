use jirai_common::protocol::{
    CreateSessionRequest, ErrorKind, ErrorResponse, MineFieldSummary, SessionView, TouchRequest,
};
use rocket::{
    Request, State, catch, delete, get,
    http::Status,
    post, put,
    response::{self, Responder, status},
    serde::json::{self, Json},
};
use tracing::{debug, error, info, instrument, warn};

use crate::{error::Error, service::GameService};

/// What a handler can fail with, as seen by clients.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    ServerError(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound { .. } | Error::InvalidMove { .. } => Self::BadRequest(err.to_string()),
            Error::Capacity { .. } | Error::Unavailable { .. } => Self::ServerError(err.to_string()),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let (status, error, message) = match self {
            Self::BadRequest(message) => (Status::BadRequest, ErrorKind::BadRequest, message),
            Self::ServerError(message) => {
                error!("Server error on {}: {}", req.uri(), message);
                (Status::InternalServerError, ErrorKind::ServerError, message)
            }
        };
        status::Custom(status, Json(ErrorResponse { error, message })).respond_to(req)
    }
}

fn malformed(err: json::Error<'_>) -> ApiError {
    warn!("Malformed request body: {}", err);
    ApiError::BadRequest(format!("malformed request body: {err}"))
}

#[get("/minefields")]
pub fn list_fields(service: &State<GameService>) -> Json<Vec<MineFieldSummary>> {
    Json(service.list_fields())
}

#[get("/minefields/<id>")]
pub fn get_field(id: &str, service: &State<GameService>) -> Result<Json<MineFieldSummary>, ApiError> {
    Ok(Json(service.field(id)?))
}

#[post("/sessions", data = "<request>")]
#[instrument(level = "trace", skip_all)]
pub async fn create_session(
    request: Result<Json<CreateSessionRequest>, json::Error<'_>>,
    service: &State<GameService>,
) -> Result<Json<SessionView>, ApiError> {
    let request = request.map_err(malformed)?;
    info!("Session requested on field {}", request.field_id);

    let view = service.create_session(&request.field_id).await?;
    debug!("Session {} status {:?}", view.session_id, view.status);
    Ok(Json(view))
}

#[get("/sessions/<id>")]
pub async fn get_session(id: &str, service: &State<GameService>) -> Result<Json<SessionView>, ApiError> {
    Ok(Json(service.session(id).await?))
}

#[put("/sessions/<id>/touch", data = "<request>")]
#[instrument(level = "trace", skip(request, service))]
pub async fn touch_session(
    id: &str,
    request: Result<Json<TouchRequest>, json::Error<'_>>,
    service: &State<GameService>,
) -> Result<Json<SessionView>, ApiError> {
    let request = request.map_err(malformed)?;

    let view = service.touch_session(id, request.position).await?;
    debug!("Session {} status {:?}", id, view.status);
    Ok(Json(view))
}

#[delete("/sessions/<id>")]
pub fn delete_session(id: &str, service: &State<GameService>) -> Status {
    if service.end_session(id) {
        info!("Session {} ended by client", id);
    }
    Status::NoContent
}

/// Renders framework-level failures (unknown routes, bad methods, panics)
/// in the same JSON shape as handler errors.
#[catch(default)]
pub fn default_catcher(status: Status, req: &Request) -> status::Custom<Json<ErrorResponse>> {
    let error = if status.code >= 500 {
        ErrorKind::ServerError
    } else {
        ErrorKind::BadRequest
    };
    debug!("Caught {} for {} {}", status, req.method(), req.uri());

    status::Custom(
        status,
        Json(ErrorResponse {
            error,
            message: format!("{} {}: {}", req.method(), req.uri(), status),
        }),
    )
}
