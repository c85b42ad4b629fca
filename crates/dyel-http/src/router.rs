//! Request routing and error-to-status mapping.

use dyel_core::ProgramDraft;
use dyel_db::{CallContext, ErrorKind, ProgramRepository, RepoError};
use serde::Serialize;
use serde_json::{Value, json};

/// Mount point of the Program resource.
pub const PROGRAMS_PATH: &str = "/api/v1/programs";

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status,
                body: Some(body),
            },
            Err(e) => Self::error(500, &format!("failed to encode response: {e}")),
        }
    }

    fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub(crate) fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(json!({ "error": message })),
        }
    }
}

/// HTTP status for a repository failure.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::Validation => 400,
        ErrorKind::NotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::Storage => 500,
        ErrorKind::Canceled => 503,
    }
}

impl From<RepoError> for ApiResponse {
    fn from(err: RepoError) -> Self {
        let status = status_for(err.kind());
        if let RepoError::Storage(ref source) = err {
            tracing::error!(error = %source, "storage failure");
            return Self::error(status, "internal storage error");
        }
        Self::error(status, &err.to_string())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Collection,
    Item(String),
}

fn route(url: &str) -> Option<Route> {
    let path = url.split('?').next().unwrap_or_default();
    let path = path.strip_suffix('/').unwrap_or(path);
    let rest = path.strip_prefix(PROGRAMS_PATH)?;
    if rest.is_empty() {
        return Some(Route::Collection);
    }
    let id = rest.strip_prefix('/')?;
    if id.is_empty() || id.contains('/') {
        return None;
    }
    let id = urlencoding::decode(id).ok()?;
    Some(Route::Item(id.into_owned()))
}

fn parse_draft(body: &[u8]) -> Result<ProgramDraft, ApiResponse> {
    serde_json::from_slice(body)
        .map_err(|e| ApiResponse::error(400, &format!("invalid JSON body: {e}")))
}

/// Dispatch one request.
///
/// `PUT` on an item takes its id from the path; an id in the body is ignored.
pub async fn handle<R: ProgramRepository>(
    repo: &R,
    ctx: &CallContext,
    method: &str,
    url: &str,
    body: &[u8],
) -> ApiResponse {
    let Some(route) = route(url) else {
        return ApiResponse::error(404, "not found");
    };

    match (method, route) {
        ("GET", Route::Collection) => match repo.list(ctx).await {
            Ok(programs) => ApiResponse::json(200, &programs),
            Err(e) => e.into(),
        },
        ("POST", Route::Collection) => {
            let draft = match parse_draft(body) {
                Ok(draft) => draft,
                Err(response) => return response,
            };
            match repo.create(ctx, draft).await {
                Ok(program) => ApiResponse::json(201, &program),
                Err(e) => e.into(),
            }
        }
        ("GET", Route::Item(id)) => match repo.get(ctx, &id).await {
            Ok(program) => ApiResponse::json(200, &program),
            Err(e) => e.into(),
        },
        ("PUT", Route::Item(id)) => {
            let mut draft = match parse_draft(body) {
                Ok(draft) => draft,
                Err(response) => return response,
            };
            draft.id = Some(id);
            match repo.update(ctx, draft).await {
                Ok(program) => ApiResponse::json(200, &program),
                Err(e) => e.into(),
            }
        }
        ("DELETE", Route::Item(id)) => match repo.delete(ctx, &id).await {
            Ok(()) => ApiResponse::empty(204),
            Err(e) => e.into(),
        },
        _ => ApiResponse::error(405, "method not allowed"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/api/v1/programs", Some(Route::Collection))]
    #[case("/api/v1/programs/", Some(Route::Collection))]
    #[case("/api/v1/programs?limit=5", Some(Route::Collection))]
    #[case("/api/v1/programs/abc", Some(Route::Item("abc".into())))]
    #[case("/api/v1/programs/a%20b", Some(Route::Item("a b".into())))]
    #[case("/api/v1/programs/abc/days", None)]
    #[case("/api/v1/programsx", None)]
    #[case("/", None)]
    fn routes(#[case] url: &str, #[case] expected: Option<Route>) {
        assert_eq!(route(url), expected);
    }

    #[rstest]
    #[case(ErrorKind::Validation, 400)]
    #[case(ErrorKind::NotFound, 404)]
    #[case(ErrorKind::Conflict, 409)]
    #[case(ErrorKind::Storage, 500)]
    #[case(ErrorKind::Canceled, 503)]
    fn status_mapping(#[case] kind: ErrorKind, #[case] status: u16) {
        assert_eq!(status_for(kind), status);
    }

    #[test]
    fn storage_errors_hide_details() {
        let err = RepoError::Storage(dyel_db::DatabaseError::Query("disk I/O".into()));
        let response = ApiResponse::from(err);
        assert_eq!(response.status, 500);
        assert_eq!(
            response.body,
            Some(json!({ "error": "internal storage error" }))
        );
    }
}
