use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use cardstock_core::OrgId;

use crate::app::errors::json_error;
use crate::context::OrgContext;

pub const ORG_HEADER: &str = "x-org-id";

#[derive(Debug, Default, Deserialize)]
struct OrgQuery {
    #[serde(rename = "orgId")]
    org_id: Option<String>,
}

/// Resolve the caller's organization and attach an [`OrgContext`].
///
/// The `X-Org-Id` header wins over the `orgId` query parameter. Requests with
/// neither are rejected; there is no default organization.
pub async fn org_context_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let raw = match header_org(req.headers())? {
        Some(raw) => raw,
        None => Query::<OrgQuery>::try_from_uri(req.uri())
            .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()))?
            .0
            .org_id
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                json_error(
                    StatusCode::BAD_REQUEST,
                    "missing_org",
                    "organization id required (X-Org-Id header or orgId query parameter)",
                )
            })?,
    };

    let org_id = parse_org_id(&raw)?;
    req.extensions_mut().insert(OrgContext::new(org_id));

    Ok(next.run(req).await)
}

fn header_org(headers: &HeaderMap) -> Result<Option<String>, Response> {
    let Some(value) = headers.get(ORG_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| {
            json_error(StatusCode::BAD_REQUEST, "invalid_org", "X-Org-Id is not valid text")
        })?
        .trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(value.to_string()))
}

/// Parse an organization id, answering 400 `invalid_org` on failure.
pub fn parse_org_id(raw: &str) -> Result<OrgId, Response> {
    raw.parse::<OrgId>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_org", e.to_string()))
}

/// A request body may restate its org; it must match the resolved one.
pub fn ensure_body_org(ctx: &OrgContext, body_org: Option<&str>) -> Result<(), Response> {
    let Some(raw) = body_org.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(());
    };
    if parse_org_id(raw)? != ctx.org_id() {
        return Err(json_error(
            StatusCode::BAD_REQUEST,
            "org_mismatch",
            "orgId in body does not match the request organization",
        ));
    }
    Ok(())
}
