//! OPML export handler

use std::collections::HashSet;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::error::AppError;
use crate::feed::render_opml;
use crate::AppState;

use super::public_base_url;

/// Request body for POST /api/opml
#[derive(Debug, Default, Deserialize)]
pub struct OpmlRequest {
    /// Restrict the export to these puids; absent means every visible account
    #[serde(default)]
    pub puids: Option<Vec<String>>,
}

/// POST /api/opml
///
/// Returns an OPML subscription list as a file download. The body is optional.
pub async fn export_opml(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: OpmlRequest = if body.iter().all(u8::is_ascii_whitespace) {
        OpmlRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::BadRequest(e.to_string()))?
    };

    let mut accounts = state.identities.accounts();
    if let Some(puids) = request.puids {
        let wanted: HashSet<String> = puids.into_iter().collect();
        accounts.retain(|account| wanted.contains(account.key.as_str()));
    }

    let opml = render_opml(&accounts, &public_base_url(&state.config, &headers));
    Ok((
        [
            (header::CONTENT_TYPE, "text/x-opml; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=wechat-mp-feeds.opml",
            ),
        ],
        opml,
    )
        .into_response())
}
