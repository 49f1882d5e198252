//! Media record handlers

use super::tree_scope;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;
use webtrees_common::auth::Session;
use webtrees_common::errors::{AppError, Result};
use webtrees_common::records::{Record, RecordName};
use webtrees_common::MediaFile;

#[derive(Serialize)]
pub struct MediaResponse {
    pub xref: String,
    pub tree: String,
    pub names: Vec<RecordName>,
    pub files: Vec<MediaFileResponse>,
    /// Filename of the first image, if any file is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_image: Option<String>,
    pub note: String,
}

#[derive(Serialize)]
pub struct MediaFileResponse {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    pub mime_type: String,
    pub is_image: bool,
    pub is_external: bool,
}

fn present(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

impl From<&MediaFile> for MediaFileResponse {
    fn from(file: &MediaFile) -> Self {
        Self {
            filename: file.filename().to_string(),
            title: present(file.title()),
            format: present(file.format()),
            media_type: present(file.media_type()),
            mime_type: file.mime_type().to_string(),
            is_image: file.is_image(),
            is_external: file.is_external(),
        }
    }
}

/// Get a media object. Objects the viewer may not see are reported as
/// missing.
pub async fn get_media(
    State(state): State<AppState>,
    session: Session,
    Path((tree_name, xref)): Path<(String, String)>,
) -> Result<Json<MediaResponse>> {
    let scope = tree_scope(&state, &tree_name, session).await?;

    let not_found = || AppError::RecordNotFound { xref: xref.clone() };

    let media = scope.resolver.media(&xref).await?.ok_or_else(not_found)?;

    if !scope
        .resolver
        .can_show(&*media, scope.viewer.access_level())
        .await?
    {
        debug!(tree = %tree_name, xref = %xref, "Media hidden from viewer");
        return Err(not_found());
    }

    let files = media.media_files();

    Ok(Json(MediaResponse {
        xref: media.xref().to_string(),
        tree: scope.resolver.tree().name.clone(),
        names: media.all_names().to_vec(),
        files: files.iter().map(MediaFileResponse::from).collect(),
        first_image: media.first_image_file().map(|file| file.filename().to_string()),
        note: media.note(&scope.resolver).await?,
    }))
}
