//! Upload and post endpoints.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use uuid::Uuid;

use pixpost_core::DeleteOutcome;
use pixpost_core::domain::{MediaFile, Post};
use pixpost_shared::MessageResponse;
use pixpost_shared::dto::PostResponse;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        caption: post.caption,
        url: post.url,
        file_type: post.file_type,
        file_name: post.file_name,
        created_at: post.created_at,
        user_id: post.user_id,
    }
}

fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid post ID".to_string()))
}

/// Drain a field into memory, failing once `limit` is exceeded.
async fn read_field(field: &mut Field, limit: usize) -> AppResult<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(AppError::PayloadTooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

/// The `file` and `caption` parts of an upload form.
struct UploadForm {
    file: Option<MediaFile>,
    caption: Option<String>,
}

async fn read_upload_form(mut payload: Multipart, limit: usize) -> AppResult<UploadForm> {
    let mut form = UploadForm {
        file: None,
        caption: None,
    };

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let content_type = field.content_type().map(|m| m.essence_str().to_string());
                let bytes = read_field(&mut field, limit).await?;
                form.file = Some(MediaFile::new(file_name, content_type, bytes));
            }
            Some("caption") => {
                let bytes = read_field(&mut field, limit).await?;
                let caption = String::from_utf8(bytes.to_vec())
                    .map_err(|_| AppError::BadRequest("Caption must be UTF-8".to_string()))?;
                form.caption = Some(caption);
            }
            other => {
                // Unknown parts still have to be consumed.
                tracing::debug!(field = ?other, "Ignoring multipart field");
                read_field(&mut field, limit).await?;
            }
        }
    }

    Ok(form)
}

/// POST /upload
pub async fn upload(
    state: web::Data<AppState>,
    identity: Identity,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let form = read_upload_form(payload, state.max_upload_bytes).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::BadRequest("A file part is required".to_string()))?;
    if file.file_name.trim().is_empty() {
        return Err(AppError::BadRequest("The file needs a name".to_string()));
    }

    let post = state
        .posts
        .create_post(file, form.caption, &identity.caller())
        .await?;

    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// GET /posts/
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_posts().await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/me
pub async fn list_mine(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.list_posts_by_user(identity.user.id).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /posts/{post_id}
pub async fn get(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let post = state.posts.get_post(post_id).await?;
    Ok(HttpResponse::Ok().json(to_response(post)))
}

/// DELETE /posts/{post_id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;

    match state.posts.delete_post(post_id, &identity.caller()).await? {
        DeleteOutcome::Deleted => {
            Ok(HttpResponse::Ok().json(MessageResponse::new("Post deleted successfully")))
        }
        DeleteOutcome::NotFound => Err(AppError::NotFound("Post not found".to_string())),
    }
}
