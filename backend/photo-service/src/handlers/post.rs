use axum::{
    extract::{multipart::Field, Multipart, State},
    Json,
};
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::error::ApiError;
use crate::models::{Post, PostFields, SubmissionStage};
use crate::storage::{SpoolingUpload, TempUpload};
use crate::AppState;

const IMAGE_FIELD: &str = "imageFile";
const TEXT_FIELDS: [&str; 5] = ["user_id", "token", "password", "title", "comments"];

/// Handle a post submission
///
/// POST /api/post (multipart: imageFile, user_id, token, title, comments)
pub async fn submit_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Post>, ApiError> {
    debug!(stage = %SubmissionStage::Received, "Received post submission");

    // The spooled file is removed whenever `upload` is dropped, so every early
    // return below cleans up after itself.
    let (fields, upload) = read_submission(&state, &mut multipart).await?;

    fields.validate()?;
    let upload = upload.ok_or_else(|| ApiError::BadRequest("No image file provided".to_string()))?;

    let result = persist(&state, fields, &upload).await;

    debug!(stage = %SubmissionStage::Cleanup);
    upload.discard();

    let post = result?;
    info!(stage = %SubmissionStage::Done, post_id = %post.id, image = %post.image_url, "Post created");
    Ok(Json(post))
}

/// Drain the multipart body: text fields into [`PostFields`], the image into a
/// temp file.
///
/// The credential is checked as soon as `user_id` and `token` have both
/// arrived, and again at the end if they never did. Until it passes, a broken
/// body answers 401, and an image that arrived first has its upload error held
/// back until the credential is known.
async fn read_submission(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<(PostFields, Option<TempUpload>), ApiError> {
    let mut fields = PostFields::default();
    let mut upload = None;
    let mut held = None;
    let mut authenticated = false;

    loop {
        let mut field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(unless_authenticated(authenticated, e.into())),
        };
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            IMAGE_FIELD => match spool_image(state, &mut field).await {
                Ok(received) => upload = Some(received),
                Err(e) if authenticated => return Err(e),
                Err(e) => held = Some(e),
            },
            name if TEXT_FIELDS.contains(&name) => {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => return Err(unless_authenticated(authenticated, e.into())),
                };
                match name {
                    "title" => fields.title = value,
                    "comments" => fields.comments = value,
                    "user_id" => {
                        fields.user_id = value;
                        authenticated = false;
                    }
                    // `password` is what older clients call the token
                    _ => {
                        fields.token = value;
                        authenticated = false;
                    }
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }

        if !authenticated && !fields.user_id.is_empty() && !fields.token.is_empty() {
            authenticate(state, &fields)?;
            authenticated = true;
        }
    }

    if !authenticated {
        authenticate(state, &fields)?;
    }
    if let Some(e) = held {
        return Err(e);
    }

    Ok((fields, upload))
}

async fn spool_image(state: &AppState, field: &mut Field<'_>) -> Result<TempUpload, ApiError> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut spool = SpoolingUpload::create(&state.temp_dir, &content_type, state.max_upload_bytes)?;
    while let Some(chunk) = field.chunk().await? {
        spool.write(&chunk).await?;
    }
    let received = spool.finish().await?;

    debug!(
        "Image received: filename={:?}, size={} bytes, content_type={}",
        field.file_name(),
        received.size,
        received.mimetype
    );
    Ok(received)
}

fn authenticate(state: &AppState, fields: &PostFields) -> Result<(), ApiError> {
    debug!(stage = %SubmissionStage::Authenticating, user_id = %fields.user_id);

    if state.sessions.authenticate(&fields.user_id, &fields.token) {
        Ok(())
    } else {
        warn!("Post submission rejected for {:?}", fields.user_id);
        Err(no_credential())
    }
}

fn unless_authenticated(authenticated: bool, err: ApiError) -> ApiError {
    if authenticated {
        err
    } else {
        debug!("Unreadable submission before authentication: {}", err);
        no_credential()
    }
}

fn no_credential() -> ApiError {
    ApiError::Unauthorized("No credential provided".to_string())
}

/// Upload the blob, then record its document. A blob whose document cannot be
/// written is deleted again.
async fn persist(state: &AppState, fields: PostFields, upload: &TempUpload) -> Result<Post, ApiError> {
    let key = upload.generated_filename.as_str();

    debug!(stage = %SubmissionStage::PersistingBlob, key);
    state
        .blobs
        .put_object(key, upload.path(), &upload.mimetype, upload.size)
        .await?;

    let post = Post::new(fields.title, fields.comments, state.blobs.public_url(key));

    debug!(stage = %SubmissionStage::PersistingMetadata, post_id = %post.id);
    if let Err(e) = state.posts.insert_post(&post).await {
        error!("Failed to insert post document: {}", e);

        if let Err(delete_err) = state.blobs.delete_object(key).await {
            error!("Failed to roll back uploaded object {}: {}", key, delete_err);
        }

        return Err(e.into());
    }

    Ok(post)
}
