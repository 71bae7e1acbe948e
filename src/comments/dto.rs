use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Comment;
use crate::error::{required, ApiError, Validate};

pub const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: Option<String>,
}

impl Validate for CreateCommentRequest {
    type Output = String;

    fn validate(self) -> Result<String, ApiError> {
        let body = required("body", self.body)?;
        if body.chars().count() > MAX_COMMENT_LEN {
            return Err(ApiError::validation(format!(
                "body must be at most {MAX_COMMENT_LEN} characters"
            )));
        }
        Ok(body)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub catch_id: Uuid,
    pub user_id: Uuid,
    pub author_name: Option<String>,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Comment> for CommentResponse {
    fn from(c: Comment) -> Self {
        Self {
            id: c.id,
            catch_id: c.catch_id,
            user_id: c.user_id,
            author_name: c.author_name,
            body: c.body,
            created_at: c.created_at,
        }
    }
}
