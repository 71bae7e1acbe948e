use anyhow::Context;
use bytes::Bytes;
use uuid::Uuid;

use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug)]
pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Debug)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Objects of a user live under `uploads/<user_id>/`.
pub(crate) fn user_prefix(user_id: Uuid) -> String {
    format!("uploads/{}/", user_id)
}

pub(crate) fn object_key(user_id: Uuid, id: Uuid, ext: &str) -> String {
    format!("{}{}.{}", user_prefix(user_id), id, ext)
}

pub(crate) fn owns_key(user_id: Uuid, key: &str) -> bool {
    key.strip_prefix(&user_prefix(user_id))
        .is_some_and(|rest| !rest.is_empty() && !rest.contains('/') && !rest.contains(".."))
}

pub async fn store_image(
    st: &AppState,
    user_id: Uuid,
    item: UploadItem,
    ext: &str,
) -> anyhow::Result<StoredObject> {
    let key = object_key(user_id, Uuid::new_v4(), ext);
    st.storage
        .put_object(&key, item.body, &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    let url = st.storage.object_url(&key);
    Ok(StoredObject { key, url })
}

pub async fn remove_image(st: &AppState, key: &str) -> anyhow::Result<()> {
    st.storage
        .delete_object(key)
        .await
        .with_context(|| format!("delete_object {}", key))
}

#[cfg(test)]
mod image_tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), Some("heic"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn keys_are_scoped_per_user() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();
        let key = object_key(me, Uuid::new_v4(), "png");
        assert!(owns_key(me, &key));
        assert!(!owns_key(other, &key));
        assert!(!owns_key(me, &format!("uploads/{}/", me)));
        assert!(!owns_key(me, &format!("uploads/{}/../{}/x.png", me, other)));
    }

    #[tokio::test]
    async fn store_image_returns_public_url() {
        let state = AppState::fake();
        let me = Uuid::new_v4();
        let stored = store_image(
            &state,
            me,
            UploadItem {
                body: Bytes::from_static(b"\x89PNG"),
                content_type: "image/png".into(),
            },
            "png",
        )
        .await
        .unwrap();
        assert!(stored.key.starts_with(&format!("uploads/{}/", me)));
        assert!(stored.key.ends_with(".png"));
        assert_eq!(stored.url, format!("https://fake.local/{}", stored.key));
        remove_image(&state, &stored.key).await.unwrap();
    }
}
