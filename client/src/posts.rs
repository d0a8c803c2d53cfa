//! Content record CRUD over `/posts/`.

use std::sync::Arc;

use studioflow_types::{NewPost, Post, PostFilter, PostId, PostPatch};

use crate::dispatch::{Dispatch, fetch_json};
use crate::error::DispatchError;
use crate::request::RequestDescriptor;

pub const POSTS_PATH: &str = "/posts/";

fn post_path(id: PostId) -> String {
    format!("/posts/{id}")
}

#[derive(Clone)]
pub struct PostsClient {
    dispatcher: Arc<dyn Dispatch>,
}

impl PostsClient {
    pub(crate) fn new(dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { dispatcher }
    }

    pub async fn create(&self, post: &NewPost) -> Result<Post, DispatchError> {
        let request = RequestDescriptor::post(POSTS_PATH).with_json(post)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DispatchError> {
        let mut request = RequestDescriptor::get(POSTS_PATH);
        if let Some(status) = filter.status.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.with_query("status", status);
        }
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    pub async fn get(&self, id: PostId) -> Result<Post, DispatchError> {
        fetch_json(self.dispatcher.as_ref(), RequestDescriptor::get(post_path(id))).await
    }

    pub async fn update(&self, id: PostId, patch: &PostPatch) -> Result<Post, DispatchError> {
        let request = RequestDescriptor::patch(post_path(id)).with_json(patch)?;
        fetch_json(self.dispatcher.as_ref(), request).await
    }

    pub async fn delete(&self, id: PostId) -> Result<(), DispatchError> {
        self.dispatcher
            .send(RequestDescriptor::delete(post_path(id)))
            .await
            .map(|_| ())
    }
}
