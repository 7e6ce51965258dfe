// src/services/blog.rs
use crate::core::api_client::{segment, ApiClient, FileUpload};
use crate::core::query::ListQuery;
use crate::error::{ApiError, Result};
use crate::types::{BlogCategory, BlogPost, Page, PostDraft, UploadResponse};

const POSTS_ENDPOINT: &str = "/blog/posts";
const CATEGORIES_ENDPOINT: &str = "/admin/blog/categories";
const IMAGE_UPLOAD_ENDPOINT: &str = "/upload/image";

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

#[derive(Clone)]
pub struct BlogService {
    client: ApiClient,
}

impl BlogService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_posts(&self, query: &ListQuery) -> Result<Page<BlogPost>> {
        self.client.get_list(POSTS_ENDPOINT, query).await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<BlogPost> {
        self.client
            .get(&format!("{}/{}", POSTS_ENDPOINT, segment(post_id)))
            .await
    }

    pub async fn get_post_by_slug(&self, slug: &str) -> Result<BlogPost> {
        self.client
            .get(&format!("{}/slug/{}", POSTS_ENDPOINT, segment(slug)))
            .await
    }

    pub async fn create_post(&self, draft: PostDraft) -> Result<BlogPost> {
        let draft = validate(draft)?;
        self.client.post(POSTS_ENDPOINT, &draft).await
    }

    pub async fn update_post(&self, post_id: &str, draft: PostDraft) -> Result<BlogPost> {
        let draft = validate(draft)?;
        self.client
            .put(&format!("{}/{}", POSTS_ENDPOINT, segment(post_id)), &draft)
            .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.client
            .delete(&format!("{}/{}", POSTS_ENDPOINT, segment(post_id)))
            .await
    }

    pub async fn categories(&self) -> Result<Vec<BlogCategory>> {
        let page: Page<BlogCategory> = self.client.get(CATEGORIES_ENDPOINT).await?;
        Ok(page.items)
    }

    /// Featured images and inline editor images
    pub async fn upload_image(&self, file: FileUpload) -> Result<UploadResponse> {
        match file.extension() {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => {}
            _ => {
                return Err(ApiError::validation(
                    "file",
                    format!("unsupported image type: {}", file.file_name),
                ))
            }
        }
        self.client.upload(IMAGE_UPLOAD_ENDPOINT, file).await
    }
}

fn validate(draft: PostDraft) -> Result<PostDraft> {
    if draft.title.trim().is_empty() {
        return Err(ApiError::validation("title", "title is required"));
    }
    Ok(draft.with_default_slug())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api_client::{Method, RequestBody};
    use crate::core::testing::MockTransport;

    fn draft(title: &str) -> PostDraft {
        PostDraft {
            title: title.to_string(),
            slug: None,
            excerpt: None,
            content: "<p>Body</p>".into(),
            category: Some("News".into()),
            tags: vec!["hiring".into()],
            featured_image: None,
            is_published: true,
        }
    }

    #[tokio::test]
    async fn test_create_post_fills_slug() {
        let transport = MockTransport::new().respond_json(
            200,
            serde_json::json!({"id": "p1", "title": "We Are Hiring", "slug": "we-are-hiring"}),
        );
        let service = BlogService::new(ApiClient::with_transport(transport.clone(), None));

        let post = service.create_post(draft("We Are Hiring")).await.unwrap();
        assert_eq!(post.slug, "we-are-hiring");
        assert_eq!(
            transport.only_request().json_body().unwrap()["slug"],
            "we-are-hiring"
        );
    }

    #[tokio::test]
    async fn test_untitled_post_is_rejected_locally() {
        let transport = MockTransport::new();
        let service = BlogService::new(ApiClient::with_transport(transport.clone(), None));
        assert!(service.create_post(draft("  ")).await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_upload_image_uses_file_field() {
        let transport =
            MockTransport::new().respond_json(200, serde_json::json!({"url": "https://cdn/i.png"}));
        let service = BlogService::new(ApiClient::with_transport(transport.clone(), None));

        let uploaded = service
            .upload_image(FileUpload::new("cover.png", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(uploaded.url, "https://cdn/i.png");

        let request = transport.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/upload/image");
        match request.body {
            Some(RequestBody::Multipart { field, file }) => {
                assert_eq!(field, "file");
                assert_eq!(file.content_type, "image/png");
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_rejects_non_images() {
        let transport = MockTransport::new();
        let service = BlogService::new(ApiClient::with_transport(transport.clone(), None));
        assert!(service
            .upload_image(FileUpload::new("notes.txt", vec![]))
            .await
            .is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_categories_accept_envelope() {
        let transport = MockTransport::new().respond_json(
            200,
            serde_json::json!({"categories": [{"id": "c1", "name": "Careers"}]}),
        );
        let service = BlogService::new(ApiClient::with_transport(transport, None));
        let categories = service.categories().await.unwrap();
        assert_eq!(categories[0].name, "Careers");
    }
}
