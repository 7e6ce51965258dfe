// src/services/career.rs
//! Public job board: listings, job detail, resume upload and applying

use tracing::info;

use crate::core::api_client::{segment, ApiClient, FileUpload};
use crate::core::query::ListQuery;
use crate::error::Result;
use crate::types::{Application, ApplicationForm, ApplicationPayload, Job, Page, UploadResponse};

const JOBS_ENDPOINT: &str = "/careers/jobs";
const RESUME_UPLOAD_ENDPOINT: &str = "/careers/upload/resume";
const MY_APPLICATIONS_ENDPOINT: &str = "/careers/applications/me";

#[derive(Clone)]
pub struct CareerService {
    client: ApiClient,
}

impl CareerService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_jobs(&self, query: &ListQuery) -> Result<Page<Job>> {
        self.client.get_list(JOBS_ENDPOINT, query).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.client
            .get(&format!("{}/{}", JOBS_ENDPOINT, segment(job_id)))
            .await
    }

    pub async fn upload_resume(&self, file: FileUpload) -> Result<UploadResponse> {
        info!(
            "Uploading resume {} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );
        self.client.upload(RESUME_UPLOAD_ENDPOINT, file).await
    }

    /// Raw POST of an already-resolved application. Use
    /// `submission::ApplicationFlow` for the validated upload-then-apply path.
    pub async fn apply(&self, job_id: &str, form: &ApplicationForm) -> Result<Application> {
        let payload = ApplicationPayload {
            form: form.clone(),
            job_id: job_id.to_string(),
        };
        self.client
            .post(
                &format!("{}/{}/apply", JOBS_ENDPOINT, segment(job_id)),
                &payload,
            )
            .await
    }

    pub async fn my_applications(&self, query: &ListQuery) -> Result<Page<Application>> {
        self.client.get_list(MY_APPLICATIONS_ENDPOINT, query).await
    }
}
