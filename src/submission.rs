// src/submission.rs
//! Applying for a job.
//!
//! Validation runs before any request. A resume file is uploaded first and
//! the URL it returns is the only one placed in the application payload;
//! the form's own `resume_url` is used only when no file is attached.

use reqwest::Url;
use tracing::{error, info, warn};

use crate::core::api_client::FileUpload;
use crate::error::{ApiError, FieldError, Result};
use crate::services::CareerService;
use crate::types::{Application, ApplicationForm};

pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;
pub const RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

const MIN_PHONE_DIGITS: usize = 7;

#[derive(Debug, Clone)]
pub enum SubmissionState {
    Editing,
    Invalid(Vec<FieldError>),
    Submitting,
    Submitted(Application),
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionState::Submitted(_))
    }
}

fn blank_to_none(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Trimmed copy with blank fields dropped
pub fn normalize_form(form: &ApplicationForm) -> ApplicationForm {
    ApplicationForm {
        cover_letter: blank_to_none(&form.cover_letter),
        phone: blank_to_none(&form.phone),
        linkedin_url: blank_to_none(&form.linkedin_url),
        portfolio_url: blank_to_none(&form.portfolio_url),
        referral: blank_to_none(&form.referral),
        additional_info: blank_to_none(&form.additional_info),
        resume_url: blank_to_none(&form.resume_url),
    }
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Every problem with the form, or `Ok` when it may be sent
pub fn validate_submission(
    job_id: &str,
    form: &ApplicationForm,
    resume: Option<&FileUpload>,
) -> Result<()> {
    let form = normalize_form(form);
    let mut errors = Vec::new();

    if job_id.trim().is_empty() {
        errors.push(FieldError::new("job_id", "job id is required"));
    }

    match form.phone.as_deref() {
        None => errors.push(FieldError::new("phone", "phone number is required")),
        Some(phone) => {
            let allowed = phone
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            if !allowed || digits < MIN_PHONE_DIGITS {
                errors.push(FieldError::new("phone", "phone number is not valid"));
            }
        }
    }

    for (field, value) in [
        ("linkedin_url", &form.linkedin_url),
        ("portfolio_url", &form.portfolio_url),
    ] {
        if let Some(url) = value.as_deref() {
            if !is_web_url(url) {
                errors.push(FieldError::new(field, "must be a full http(s) link"));
            }
        }
    }

    match resume {
        Some(file) => {
            let extension_ok = file
                .extension()
                .map_or(false, |ext| RESUME_EXTENSIONS.contains(&ext.as_str()));
            if !extension_ok {
                errors.push(FieldError::new("resume", "resume must be a PDF or Word document"));
            }
            if file.bytes.is_empty() {
                errors.push(FieldError::new("resume", "resume file is empty"));
            } else if file.bytes.len() > MAX_RESUME_BYTES {
                errors.push(FieldError::new("resume", "resume must be 5 MB or smaller"));
            }
        }
        None if form.resume_url.is_none() => {
            errors.push(FieldError::new("resume", "resume required"));
        }
        None => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Validate, upload the resume if one is attached, then apply.
/// Returns the persisted application and the resume URL it was sent with.
pub async fn submit_application(
    service: &CareerService,
    job_id: &str,
    form: &ApplicationForm,
    resume: Option<FileUpload>,
) -> Result<(Application, String)> {
    validate_submission(job_id, form, resume.as_ref())?;
    let mut payload = normalize_form(form);

    let resume_url = match resume {
        Some(file) => service.upload_resume(file).await?.url,
        None => payload
            .resume_url
            .clone()
            .ok_or_else(|| ApiError::validation("resume", "resume required"))?,
    };
    payload.resume_url = Some(resume_url.clone());

    let application = service.apply(job_id.trim(), &payload).await?;
    info!(
        "Application {} submitted for job {}",
        application.id, job_id
    );
    Ok((application, resume_url))
}

/// Page-level state for the apply form
pub struct ApplicationFlow {
    service: CareerService,
    job_id: String,
    pub form: ApplicationForm,
    resume: Option<FileUpload>,
    state: SubmissionState,
}

impl ApplicationFlow {
    pub fn new(service: CareerService, job_id: impl Into<String>) -> Self {
        Self {
            service,
            job_id: job_id.into(),
            form: ApplicationForm::default(),
            resume: None,
            state: SubmissionState::Editing,
        }
    }

    pub fn with_form(mut self, form: ApplicationForm) -> Self {
        self.form = form;
        self
    }

    pub fn attach_resume(&mut self, file: FileUpload) {
        self.resume = Some(file);
        self.state = SubmissionState::Editing;
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub async fn submit(&mut self) -> &SubmissionState {
        if let Err(e) = validate_submission(&self.job_id, &self.form, self.resume.as_ref()) {
            warn!("Application for job {} not sent: {}", self.job_id, e);
            self.state = SubmissionState::Invalid(e.field_errors().to_vec());
            return &self.state;
        }

        self.state = SubmissionState::Submitting;
        let resume = self.resume.clone();

        match submit_application(&self.service, &self.job_id, &self.form, resume).await {
            Ok((application, resume_url)) => {
                self.form.resume_url = Some(resume_url);
                self.resume = None;
                self.state = SubmissionState::Submitted(application);
            }
            Err(ApiError::Validation(errors)) => {
                self.state = SubmissionState::Invalid(errors);
            }
            Err(e) => {
                error!("Application for job {} failed: {}", self.job_id, e);
                self.state = SubmissionState::Failed(e.user_message());
            }
        }

        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api_client::{ApiClient, Method, RequestBody};
    use crate::core::testing::MockTransport;
    use crate::error::GENERIC_ERROR_MESSAGE;
    use std::sync::Arc;

    fn service(transport: &Arc<MockTransport>) -> CareerService {
        CareerService::new(ApiClient::with_transport(transport.clone(), Some("user-token".into())))
    }

    fn filled_form() -> ApplicationForm {
        ApplicationForm {
            cover_letter: Some("I love Rust".into()),
            phone: Some("+234 801 234 5678".into()),
            linkedin_url: Some("https://linkedin.com/in/ada".into()),
            ..Default::default()
        }
    }

    fn application_json(resume_url: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "app-9",
            "job_id": "abc123",
            "status": "applied",
            "resume_url": resume_url
        })
    }

    fn field_names(state: &SubmissionState) -> Vec<&str> {
        match state {
            SubmissionState::Invalid(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            other => panic!("expected invalid state, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_resume_is_rejected_before_network() {
        let transport = MockTransport::new();
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(filled_form());

        let state = flow.submit().await;
        assert_eq!(field_names(state), vec!["resume"]);
        match flow.state() {
            SubmissionState::Invalid(errors) => assert_eq!(errors[0].message, "resume required"),
            _ => unreachable!(),
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_phone_makes_no_post() {
        let transport = MockTransport::new();
        let mut form = filled_form();
        form.phone = None;
        form.resume_url = Some("https://cdn/resume.pdf".into());
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(form);

        let state = flow.submit().await;
        assert_eq!(field_names(state), vec!["phone"]);
        assert_eq!(transport.count(Method::Post, "/careers/jobs/abc123/apply"), 0);
    }

    #[tokio::test]
    async fn test_uploaded_url_replaces_stale_value() {
        let transport = MockTransport::new()
            .respond_json(200, serde_json::json!({"url": "https://cdn/fresh.pdf"}))
            .respond_json(201, application_json("https://cdn/fresh.pdf"));

        let mut form = filled_form();
        form.resume_url = Some("https://cdn/stale.pdf".into());
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(form);
        flow.attach_resume(FileUpload::new("ada.pdf", b"%PDF-1.7".to_vec()));

        assert!(flow.submit().await.is_submitted());

        assert_eq!(transport.count(Method::Post, "/careers/upload/resume"), 1);
        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(
            &requests[0].body,
            Some(RequestBody::Multipart { field: "file", .. })
        ));

        let apply = &requests[1];
        assert_eq!(apply.path, "/careers/jobs/abc123/apply");
        let body = apply.json_body().unwrap();
        assert_eq!(body["resume_url"], "https://cdn/fresh.pdf");
        assert_eq!(body["job_id"], "abc123");
        assert_eq!(body["phone"], "+234 801 234 5678");
        assert_eq!(flow.form.resume_url.as_deref(), Some("https://cdn/fresh.pdf"));
    }

    #[tokio::test]
    async fn test_existing_resume_url_skips_upload() {
        let transport = MockTransport::new().respond_json(201, application_json("https://cdn/mine.pdf"));
        let mut form = filled_form();
        form.resume_url = Some("https://cdn/mine.pdf".into());

        let (application, url) = submit_application(&service(&transport), "abc123", &form, None)
            .await
            .unwrap();
        assert_eq!(application.id, "app-9");
        assert_eq!(url, "https://cdn/mine.pdf");
        assert_eq!(transport.count(Method::Post, "/careers/upload/resume"), 0);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_stops_before_apply() {
        let transport =
            MockTransport::new().respond(413, r#"{"detail": "File too large"}"#);
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(filled_form());
        flow.attach_resume(FileUpload::new("ada.docx", vec![0; 16]));

        match flow.submit().await {
            SubmissionState::Failed(message) => assert_eq!(message, "File too large"),
            other => panic!("unexpected state {:?}", other),
        }
        assert_eq!(transport.count(Method::Post, "/careers/jobs/abc123/apply"), 0);
        assert!(flow.form.resume_url.is_none());
    }

    #[tokio::test]
    async fn test_server_failure_without_message_is_generic() {
        let transport = MockTransport::new().respond(500, "Internal Server Error");
        let mut form = filled_form();
        form.resume_url = Some("https://cdn/mine.pdf".into());
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(form);

        match flow.submit().await {
            SubmissionState::Failed(message) => assert_eq!(message, GENERIC_ERROR_MESSAGE),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_shows_server_detail() {
        let transport =
            MockTransport::new().respond(401, r#"{"detail": "Your account is suspended"}"#);
        let mut form = filled_form();
        form.resume_url = Some("https://cdn/mine.pdf".into());
        let mut flow = ApplicationFlow::new(service(&transport), "abc123").with_form(form);

        match flow.submit().await {
            SubmissionState::Failed(message) => assert_eq!(message, "Your account is suspended"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_resume_file_rules() {
        let form = filled_form();
        let txt = FileUpload::new("resume.txt", vec![1]);
        let huge = FileUpload::new("resume.pdf", vec![0; MAX_RESUME_BYTES + 1]);

        assert!(validate_submission("j", &form, Some(&txt)).is_err());
        assert!(validate_submission("j", &form, Some(&huge)).is_err());
        assert!(validate_submission("j", &form, Some(&FileUpload::new("cv.DOC", vec![1]))).is_ok());
    }

    #[test]
    fn test_links_and_phone_rules() {
        let mut form = filled_form();
        form.resume_url = Some("https://cdn/r.pdf".into());
        form.portfolio_url = Some("ada.dev".into());
        form.phone = Some("12-34".into());

        let err = validate_submission("j", &form, None).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["phone", "portfolio_url"]);
    }

    #[test]
    fn test_blank_fields_are_dropped() {
        let form = ApplicationForm {
            cover_letter: Some("   ".into()),
            referral: Some(" Jane ".into()),
            ..Default::default()
        };
        let normalized = normalize_form(&form);
        assert!(normalized.cover_letter.is_none());
        assert_eq!(normalized.referral.as_deref(), Some("Jane"));
    }
}
