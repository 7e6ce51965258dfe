// src/services/admin.rs
//! Admin panel endpoints: users, jobs, applications, courses, lessons,
//! classes and the dashboard aggregates.

use tracing::{info, warn};

use crate::core::api_client::{segment, ApiClient};
use crate::core::query::ListQuery;
use crate::error::Result;
use crate::types::{
    Application, Class, ClassDraft, Course, CourseDraft, DashboardStats, Job, JobDraft, Lesson,
    Page, StatusUpdate, User, UserDraft,
};

const USERS_ENDPOINT: &str = "/admin/users";
const JOBS_ENDPOINT: &str = "/admin/careers/jobs";
const APPLICATIONS_ENDPOINT: &str = "/admin/careers/applications";
const COURSES_ENDPOINT: &str = "/admin/courses";
const CLASSES_ENDPOINT: &str = "/admin/classes";
const DASHBOARD_ENDPOINT: &str = "/admin/dashboard/stats";

fn item(base: &str, id: &str) -> String {
    format!("{}/{}", base, segment(id))
}

#[derive(Clone)]
pub struct AdminService {
    client: ApiClient,
}

impl AdminService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    // ===== Users =====

    pub async fn list_users(&self, query: &ListQuery) -> Result<Page<User>> {
        self.client.get_list(USERS_ENDPOINT, query).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        self.client.get(&item(USERS_ENDPOINT, user_id)).await
    }

    pub async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.post(USERS_ENDPOINT, &draft).await
    }

    pub async fn update_user(&self, user_id: &str, draft: &UserDraft) -> Result<User> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.put(&item(USERS_ENDPOINT, user_id), &draft).await
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.client.delete(&item(USERS_ENDPOINT, user_id)).await
    }

    // ===== Jobs =====

    pub async fn list_jobs(&self, query: &ListQuery) -> Result<Page<Job>> {
        self.client.get_list(JOBS_ENDPOINT, query).await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.client.get(&item(JOBS_ENDPOINT, job_id)).await
    }

    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.post(JOBS_ENDPOINT, &draft).await
    }

    pub async fn update_job(&self, job_id: &str, draft: &JobDraft) -> Result<Job> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.put(&item(JOBS_ENDPOINT, job_id), &draft).await
    }

    /// Toggle the publication flags. The whole record is re-sent, so the
    /// current version is fetched first.
    pub async fn set_job_flags(
        &self,
        job_id: &str,
        published: Option<bool>,
        featured: Option<bool>,
    ) -> Result<Job> {
        let current = self.get_job(job_id).await?;
        let mut draft = JobDraft::from(&current);
        if let Some(published) = published {
            draft.is_published = published;
        }
        if let Some(featured) = featured {
            draft.is_featured = featured;
        }
        self.update_job(job_id, &draft).await
    }

    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        self.client.delete(&item(JOBS_ENDPOINT, job_id)).await
    }

    // ===== Applications =====

    pub async fn list_applications(&self, query: &ListQuery) -> Result<Page<Application>> {
        self.client.get_list(APPLICATIONS_ENDPOINT, query).await
    }

    pub async fn get_application(&self, application_id: &str) -> Result<Application> {
        self.client
            .get(&item(APPLICATIONS_ENDPOINT, application_id))
            .await
    }

    /// Persist a review edit. The transition from `current.status` is
    /// checked before anything is sent.
    pub async fn update_application(
        &self,
        current: &Application,
        update: &StatusUpdate,
    ) -> Result<Application> {
        if let Err(e) = current.status.transition(update.status) {
            warn!("Refusing update of application {}: {}", current.id, e);
            return Err(e);
        }

        info!(
            "Application {}: {} -> {}",
            current.id, current.status, update.status
        );
        self.client
            .put(&item(APPLICATIONS_ENDPOINT, &current.id), update)
            .await
    }

    /// Fetch the current record, then apply `update` to it
    pub async fn set_application_status(
        &self,
        application_id: &str,
        update: &StatusUpdate,
    ) -> Result<Application> {
        let current = self.get_application(application_id).await?;
        self.update_application(&current, update).await
    }

    pub async fn delete_application(&self, application_id: &str) -> Result<()> {
        self.client
            .delete(&item(APPLICATIONS_ENDPOINT, application_id))
            .await
    }

    // ===== Courses & lessons =====

    pub async fn list_courses(&self, query: &ListQuery) -> Result<Page<Course>> {
        self.client.get_list(COURSES_ENDPOINT, query).await
    }

    pub async fn get_course(&self, course_id: &str) -> Result<Course> {
        self.client.get(&item(COURSES_ENDPOINT, course_id)).await
    }

    pub async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        self.client.post(COURSES_ENDPOINT, draft).await
    }

    pub async fn update_course(&self, course_id: &str, draft: &CourseDraft) -> Result<Course> {
        self.client.put(&item(COURSES_ENDPOINT, course_id), draft).await
    }

    pub async fn delete_course(&self, course_id: &str) -> Result<()> {
        self.client.delete(&item(COURSES_ENDPOINT, course_id)).await
    }

    /// Lessons sorted by their position in the course
    pub async fn list_lessons(&self, course_id: &str) -> Result<Vec<Lesson>> {
        let page: Page<Lesson> = self
            .client
            .get(&format!("{}/lessons", item(COURSES_ENDPOINT, course_id)))
            .await?;
        let mut lessons = page.items;
        lessons.sort_by_key(|lesson| lesson.order);
        Ok(lessons)
    }

    // ===== Classes =====

    pub async fn list_classes(&self, query: &ListQuery) -> Result<Page<Class>> {
        self.client.get_list(CLASSES_ENDPOINT, query).await
    }

    pub async fn get_class(&self, class_id: &str) -> Result<Class> {
        self.client.get(&item(CLASSES_ENDPOINT, class_id)).await
    }

    pub async fn create_class(&self, draft: &ClassDraft) -> Result<Class> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.post(CLASSES_ENDPOINT, &draft).await
    }

    pub async fn update_class(&self, class_id: &str, draft: &ClassDraft) -> Result<Class> {
        let draft = draft.normalized();
        draft.validate()?;
        self.client.put(&item(CLASSES_ENDPOINT, class_id), &draft).await
    }

    pub async fn delete_class(&self, class_id: &str) -> Result<()> {
        self.client.delete(&item(CLASSES_ENDPOINT, class_id)).await
    }

    // ===== Dashboard =====

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.client.get(DASHBOARD_ENDPOINT).await
    }
}
