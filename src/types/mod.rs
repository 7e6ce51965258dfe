// src/types/mod.rs
//! Records exchanged with the careers / learning backend

pub mod application;
pub mod blog;
pub mod course;
pub mod job;
pub mod response;
pub mod timestamp;
pub mod user;

pub use application::{
    ApplicantRef, Application, ApplicationForm, ApplicationPayload, ApplicationStatus,
    StatusUpdate,
};
pub use blog::{Author, BlogCategory, BlogPost, PostDraft};
pub use course::{Class, ClassDraft, Course, CourseDraft, Lesson};
pub use job::{EmploymentType, ExperienceLevel, Job, JobDraft, Location};
pub use response::{DashboardStats, LoginResponse, Page, StatusBreakdown, UploadResponse};
pub use user::{User, UserDraft, UserRole};
