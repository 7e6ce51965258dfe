// src/cli.rs
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::core::api_client::{ApiClient, FileUpload};
use crate::core::query::{ListQuery, SortOrder};
use crate::core::session::SessionStore;
use crate::error::ApiError;
use crate::format::format_timestamp;
use crate::listing::ListPage;
use crate::output::{print_record, print_rows, read_payload, OutputFormat};
use crate::services::{AdminService, AuthService, BlogService, CareerService};
use crate::submission::{ApplicationFlow, SubmissionState};
use crate::types::{
    timestamp, ApplicationForm, ApplicationStatus, EmploymentType, ExperienceLevel, StatusBreakdown,
    StatusUpdate, UserRole,
};

#[derive(Parser)]
#[command(name = "careerhub")]
#[command(about = "Careers, learning and blog administration client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format for list and show commands
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Browse published jobs
    #[command(subcommand)]
    Jobs(JobsCommand),
    /// Apply for a job
    Apply(ApplyArgs),
    /// Applications submitted by the signed-in user
    MyApplications(ListArgs),
    /// Administration
    #[command(subcommand)]
    Admin(AdminCommand),
    /// Blog posts
    #[command(subcommand)]
    Blog(BlogCommand),
    /// Admin dashboard counters
    Dashboard,
}

#[derive(Subcommand)]
pub enum JobsCommand {
    List(ListArgs),
    Show { id: String },
}

#[derive(Args, Clone, Default)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = crate::core::query::DEFAULT_PAGE_SIZE)]
    pub per_page: u32,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub remote: Option<bool>,
    #[arg(long, value_parser = parse_employment_type)]
    pub employment_type: Option<EmploymentType>,
    #[arg(long, value_parser = parse_experience_level)]
    pub experience_level: Option<ExperienceLevel>,
    #[arg(long)]
    pub status: Option<ApplicationStatus>,
    #[arg(long)]
    pub role: Option<UserRole>,
    #[arg(long)]
    pub job_id: Option<String>,
    #[arg(long)]
    pub sort_by: Option<String>,
    #[arg(long)]
    pub sort_order: Option<SortOrder>,
}

impl ListArgs {
    pub fn to_query(&self) -> ListQuery {
        let mut query = ListQuery::new().paged(self.page, self.per_page);
        query.category = self.category.clone();
        query.search = self.search.clone();
        query.location = self.location.clone();
        query.remote = self.remote;
        query.employment_type = self.employment_type;
        query.experience_level = self.experience_level;
        query.status = self.status;
        query.role = self.role;
        query.job_id = self.job_id.clone();
        query.sort_by = self.sort_by.clone();
        query.sort_order = self.sort_order;
        query
    }
}

fn parse_employment_type(value: &str) -> std::result::Result<EmploymentType, String> {
    EmploymentType::ALL
        .into_iter()
        .find(|t| t.as_str() == value.trim().to_lowercase())
        .ok_or_else(|| format!("unknown employment type '{}'", value))
}

fn parse_experience_level(value: &str) -> std::result::Result<ExperienceLevel, String> {
    ExperienceLevel::ALL
        .into_iter()
        .find(|l| l.as_str() == value.trim().to_lowercase())
        .ok_or_else(|| format!("unknown experience level '{}'", value))
}

#[derive(Args)]
pub struct ApplyArgs {
    pub job_id: String,
    #[arg(long)]
    pub phone: Option<String>,
    /// Resume file to upload (pdf, doc, docx)
    #[arg(long)]
    pub resume: Option<PathBuf>,
    /// Already-hosted resume, used when no file is given
    #[arg(long)]
    pub resume_url: Option<String>,
    #[arg(long)]
    pub cover_letter_file: Option<PathBuf>,
    #[arg(long)]
    pub linkedin: Option<String>,
    #[arg(long)]
    pub portfolio: Option<String>,
    #[arg(long)]
    pub referral: Option<String>,
    #[arg(long)]
    pub additional_info: Option<String>,
}

/// Shared shape of the admin record commands
#[derive(Subcommand)]
pub enum CrudCommand {
    List(ListArgs),
    Show {
        id: String,
    },
    /// Create from a json / yaml / toml payload file
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    #[command(subcommand)]
    Users(CrudCommand),
    #[command(subcommand)]
    Jobs(AdminJobsCommand),
    #[command(subcommand)]
    Applications(ApplicationsCommand),
    #[command(subcommand)]
    Courses(CrudCommand),
    /// Lessons of a course, in order
    Lessons { course_id: String },
    #[command(subcommand)]
    Classes(CrudCommand),
    /// Blog categories
    Categories,
}

#[derive(Subcommand)]
pub enum AdminJobsCommand {
    #[command(flatten)]
    Record(CrudCommand),
    /// Toggle the published / featured flags
    Flags {
        id: String,
        #[arg(long)]
        published: Option<bool>,
        #[arg(long)]
        featured: Option<bool>,
    },
}

#[derive(Subcommand)]
pub enum ApplicationsCommand {
    List(ListArgs),
    Show {
        id: String,
    },
    /// Move an application along its review lifecycle
    SetStatus {
        id: String,
        status: ApplicationStatus,
        #[arg(long)]
        interview_date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum BlogCommand {
    List(ListArgs),
    Show {
        id: String,
        /// Treat the argument as a slug
        #[arg(long)]
        slug: bool,
    },
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    Delete {
        id: String,
    },
    UploadImage {
        path: PathBuf,
    },
}

/// Build a client from the stored session. Commands that need a signed-in
/// user fail early; public ones fall back to anonymous access.
fn open_client(config: &ClientConfig, require_auth: bool) -> Result<ApiClient> {
    let store = SessionStore::new(&config.session_path);
    let session = store.load()?;

    let token = match session {
        Some(session) => match session.bearer_token(Utc::now()) {
            Ok(token) => Some(token.to_string()),
            Err(ApiError::SessionExpired) => {
                store.clear()?;
                if require_auth {
                    return Err(ApiError::SessionExpired.into());
                }
                warn!("Continuing without the expired session");
                None
            }
            Err(e) => return Err(e.into()),
        },
        None => None,
    };

    if require_auth && token.is_none() {
        anyhow::bail!("Not signed in. Run `careerhub login <email> --password <password>` first.");
    }

    Ok(ApiClient::new(config, token)?)
}

async fn list_into<T, F>(query: &ListQuery, fetch: F, format: OutputFormat) -> Result<()>
where
    T: crate::output::Tabular + serde::Serialize,
    F: std::future::Future<Output = crate::error::Result<crate::types::Page<T>>>,
    ListQuery: crate::core::query::RowFilter<T>,
{
    let mut page = ListPage::new();
    page.load(query, fetch).await;

    if let Some(message) = page.error {
        anyhow::bail!(message);
    }

    print_rows(&page.items, format)?;
    if format == OutputFormat::Table && page.total_pages > 1 {
        println!(
            "\nPage {} of {} ({} total)",
            page.current_page, page.total_pages, page.total
        );
    }
    Ok(())
}

pub async fn run(cli: Cli, config: &ClientConfig) -> Result<()> {
    let format = cli.format;

    match cli.command {
        Command::Login { email, password } => {
            let auth = AuthService::new(ApiClient::new(config, None)?);
            let session = auth.login(&email, &password).await?;
            SessionStore::new(&config.session_path).save(&session)?;
            let name = session
                .user
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or(email);
            println!("✅ Signed in as {}", name);
        }

        Command::Logout => {
            if SessionStore::new(&config.session_path).clear()? {
                println!("✅ Signed out");
            } else {
                println!("No stored session");
            }
        }

        Command::Whoami => handle_whoami(config)?,

        Command::Jobs(command) => {
            let careers = CareerService::new(open_client(config, false)?);
            match command {
                JobsCommand::List(args) => {
                    let query = args.to_query();
                    list_into(&query, careers.list_jobs(&query), format).await?;
                }
                JobsCommand::Show { id } => {
                    let job = careers.get_job(&id).await?;
                    print_record(&job, format)?;
                    if format == OutputFormat::Table && !job.description.is_empty() {
                        println!("\n{}", crate::format::html_excerpt(&job.description, 2000));
                    }
                }
            }
        }

        Command::Apply(args) => handle_apply(config, args).await?,

        Command::MyApplications(args) => {
            let careers = CareerService::new(open_client(config, true)?);
            let query = args.to_query();
            list_into(&query, careers.my_applications(&query), format).await?;
        }

        Command::Admin(command) => {
            let admin = AdminService::new(open_client(config, true)?);
            handle_admin(&admin, command, format).await?;
        }

        Command::Blog(command) => handle_blog(config, command, format).await?,

        Command::Dashboard => {
            let admin = AdminService::new(open_client(config, true)?);
            handle_dashboard(&admin).await?;
        }
    }

    Ok(())
}

fn handle_whoami(config: &ClientConfig) -> Result<()> {
    let store = SessionStore::new(&config.session_path);
    let Some(session) = store.load()? else {
        println!("Not signed in");
        return Ok(());
    };

    match session.user {
        Some(user) => {
            println!("{} <{}>", user.name, user.email);
            if let Some(role) = user.role {
                println!("Role: {}", role);
            }
        }
        None => println!("Signed in (no profile stored)"),
    }
    println!("Since: {}", format_timestamp(Some(session.saved_at)));
    if let Ok(claims) = crate::core::session::decode_claims(&session.access_token) {
        if let Some(expiry) = claims.expires_at() {
            println!("Expires: {}", crate::format::format_datetime(Some(expiry)));
        }
    }
    Ok(())
}

async fn handle_apply(config: &ClientConfig, args: ApplyArgs) -> Result<()> {
    let careers = CareerService::new(open_client(config, true)?);

    let cover_letter = match &args.cover_letter_file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let form = ApplicationForm {
        cover_letter,
        phone: args.phone,
        linkedin_url: args.linkedin,
        portfolio_url: args.portfolio,
        referral: args.referral,
        additional_info: args.additional_info,
        resume_url: args.resume_url,
    };

    let mut flow = ApplicationFlow::new(careers, args.job_id.clone()).with_form(form);
    if let Some(path) = &args.resume {
        let file = FileUpload::from_path(path)
            .await
            .with_context(|| format!("Failed to read resume {}", path.display()))?;
        flow.attach_resume(file);
    }

    match flow.submit().await {
        SubmissionState::Submitted(application) => {
            println!(
                "✅ Application {} submitted ({})",
                application.id,
                application.status.label()
            );
            Ok(())
        }
        SubmissionState::Invalid(errors) => {
            for e in errors {
                eprintln!("  {}", e);
            }
            anyhow::bail!("Application not sent, fix the fields above")
        }
        SubmissionState::Failed(message) => anyhow::bail!(message.clone()),
        SubmissionState::Editing | SubmissionState::Submitting => Ok(()),
    }
}

async fn handle_admin(admin: &AdminService, command: AdminCommand, format: OutputFormat) -> Result<()> {
    match command {
        AdminCommand::Users(command) => match command {
            CrudCommand::List(args) => {
                let query = args.to_query();
                list_into(&query, admin.list_users(&query), format).await?;
            }
            CrudCommand::Show { id } => print_record(&admin.get_user(&id).await?, format)?,
            CrudCommand::Create { file } => {
                let user = admin.create_user(&read_payload(&file)?).await?;
                println!("✅ Created user {} ({})", user.name, user.id);
            }
            CrudCommand::Update { id, file } => {
                let user = admin.update_user(&id, &read_payload(&file)?).await?;
                println!("✅ Updated user {}", user.id);
            }
            CrudCommand::Delete { id } => {
                admin.delete_user(&id).await?;
                println!("✅ Deleted user {}", id);
            }
        },

        AdminCommand::Jobs(AdminJobsCommand::Record(command)) => match command {
            CrudCommand::List(args) => {
                let query = args.to_query();
                list_into(&query, admin.list_jobs(&query), format).await?;
            }
            CrudCommand::Show { id } => print_record(&admin.get_job(&id).await?, format)?,
            CrudCommand::Create { file } => {
                let job = admin.create_job(&read_payload(&file)?).await?;
                println!("✅ Created job {} ({})", job.title, job.id);
            }
            CrudCommand::Update { id, file } => {
                let job = admin.update_job(&id, &read_payload(&file)?).await?;
                println!("✅ Updated job {}", job.id);
            }
            CrudCommand::Delete { id } => {
                admin.delete_job(&id).await?;
                println!("✅ Deleted job {}", id);
            }
        },

        AdminCommand::Jobs(AdminJobsCommand::Flags {
            id,
            published,
            featured,
        }) => {
            if published.is_none() && featured.is_none() {
                anyhow::bail!("Nothing to change, pass --published and/or --featured");
            }
            let job = admin.set_job_flags(&id, published, featured).await?;
            println!(
                "✅ Job {}: published={}, featured={}",
                job.id, job.is_published, job.is_featured
            );
        }

        AdminCommand::Applications(command) => match command {
            ApplicationsCommand::List(args) => {
                let query = args.to_query();
                list_into(&query, admin.list_applications(&query), format).await?;
            }
            ApplicationsCommand::Show { id } => {
                let application = admin.get_application(&id).await?;
                print_record(&application, format)?;
                if format == OutputFormat::Table {
                    let next: Vec<&str> = application
                        .status
                        .next_states()
                        .iter()
                        .map(|s| s.as_str())
                        .collect();
                    if !next.is_empty() {
                        println!("\nNext: {}", next.join(", "));
                    }
                }
            }
            ApplicationsCommand::SetStatus {
                id,
                status,
                interview_date,
                notes,
            } => {
                let mut update = StatusUpdate::new(status);
                if let Some(raw) = interview_date {
                    let date = timestamp::parse(&raw)
                        .with_context(|| format!("Unrecognised interview date '{}'", raw))?;
                    update = update.with_interview_date(date);
                }
                if let Some(notes) = notes {
                    update = update.with_notes(notes);
                }
                let application = admin.set_application_status(&id, &update).await?;
                println!(
                    "✅ Application {} is now {}",
                    application.id,
                    application.status.label()
                );
            }
            ApplicationsCommand::Delete { id } => {
                admin.delete_application(&id).await?;
                println!("✅ Deleted application {}", id);
            }
        },

        AdminCommand::Courses(command) => match command {
            CrudCommand::List(args) => {
                let query = args.to_query();
                list_into(&query, admin.list_courses(&query), format).await?;
            }
            CrudCommand::Show { id } => print_record(&admin.get_course(&id).await?, format)?,
            CrudCommand::Create { file } => {
                let course = admin.create_course(&read_payload(&file)?).await?;
                println!("✅ Created course {} ({})", course.title, course.id);
            }
            CrudCommand::Update { id, file } => {
                let course = admin.update_course(&id, &read_payload(&file)?).await?;
                println!("✅ Updated course {}", course.id);
            }
            CrudCommand::Delete { id } => {
                admin.delete_course(&id).await?;
                println!("✅ Deleted course {}", id);
            }
        },

        AdminCommand::Lessons { course_id } => {
            print_rows(&admin.list_lessons(&course_id).await?, format)?;
        }

        AdminCommand::Classes(command) => match command {
            CrudCommand::List(args) => {
                let query = args.to_query();
                list_into(&query, admin.list_classes(&query), format).await?;
            }
            CrudCommand::Show { id } => print_record(&admin.get_class(&id).await?, format)?,
            CrudCommand::Create { file } => {
                let class = admin.create_class(&read_payload(&file)?).await?;
                println!("✅ Created class {} ({})", class.title, class.id);
            }
            CrudCommand::Update { id, file } => {
                let class = admin.update_class(&id, &read_payload(&file)?).await?;
                println!("✅ Updated class {}", class.id);
            }
            CrudCommand::Delete { id } => {
                admin.delete_class(&id).await?;
                println!("✅ Deleted class {}", id);
            }
        },

        AdminCommand::Categories => {
            let blog = BlogService::new(admin.client().clone());
            print_rows(&blog.categories().await?, format)?;
        }
    }

    Ok(())
}

async fn handle_blog(config: &ClientConfig, command: BlogCommand, format: OutputFormat) -> Result<()> {
    let public = matches!(command, BlogCommand::List(_) | BlogCommand::Show { .. });
    let blog = BlogService::new(open_client(config, !public)?);

    match command {
        BlogCommand::List(args) => {
            let query = args.to_query();
            list_into(&query, blog.list_posts(&query), format).await?;
        }
        BlogCommand::Show { id, slug } => {
            let post = if slug {
                blog.get_post_by_slug(&id).await?
            } else {
                blog.get_post(&id).await?
            };
            print_record(&post, format)?;
        }
        BlogCommand::Create { file } => {
            let post = blog.create_post(read_payload(&file)?).await?;
            println!("✅ Created post {} (/{})", post.id, post.slug);
        }
        BlogCommand::Update { id, file } => {
            let post = blog.update_post(&id, read_payload(&file)?).await?;
            println!("✅ Updated post {}", post.id);
        }
        BlogCommand::Delete { id } => {
            blog.delete_post(&id).await?;
            println!("✅ Deleted post {}", id);
        }
        BlogCommand::UploadImage { path } => {
            let uploaded = blog.upload_image(read_upload(&path).await?).await?;
            println!("{}", uploaded.url);
        }
    }

    Ok(())
}

async fn read_upload(path: &Path) -> Result<FileUpload> {
    FileUpload::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

const BREAKDOWN_SAMPLE: u32 = 100;

async fn handle_dashboard(admin: &AdminService) -> Result<()> {
    let stats = admin.dashboard_stats().await?;

    println!("📊 Dashboard");
    println!("  Users:         {}", stats.total_users);
    println!(
        "  Jobs:          {} ({} published)",
        stats.total_jobs, stats.published_jobs
    );
    println!(
        "  Applications:  {} ({} pending)",
        stats.total_applications, stats.pending_applications
    );
    println!("  Courses:       {}", stats.total_courses);
    println!("  Classes:       {}", stats.total_classes);
    println!("  Blog posts:    {}", stats.total_posts);

    let recent = ListQuery::new().paged(1, BREAKDOWN_SAMPLE);
    match admin.list_applications(&recent).await {
        Ok(page) => {
            let breakdown = StatusBreakdown::from_applications(&page.items);
            println!("\nLatest {} applications by status", page.items.len());
            for (status, count) in &breakdown.0 {
                println!("  {:<12} {}", status.label(), count);
            }
        }
        Err(e) => {
            warn!("Status breakdown unavailable: {}", e);
            println!("\nStatus breakdown unavailable: {}", e.user_message());
        }
    }

    info!("Dashboard rendered");
    Ok(())
}
