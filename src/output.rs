// src/output.rs
//! Terminal rendering of records plus payload file loading for the CLI

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::format::{
    format_currency, format_datetime, format_salary_range, format_timestamp, truncate,
};
use crate::types::{Application, BlogCategory, BlogPost, Class, Course, Job, Lesson, User};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// A record that renders as one row of a list screen
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

fn or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

impl Tabular for Job {
    const HEADERS: &'static [&'static str] = &[
        "id", "title", "company", "category", "type", "level", "location", "salary", "deadline",
        "published",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.company.clone(),
            or_empty(self.category.as_deref()),
            self.employment_type.label().to_string(),
            self.experience_level.label().to_string(),
            self.location.to_string(),
            format_salary_range(
                self.salary_min,
                self.salary_max,
                self.salary_currency.as_deref(),
            ),
            format_timestamp(self.application_deadline),
            yes_no(self.is_published),
        ]
    }
}

impl Tabular for Application {
    const HEADERS: &'static [&'static str] = &[
        "id", "job", "applicant", "email", "status", "applied", "interview",
    ];

    fn row(&self) -> Vec<String> {
        let job = match self.job_title() {
            "" => self.job_id.clone(),
            title => title.to_string(),
        };
        vec![
            self.id.clone(),
            job,
            self.user.name.clone(),
            self.user.email.clone(),
            self.status.label().to_string(),
            format_timestamp(self.created_at),
            format_datetime(self.interview_date),
        ]
    }
}

impl Tabular for User {
    const HEADERS: &'static [&'static str] = &["id", "name", "email", "role", "active", "joined"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.role.to_string(),
            yes_no(self.is_active),
            format_timestamp(self.created_at),
        ]
    }
}

impl Tabular for Course {
    const HEADERS: &'static [&'static str] = &[
        "id", "title", "category", "instructor", "level", "price", "published",
    ];

    fn row(&self) -> Vec<String> {
        let price = match self.price {
            Some(price) if price > 0.0 => {
                format_currency(price, self.currency.as_deref().unwrap_or_default())
            }
            Some(_) => "Free".to_string(),
            None => String::new(),
        };
        vec![
            self.id.clone(),
            self.title.clone(),
            or_empty(self.category.as_deref()),
            or_empty(self.instructor.as_deref()),
            or_empty(self.level.as_deref()),
            price,
            yes_no(self.is_published),
        ]
    }
}

impl Tabular for Lesson {
    const HEADERS: &'static [&'static str] = &["order", "id", "title", "duration", "free"];

    fn row(&self) -> Vec<String> {
        vec![
            self.order.to_string(),
            self.id.clone(),
            self.title.clone(),
            self.duration_minutes
                .map(|m| format!("{} min", m))
                .unwrap_or_default(),
            yes_no(self.is_free),
        ]
    }
}

impl Tabular for Class {
    const HEADERS: &'static [&'static str] =
        &["id", "title", "course", "starts", "ends", "capacity"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            or_empty(self.course_id.as_deref()),
            format_datetime(self.start_time),
            format_datetime(self.end_time),
            self.capacity.map(|c| c.to_string()).unwrap_or_default(),
        ]
    }
}

impl Tabular for BlogPost {
    const HEADERS: &'static [&'static str] = &[
        "id", "title", "slug", "category", "author", "published", "date", "summary",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.slug.clone(),
            or_empty(self.category.as_deref()),
            self.author_name().to_string(),
            yes_no(self.is_published),
            format_timestamp(self.published_at.or(self.created_at)),
            self.summary(60),
        ]
    }
}

impl Tabular for BlogCategory {
    const HEADERS: &'static [&'static str] = &["id", "name", "slug"];

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            or_empty(self.slug.as_deref()),
        ]
    }
}

const MAX_CELL_CHARS: usize = 40;

/// Left-aligned, space-padded columns
pub fn render_table<T: Tabular>(rows: &[T]) -> String {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.row().iter().map(|c| truncate(c, MAX_CELL_CHARS)).collect())
        .collect();

    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(body.len() + 1);
    out.push(line(
        T::HEADERS.iter().map(|h| h.to_uppercase()).collect(),
    ));
    for row in body {
        out.push(line(row));
    }
    out.join("\n")
}

pub fn write_csv<W: Write, T: Tabular>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(T::HEADERS)
        .context("Failed to write CSV header")?;
    for row in rows {
        wtr.write_record(row.row())
            .context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn print_rows<T: Tabular + Serialize>(rows: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                println!("No results.");
            } else {
                println!("{}", render_table(rows));
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        OutputFormat::Csv => write_csv(std::io::stdout(), rows)?,
    }
    Ok(())
}

/// A single record: `field: value` lines in table mode
pub fn print_record<T: Tabular + Serialize>(record: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            let width = T::HEADERS.iter().map(|h| h.len()).max().unwrap_or(0);
            for (header, value) in T::HEADERS.iter().zip(record.row()) {
                println!("{:<width$}  {}", header, value, width = width);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => write_csv(std::io::stdout(), std::slice::from_ref(record))?,
    }
    Ok(())
}

/// Create/update payload from a `.json`, `.yaml`/`.yml` or `.toml` file
pub fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let parsed = match extension.as_str() {
        "json" => serde_json::from_str(&content).map_err(anyhow::Error::from),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        "toml" => toml::from_str(&content).map_err(anyhow::Error::from),
        other => anyhow::bail!(
            "Unsupported payload format '{}' for {}, use json, yaml or toml",
            other,
            path.display()
        ),
    };

    parsed.with_context(|| format!("Failed to parse {}", path.display()))
}
