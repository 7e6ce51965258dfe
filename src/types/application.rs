// src/types/application.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::timestamp;
use crate::error::{ApiError, Result};

/// Application lifecycle: applied -> reviewing -> interview -> accepted | rejected.
/// Rejection is reachable from every non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Reviewing,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Reviewing => "Under review",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// States reachable in one step
    pub fn next_states(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Applied => &[Reviewing, Rejected],
            Reviewing => &[Interview, Rejected],
            Interview => &[Accepted, Rejected],
            Accepted | Rejected => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }

    /// Keeping the current status is always allowed so notes and
    /// interview dates stay editable.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        *self == next || self.next_states().contains(&next)
    }

    pub fn transition(self, next: ApplicationStatus) -> Result<ApplicationStatus> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ApiError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}', expected one of: applied, reviewing, interview, accepted, rejected",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRef {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default, alias = "full_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    #[serde(alias = "_id")]
    pub id: String,
    pub job_id: String,
    #[serde(default)]
    pub job: Option<JobSummary>,
    #[serde(default)]
    pub user: ApplicantRef,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub referral: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub admin_notes: Option<String>,
    #[serde(default, with = "timestamp")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn job_title(&self) -> &str {
        self.job.as_ref().map(|j| j.title.as_str()).unwrap_or("")
    }
}

/// Applicant-side form. `resume_url` is only used when no file is uploaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

/// Body of POST /careers/jobs/{id}/apply
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationPayload {
    #[serde(flatten)]
    pub form: ApplicationForm,
    pub job_id: String,
}

/// Admin edit of an application: status plus the optional review fields
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl StatusUpdate {
    pub fn new(status: ApplicationStatus) -> Self {
        Self {
            status,
            interview_date: None,
            admin_notes: None,
        }
    }

    pub fn with_interview_date(mut self, date: DateTime<Utc>) -> Self {
        self.interview_date = Some(date);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.admin_notes = Some(notes.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ApplicationStatus::*;

    #[test]
    fn test_transition_table() {
        assert!(Applied.can_transition_to(Reviewing));
        assert!(Applied.can_transition_to(Rejected));
        assert!(!Applied.can_transition_to(Interview));
        assert!(!Applied.can_transition_to(Accepted));
        assert!(Reviewing.can_transition_to(Interview));
        assert!(Interview.can_transition_to(Accepted));
        assert!(!Reviewing.can_transition_to(Applied));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for status in [Accepted, Rejected] {
            assert!(status.is_terminal());
            for next in ApplicationStatus::ALL {
                assert_eq!(status.can_transition_to(next), next == status);
            }
        }
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let err = Accepted.transition(Applied).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Illegal status transition from accepted to applied"
        );
        assert_eq!(Interview.transition(Accepted).unwrap(), Accepted);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Interview".parse::<ApplicationStatus>().unwrap(), Interview);
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_payload_flattens_form() {
        let payload = ApplicationPayload {
            form: ApplicationForm {
                phone: Some("+2348000000000".into()),
                resume_url: Some("https://cdn/r.pdf".into()),
                ..Default::default()
            },
            job_id: "abc123".into(),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["job_id"], "abc123");
        assert_eq!(value["resume_url"], "https://cdn/r.pdf");
        assert!(value.get("cover_letter").is_none());
    }

    #[test]
    fn test_status_update_omits_unset_fields() {
        let value = serde_json::to_value(StatusUpdate::new(Reviewing)).unwrap();
        assert_eq!(value, serde_json::json!({"status": "reviewing"}));
    }
}
