use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{
    facilities, incident_attachments, incident_comments, incidents, process_steps,
    process_sub_step_actors, process_sub_step_forms, process_sub_steps, processes, users,
};

// --- Domain enums (stored as strings, parsed at the edges) ---

/// Incident lifecycle states. Every creation path starts at `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentStatus {
    Open,
    Assigned,
    Resolved,
    Rejected,
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentStatus::Open => write!(f, "open"),
            IncidentStatus::Assigned => write!(f, "assigned"),
            IncidentStatus::Resolved => write!(f, "resolved"),
            IncidentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IncidentStatus::Open),
            "assigned" => Ok(IncidentStatus::Assigned),
            "resolved" => Ok(IncidentStatus::Resolved),
            "rejected" => Ok(IncidentStatus::Rejected),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for IncidentPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentPriority::Low => write!(f, "low"),
            IncidentPriority::Medium => write!(f, "medium"),
            IncidentPriority::High => write!(f, "high"),
            IncidentPriority::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for IncidentPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(IncidentPriority::Low),
            "medium" => Ok(IncidentPriority::Medium),
            "high" => Ok(IncidentPriority::High),
            "critical" => Ok(IncidentPriority::Critical),
            _ => Err(format!("unknown priority: {s}")),
        }
    }
}

// --- User ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub facility_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// User row as exposed over the API: never carries the password hash.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub facility_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            facility_id: u.facility_id,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub facility_id: Option<Uuid>,
}

// --- Facility ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = facilities)]
pub struct Facility {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Incident ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = incidents)]
pub struct Incident {
    pub id: Uuid,
    pub facility_id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    pub description: String,
    pub proposed_fix: Option<String>,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incidents)]
pub struct NewIncident {
    pub facility_id: Uuid,
    pub reporter_id: Uuid,
    pub title: String,
    pub description: String,
    pub proposed_fix: Option<String>,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
}

// --- Attachment ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = incident_attachments)]
pub struct Attachment {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub kind: String,
    pub url: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incident_attachments)]
pub struct NewAttachment {
    pub incident_id: Uuid,
    pub kind: String,
    pub url: String,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
}

// --- Comment ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = incident_comments)]
pub struct Comment {
    pub id: Uuid,
    pub incident_id: Uuid,
    pub author_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = incident_comments)]
pub struct NewComment {
    pub incident_id: Uuid,
    pub author_id: Uuid,
    pub message: String,
}

// --- Process reference tree ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = processes)]
pub struct Process {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = processes)]
pub struct NewProcess {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    pub is_active: bool,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = process_steps)]
pub struct ProcessStep {
    pub id: Uuid,
    pub process_id: Uuid,
    pub step_no: i32,
    pub step_name: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = process_steps)]
pub struct NewProcessStep {
    pub process_id: Uuid,
    pub step_no: i32,
    pub step_name: String,
    pub note: Option<String>,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = process_sub_steps)]
pub struct SubStep {
    pub id: Uuid,
    pub step_id: Uuid,
    pub sub_no: i32,
    pub work_content: String,
    pub expected_result: Option<String>,
    pub due_days: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = process_sub_steps)]
pub struct NewSubStep {
    pub step_id: Uuid,
    pub sub_no: i32,
    pub work_content: String,
    pub expected_result: Option<String>,
    pub due_days: Option<i32>,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = process_sub_step_actors)]
pub struct SubStepActor {
    pub id: Uuid,
    pub sub_step_id: Uuid,
    pub actor_type: String,
    pub actor_text: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = process_sub_step_actors)]
pub struct NewSubStepActor {
    pub sub_step_id: Uuid,
    pub actor_type: String,
    pub actor_text: String,
    pub note: Option<String>,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = process_sub_step_forms)]
pub struct SubStepForm {
    pub id: Uuid,
    pub sub_step_id: Uuid,
    pub form_code: Option<String>,
    pub form_name: String,
    pub url_file: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = process_sub_step_forms)]
pub struct NewSubStepForm {
    pub sub_step_id: Uuid,
    pub form_code: Option<String>,
    pub form_name: String,
    pub url_file: Option<String>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_all_lifecycle_states() {
        for s in ["open", "assigned", "resolved", "rejected"] {
            assert_eq!(s.parse::<IncidentStatus>().unwrap().to_string(), s);
        }
        assert!("in_progress".parse::<IncidentStatus>().is_err());
        assert!("".parse::<IncidentStatus>().is_err());
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<IncidentPriority>().unwrap(), IncidentPriority::High);
        assert_eq!("critical".parse::<IncidentPriority>().unwrap(), IncidentPriority::Critical);
        assert!("urgent".parse::<IncidentPriority>().is_err());
    }

    #[test]
    fn public_user_drops_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Nguyen Van A".into(),
            email: "a@example.com".into(),
            password_hash: "$argon2id$...".into(),
            role: "reporter".into(),
            facility_id: None,
            is_active: true,
            created_at: Utc::now(),
        };
        let public = PublicUser::from(user.clone());
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains(&user.email));
    }
}
