//! Employee model and job group categories.
//!
//! This module defines the [`Employee`] record supplied by the organization
//! directory and the [`JobGroup`] role categories used to resolve ambiguous
//! events.

use serde::{Deserialize, Serialize};

/// Coarse role category.
///
/// Every employee maps to exactly one group; the group selects the prior
/// probability that an unresolved ambiguous tag represents real work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobGroup {
    /// Manufacturing and quality floor roles.
    Production,
    /// Laboratory and development roles.
    Research,
    /// Desk-based support roles. The fallback group.
    Office,
    /// People managers and executives.
    Management,
}

impl JobGroup {
    /// All job groups, in declaration order.
    pub const ALL: [JobGroup; 4] = [
        JobGroup::Production,
        JobGroup::Research,
        JobGroup::Office,
        JobGroup::Management,
    ];
}

impl std::fmt::Display for JobGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobGroup::Production => write!(f, "production"),
            JobGroup::Research => write!(f, "research"),
            JobGroup::Office => write!(f, "office"),
            JobGroup::Management => write!(f, "management"),
        }
    }
}

/// An employee as described by the organization directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Department name.
    pub department: String,
    /// Team name, when the department is subdivided.
    #[serde(default)]
    pub team: Option<String>,
    /// Position or job title.
    pub position: String,
    /// Job family code from the HR system.
    #[serde(default)]
    pub job_family: Option<String>,
    /// Organization path from the top of the hierarchy down to the team.
    #[serde(default)]
    pub org_path: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_employee_with_defaults() {
        let json = r#"{
            "id": "E1001",
            "name": "Kim Jiwoo",
            "department": "Finance",
            "position": "Analyst"
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.id, "E1001");
        assert_eq!(employee.team, None);
        assert_eq!(employee.job_family, None);
        assert!(employee.org_path.is_empty());
    }

    #[test]
    fn test_deserialize_employee_full() {
        let json = r#"{
            "id": "E2002",
            "name": "Lee Minho",
            "department": "Manufacturing",
            "team": "Drug Substance Team 2",
            "position": "Operator",
            "job_family": "MFG",
            "org_path": ["Operations", "Manufacturing", "Drug Substance Team 2"]
        }"#;

        let employee: Employee = serde_json::from_str(json).unwrap();
        assert_eq!(employee.team.as_deref(), Some("Drug Substance Team 2"));
        assert_eq!(employee.org_path.len(), 3);
    }

    #[test]
    fn test_job_group_serialization() {
        assert_eq!(
            serde_json::to_string(&JobGroup::Production).unwrap(),
            "\"production\""
        );
        let parsed: JobGroup = serde_json::from_str("\"management\"").unwrap();
        assert_eq!(parsed, JobGroup::Management);
    }

    #[test]
    fn test_job_group_display() {
        assert_eq!(JobGroup::Office.to_string(), "office");
        assert_eq!(JobGroup::Research.to_string(), "research");
    }
}
