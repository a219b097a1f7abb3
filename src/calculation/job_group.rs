//! Job group classification.
//!
//! This module assigns every employee one of the coarse role categories used
//! to resolve ambiguous tags, and looks up the prior probability configured
//! for each category.

use tracing::trace;

use crate::config::{EngineConfig, JobGroupRule, OrgField};
use crate::models::{Employee, JobGroup};

/// Classifies an employee into a job group.
///
/// Rules are evaluated in configuration order and the first rule with a
/// case-insensitive substring match on its field wins. Employees matching no
/// rule are [`JobGroup::Office`]. The function is total and deterministic.
///
/// # Example
///
/// ```no_run
/// use workhour_engine::calculation::classify_job_group;
/// use workhour_engine::config::ConfigLoader;
/// use workhour_engine::models::{Employee, JobGroup};
///
/// let config = ConfigLoader::load("./config/default").unwrap().into_config();
/// let employee = Employee {
///     id: "E1001".to_string(),
///     name: "Jordan Park".to_string(),
///     department: "Manufacturing".to_string(),
///     team: None,
///     position: "Operator".to_string(),
///     job_family: None,
///     org_path: vec![],
/// };
/// assert_eq!(classify_job_group(&employee, &config), JobGroup::Production);
/// ```
pub fn classify_job_group(employee: &Employee, config: &EngineConfig) -> JobGroup {
    let group = config
        .job_group_rules()
        .iter()
        .find(|rule| rule_matches(rule, employee))
        .map(|rule| rule.group)
        .unwrap_or(JobGroup::Office);

    trace!(employee_id = %employee.id, %group, "Classified job group");
    group
}

/// Returns the configured probability that an ambiguous tag is real work for
/// the group.
pub fn prior_probability(group: JobGroup, config: &EngineConfig) -> f64 {
    config.prior(group)
}

fn rule_matches(rule: &JobGroupRule, employee: &Employee) -> bool {
    let values: Vec<&str> = match rule.field {
        OrgField::Department => vec![employee.department.as_str()],
        OrgField::Team => employee.team.as_deref().into_iter().collect(),
        OrgField::Position => vec![employee.position.as_str()],
        OrgField::JobFamily => employee.job_family.as_deref().into_iter().collect(),
        OrgField::OrgPath => employee.org_path.iter().map(String::as_str).collect(),
    };

    values.iter().any(|value| {
        let value = value.to_lowercase();
        rule.contains
            .iter()
            .any(|needle| value.contains(&needle.to_lowercase()))
    })
}
