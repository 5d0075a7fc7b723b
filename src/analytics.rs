//! Dashboard counts over a requester's scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::DbEmployee;

const UNKNOWN: &str = "Unknown";

/// Category → headcount for each dashboard chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardAnalytics {
    pub skills: BTreeMap<String, usize>,
    pub employment_type: BTreeMap<String, usize>,
    pub billable_status: BTreeMap<String, usize>,
    pub location: BTreeMap<String, usize>,
    pub team: BTreeMap<String, usize>,
    pub total_employees: usize,
}

fn bump(counts: &mut BTreeMap<String, usize>, value: Option<&str>) {
    let key = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN);
    *counts.entry(key.to_string()).or_default() += 1;
}

/// Count employees per category. Missing values count as "Unknown"; skills
/// are comma-separated and employees without skills add nothing there.
pub fn dashboard_analytics<'a, I>(scope: I) -> DashboardAnalytics
where
    I: IntoIterator<Item = &'a DbEmployee>,
{
    let mut out = DashboardAnalytics::default();
    for emp in scope {
        out.total_employees += 1;
        bump(&mut out.employment_type, emp.employment_type.as_deref());
        bump(&mut out.billable_status, emp.billable_status.as_deref());
        bump(&mut out.location, emp.location.as_deref());
        bump(&mut out.team, emp.team.as_deref());

        for skill in emp.skill.as_deref().unwrap_or("").split(',') {
            let skill = skill.trim();
            if !skill.is_empty() {
                *out.skills.entry(skill.to_string()).or_default() += 1;
            }
        }
    }
    out
}
