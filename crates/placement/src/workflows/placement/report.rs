use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationStatus, CompanyId, Internship, InternshipId, InternshipLevel, InternshipStatus,
    WithdrawalStatus,
};
use super::store::{PlacementStore, RepositoryError};

/// Narrows the internships a summary covers. Applications and withdrawals are
/// counted only for the internships that pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InternshipStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<InternshipLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_major: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<CompanyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_on_or_before: Option<NaiveDate>,
}

impl ReportFilters {
    pub fn matches(&self, internship: &Internship) -> bool {
        self.status.map_or(true, |status| internship.status == status)
            && self.level.map_or(true, |level| internship.level == level)
            && self.preferred_major.as_deref().map_or(true, |major| {
                internship.preferred_major.eq_ignore_ascii_case(major.trim())
            })
            && self
                .company_id
                .as_ref()
                .map_or(true, |company| &internship.company_id == company)
            && self
                .closing_on_or_before
                .map_or(true, |date| internship.closing_date <= date)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.label()));
        }
        if let Some(level) = self.level {
            parts.push(format!("level={}", level.label()));
        }
        if let Some(major) = &self.preferred_major {
            parts.push(format!("major={major}"));
        }
        if let Some(company) = &self.company_id {
            parts.push(format!("company={company}"));
        }
        if let Some(date) = self.closing_on_or_before {
            parts.push(format!("closing<={date}"));
        }

        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternshipLine {
    pub id: InternshipId,
    pub title: String,
    pub company_name: String,
    pub level: InternshipLevel,
    pub status: InternshipStatus,
    pub remaining_slots: u32,
    pub visible: bool,
    pub applications: usize,
}

/// Aggregate counts across internships, applications, and withdrawals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacementSummary {
    pub filters: ReportFilters,
    pub internships: Vec<StatusCount>,
    pub remaining_slots: u64,
    pub applications: Vec<StatusCount>,
    pub accepted_offers: usize,
    pub withdrawals: Vec<StatusCount>,
    pub listings: Vec<InternshipLine>,
}

impl PlacementSummary {
    pub fn internship_total(&self) -> usize {
        self.internships.iter().map(|entry| entry.count).sum()
    }

    pub fn application_total(&self) -> usize {
        self.applications.iter().map(|entry| entry.count).sum()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PlacementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Placement summary (filters: {})", self.filters.describe())?;

        writeln!(f, "\nInternships: {}", self.internship_total())?;
        for entry in &self.internships {
            writeln!(f, "- {}: {}", entry.label, entry.count)?;
        }
        writeln!(f, "Remaining slots: {}", self.remaining_slots)?;

        writeln!(f, "\nApplications: {}", self.application_total())?;
        for entry in &self.applications {
            writeln!(f, "- {}: {}", entry.label, entry.count)?;
        }
        writeln!(f, "Accepted offers: {}", self.accepted_offers)?;

        writeln!(f, "\nWithdrawal requests")?;
        for entry in &self.withdrawals {
            writeln!(f, "- {}: {}", entry.label, entry.count)?;
        }

        if self.listings.is_empty() {
            writeln!(f, "\nListings: none")?;
        } else {
            writeln!(f, "\nListings")?;
            for line in &self.listings {
                writeln!(
                    f,
                    "- {} | {} | {} | {} | {} | {} slot(s) | {} application(s){}",
                    line.id,
                    line.title,
                    line.company_name,
                    line.level.label(),
                    line.status.label(),
                    line.remaining_slots,
                    line.applications,
                    if line.visible { "" } else { " | hidden" }
                )?;
            }
        }

        Ok(())
    }
}

pub fn summarize<S>(store: &S, filters: &ReportFilters) -> Result<PlacementSummary, RepositoryError>
where
    S: PlacementStore + ?Sized,
{
    let mut internships = store.internships_where(&|record| filters.matches(record))?;
    internships.sort_by(|left, right| left.id.cmp(&right.id));
    let in_scope: BTreeSet<InternshipId> =
        internships.iter().map(|record| record.id.clone()).collect();

    let applications = store.applications_where(&|record| in_scope.contains(&record.internship_id))?;
    let in_scope_applications: BTreeSet<_> =
        applications.iter().map(|record| record.id.clone()).collect();
    let withdrawals =
        store.withdrawals_where(&|record| in_scope_applications.contains(&record.application_id))?;

    let mut per_internship: HashMap<&InternshipId, usize> = HashMap::new();
    for application in &applications {
        *per_internship.entry(&application.internship_id).or_default() += 1;
    }

    let listings = internships
        .iter()
        .map(|record| InternshipLine {
            id: record.id.clone(),
            title: record.title.clone(),
            company_name: record.company_name.clone(),
            level: record.level,
            status: record.status,
            remaining_slots: record.remaining_slots,
            visible: record.visible,
            applications: per_internship.get(&record.id).copied().unwrap_or(0),
        })
        .collect();

    Ok(PlacementSummary {
        filters: filters.clone(),
        internships: InternshipStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                label: status.label(),
                count: internships.iter().filter(|r| r.status == status).count(),
            })
            .collect(),
        remaining_slots: internships
            .iter()
            .map(|record| u64::from(record.remaining_slots))
            .sum(),
        applications: ApplicationStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                label: status.label(),
                count: applications.iter().filter(|r| r.status == status).count(),
            })
            .collect(),
        accepted_offers: applications
            .iter()
            .filter(|record| record.accepted_by_student)
            .count(),
        withdrawals: WithdrawalStatus::ordered()
            .into_iter()
            .map(|status| StatusCount {
                label: status.label(),
                count: withdrawals.iter().filter(|r| r.status == status).count(),
            })
            .collect(),
        listings,
    })
}

/// Render the summary for `filters` as plain text.
pub fn generate_summary<S>(store: &S, filters: &ReportFilters) -> Result<String, RepositoryError>
where
    S: PlacementStore + ?Sized,
{
    Ok(summarize(store, filters)?.render())
}
