use crate::infra::{build_services, open_store, parse_date, parse_level, parse_status, Services};
use chrono::NaiveDate;
use clap::Args;
use placement::config::{AppConfig, StorageConfig};
use placement::error::AppError;
use placement::workflows::placement::{
    ApplicationOutcome, CompanyId, FixedClock, InMemoryPlacementStore, InternshipDraft,
    InternshipId, InternshipLevel, InternshipStatus, RepresentativeId,
    RepresentativeRegistration, ReportFilters, StaffId, StaffMember, Student, StudentId,
    SystemClock,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct ReportArgs {
    /// Directory holding the CSV records (defaults to APP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Only count internships in this status
    #[arg(long, value_parser = parse_status)]
    pub(crate) status: Option<InternshipStatus>,
    /// Only count internships at this level
    #[arg(long, value_parser = parse_level)]
    pub(crate) level: Option<InternshipLevel>,
    /// Only count internships preferring this major
    #[arg(long)]
    pub(crate) major: Option<String>,
    /// Only count internships posted by this company
    #[arg(long)]
    pub(crate) company: Option<String>,
    /// Only count internships closing on or before this date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) closing_before: Option<NaiveDate>,
    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the demo treats as today (YYYY-MM-DD). Defaults to 2025-03-01.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        data_dir,
        status,
        level,
        major,
        company,
        closing_before,
        json,
    } = args;

    let storage = match data_dir {
        Some(dir) => StorageConfig {
            data_dir: Some(dir),
        },
        None => AppConfig::load()?.storage,
    };
    if storage.data_dir.is_none() {
        eprintln!("no data directory configured; reporting on an empty in-memory store");
    }

    let services = build_services(open_store(&storage)?, Arc::new(SystemClock))?;
    let filters = ReportFilters {
        status,
        level,
        preferred_major: major,
        company_id: company.map(CompanyId),
        closing_on_or_before: closing_before,
    };
    let summary = services.summary(&filters)?;

    if json {
        let body = serde_json::to_string_pretty(&summary).map_err(std::io::Error::other)?;
        println!("{body}");
    } else {
        print!("{}", summary.render());
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args
        .today
        .or_else(|| NaiveDate::from_ymd_opt(2025, 3, 1))
        .unwrap_or_default();

    let services = build_services(
        Arc::new(InMemoryPlacementStore::new()),
        Arc::new(FixedClock(today)),
    )?;

    println!("Placement lifecycle demo (today = {today})");
    play_scenario(&services)?;

    println!();
    print!("{}", services.summary(&ReportFilters::default())?.render());
    Ok(())
}

/// Two students fill a two-slot posting, then one withdraws and the slot reopens.
pub(crate) fn play_scenario(services: &Services) -> Result<InternshipId, AppError> {
    let staff = services.accounts.register_staff(StaffMember {
        id: StaffId::from("staff-1"),
        name: "Career Office".to_string(),
    })?;
    let representative = services
        .accounts
        .register_representative(RepresentativeRegistration {
            id: RepresentativeId::from("rep-1"),
            name: "Dana Reyes".to_string(),
            company_id: CompanyId::from("acme"),
            company_name: "Acme Robotics".to_string(),
        })?;
    let representative = services
        .accounts
        .set_representative_approval(&staff, &representative.id, true)?;
    println!(
        "- {} approved to post for {}",
        representative.name, representative.company_name
    );

    let internship = services.internships.create(
        &representative,
        InternshipDraft {
            title: "Platform Engineering Intern".to_string(),
            description: "Build and operate internal developer tooling".to_string(),
            level: InternshipLevel::Basic,
            preferred_major: "Computer Science".to_string(),
            opening_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            closing_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap_or_default(),
            slots: 2,
        },
    )?;
    let internship = services.internships.decide(&staff, &internship.id, true)?;
    print_posting("approved", &internship.id, services)?;

    let mut offers = Vec::new();
    for (id, name, year) in [("stu-1", "Avery Chen", 2), ("stu-2", "Jordan Patel", 3)] {
        let student = services.accounts.register_student(Student {
            id: StudentId::from(id),
            name: name.to_string(),
            year,
            major: "Computer Science".to_string(),
        })?;
        let application = services.applications.apply(&student, &internship.id)?;
        let application = services.applications.decide(
            &staff,
            &application.id,
            ApplicationOutcome::Successful,
        )?;
        println!(
            "- {} applied ({}) and received an offer",
            student.name, application.id
        );
        offers.push((student, application));
    }

    for (student, application) in &offers {
        services.applications.accept_offer(student, &application.id)?;
        print_posting(&format!("{} accepted", student.name), &internship.id, services)?;
    }

    if let Some((student, application)) = offers.first() {
        let request = services.withdrawals.request(student, &application.id)?;
        services.withdrawals.decide(&staff, &request.id, true)?;
        print_posting(
            &format!("{} withdrew ({})", student.name, request.id),
            &internship.id,
            services,
        )?;
    }

    Ok(internship.id)
}

fn print_posting(step: &str, id: &InternshipId, services: &Services) -> Result<(), AppError> {
    let internship = services.internships.get(id)?;
    println!(
        "- {step}: {} is {} with {} slot(s) left",
        internship.id,
        internship.status.label(),
        internship.remaining_slots
    );
    Ok(())
}
