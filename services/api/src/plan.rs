use crate::infra::{parse_date, parse_designation, InMemorySessionRepository};
use cap_engine::cap::{
    assess_signing, AllocationState, CapComplianceService, CapDesignation, CapReport, PoolTotals,
    RosterImporter, RosterSlotStatus, SigningAssessment, SigningCandidate, SlotUsage,
};
use cap_engine::config::{AppConfig, CapConfig};
use cap_engine::error::AppError;
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct PoolArgs {
    /// Override the configured Pool A total
    #[arg(long)]
    pub(crate) pool_a: Option<u64>,
    /// Override the configured Pool B total
    #[arg(long)]
    pub(crate) pool_b: Option<u64>,
    /// Date after which unused Pool A money is forfeited (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) pool_a_forfeits_on: Option<NaiveDate>,
}

impl PoolArgs {
    fn apply(&self, mut pools: PoolTotals) -> PoolTotals {
        if let Some(total) = self.pool_a {
            pools.pool_a_total = total;
        }
        if let Some(total) = self.pool_b {
            pools.pool_b_total = total;
        }
        if self.pool_a_forfeits_on.is_some() {
            pools.pool_a_forfeits_on = self.pool_a_forfeits_on;
        }
        pools
    }
}

#[derive(Args, Debug)]
pub(crate) struct PlanArgs {
    /// Roster CSV (id,name,salary,designation,age,international,homegrown)
    #[arg(long)]
    pub(crate) roster: PathBuf,
    #[command(flatten)]
    pub(crate) pools: PoolArgs,
    /// Evaluation date for forfeiture notices (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the report as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SigningArgs {
    /// Roster CSV the signing is checked against
    #[arg(long)]
    pub(crate) roster: PathBuf,
    #[command(flatten)]
    pub(crate) pools: PoolArgs,
    /// Annual salary of the candidate
    #[arg(long)]
    pub(crate) salary: u64,
    /// Designation the candidate would be registered under
    #[arg(long, value_parser = parse_designation, default_value = "standard")]
    pub(crate) designation: CapDesignation,
    #[arg(long)]
    pub(crate) age: u8,
    /// Candidate needs an international slot
    #[arg(long)]
    pub(crate) international: bool,
    #[arg(long, default_value_t = 0)]
    pub(crate) senior_used: u8,
    #[arg(long, default_value_t = 0)]
    pub(crate) supplemental_used: u8,
    #[arg(long, default_value_t = 0)]
    pub(crate) international_used: u8,
    #[arg(long, default_value_t = 0)]
    pub(crate) designated_used: u8,
    #[arg(long, default_value_t = 0)]
    pub(crate) youth_used: u8,
    /// Print the assessment as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

impl SigningArgs {
    fn slots(&self) -> RosterSlotStatus {
        let limits = RosterSlotStatus::default();
        RosterSlotStatus {
            senior_roster: SlotUsage::new(self.senior_used, limits.senior_roster.limit),
            supplemental_roster: SlotUsage::new(
                self.supplemental_used,
                limits.supplemental_roster.limit,
            ),
            international: SlotUsage::new(self.international_used, limits.international.limit),
            designated_player: SlotUsage::new(
                self.designated_used,
                limits.designated_player.limit,
            ),
            youth: SlotUsage::new(self.youth_used, limits.youth.limit),
        }
    }
}

fn planning_service() -> Result<(CapComplianceService<InMemorySessionRepository>, CapConfig), AppError>
{
    let config = AppConfig::load()?.cap;
    let service = CapComplianceService::new(
        Arc::new(InMemorySessionRepository::default()),
        config.rules.clone(),
    )?;
    Ok((service, config))
}

fn load_state(
    service: &CapComplianceService<InMemorySessionRepository>,
    config: &CapConfig,
    roster: &Path,
    pools: &PoolArgs,
) -> Result<AllocationState, AppError> {
    let roster = RosterImporter::from_path(roster)?;
    let pools = pools.apply(config.pools.clone());
    Ok(service.plan(&roster, &pools))
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), AppError> {
    let (service, config) = planning_service()?;
    let state = load_state(&service, &config, &args.roster, &args.pools)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let report = state.report(today);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        render_report(&report);
    }
    Ok(())
}

pub(crate) fn run_signing(args: SigningArgs) -> Result<(), AppError> {
    let (service, config) = planning_service()?;
    let state = load_state(&service, &config, &args.roster, &args.pools)?;
    let candidate = SigningCandidate {
        salary: args.salary,
        designation: args.designation,
        international: args.international,
        age: args.age,
    };
    let assessment = assess_signing(&candidate, service.rules(), &state, &args.slots());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        render_assessment(&candidate, &assessment);
    }
    Ok(())
}

fn render_report(report: &CapReport) {
    println!("Cap compliance report");
    println!("- {}", report.headline);
    println!(
        "- Discount required {} | applied {} | unmet {}",
        report.total_required, report.total_applied, report.unmet
    );
    println!(
        "- Budget {} | true total {} | effective total {} | headroom {}",
        report.budget.salary_budget,
        report.budget.true_total,
        report.budget.effective_total,
        report.budget.headroom
    );

    println!("Pools:");
    for pool in &report.pools {
        let deadline = pool
            .forfeits_on
            .map(|date| format!(" | forfeits after {date}"))
            .unwrap_or_default();
        println!(
            "  - {}: {} used of {} ({} remaining){}",
            pool.pool_label, pool.used, pool.total, pool.remaining, deadline
        );
    }

    println!("Designations:");
    for entry in &report.designation_totals {
        println!(
            "  - {}: {} player(s), {} charged",
            entry.designation_label, entry.players, entry.true_charge
        );
    }

    println!("Players:");
    for row in &report.players {
        let shortfall = if row.shortfall > 0 {
            format!(" | short {}", row.shortfall)
        } else {
            String::new()
        };
        println!(
            "  - {} [{}] salary {} | charge {} | A {} | B {} | effective {}{}",
            row.player_id,
            row.designation_label,
            row.salary,
            row.true_charge,
            row.pool_a,
            row.pool_b,
            row.effective_charge,
            shortfall
        );
    }

    if !report.notices.is_empty() {
        println!("Notices:");
        for notice in &report.notices {
            println!("  - {notice}");
        }
    }
}

fn render_assessment(candidate: &SigningCandidate, assessment: &SigningAssessment) {
    println!(
        "Signing check: {} at {} (age {})",
        candidate.designation, candidate.salary, candidate.age
    );
    println!(
        "- Budget charge {} | discount required {} | effective charge {}",
        assessment.budget_charge, assessment.discount_required, assessment.effective_charge
    );
    if assessment.feasible {
        println!("- Feasible as proposed");
        return;
    }

    println!("- Blocked:");
    for (blocker, remedy) in assessment
        .blocking_reasons
        .iter()
        .zip(&assessment.suggested_remediation)
    {
        println!("  - {} -> {}", blocker.summary(), remedy);
    }
}
