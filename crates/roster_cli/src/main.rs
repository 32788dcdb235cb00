//! CLI smoke probe.
//!
//! # Responsibility
//! - Verify `roster_core` linkage by seeding an in-memory roster and
//!   printing one elided page.
//! - Optionally read a TOML config given as the first argument.

use roster_core::db::open_db_with_config;
use roster_core::{
    init_logging_from_config, CoreConfig, MemberRepository, NewMember, OrderField, OrderSpec,
    PageRequest, PageStrategy, SearchCondition, Sort, SqliteMemberRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("roster_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config.logging)?;

    let conn = open_db_with_config(&config.database)?;
    let repo = SqliteMemberRepository::try_new(&conn)?;
    let team_a = repo.create_team("teamA")?;
    let team_b = repo.create_team("teamB")?;
    for (name, age, team) in [
        ("member1", 10, team_a),
        ("member2", 20, team_a),
        ("member3", 30, team_b),
        ("member4", 40, team_b),
    ] {
        repo.create_member(&NewMember::new(name, age).in_team(team))?;
    }

    let request = PageRequest::from_config(&config.query, 0, None)?.with_sort(Sort::by(
        OrderSpec::desc(OrderField::Age, config.query.default_null_placement),
    ));
    let page = repo.search_page(&SearchCondition::all(), &request, PageStrategy::Elided)?;

    println!("roster_core version={}", roster_core::core_version());
    println!(
        "page rows={} total={} count_elided={}",
        page.content.len(),
        page.total_elements(),
        page.count_elided()
    );
    for view in &page.content {
        println!(
            "member_id={} age={} team={}",
            view.member_id,
            view.age,
            view.team_name.as_deref().unwrap_or("-")
        );
    }
    log::info!("event=cli_probe module=cli status=ok rows={}", page.content.len());
    Ok(())
}
