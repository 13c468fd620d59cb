use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use secret_santa::config::AppConfig;
use secret_santa::error::AppError;
use secret_santa::exchange::{Assignment, AssignmentEngine, Participant, ParticipantId};
use secret_santa::import::{ExclusionRuleImporter, ParticipantImporter};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct DrawArgs {
    /// CSV roster with name and email columns
    #[arg(long)]
    pub(crate) participants: PathBuf,
    /// Optional CSV of exclusion rules with from, to and symmetric columns
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Event name shown above the assignments
    #[arg(long)]
    pub(crate) event_name: Option<String>,
    /// Seed for a reproducible draw
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Override the configured attempt cap
    #[arg(long)]
    pub(crate) attempts: Option<u32>,
}

pub(crate) fn run_draw(args: DrawArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = args
        .attempts
        .map(AssignmentEngine::new)
        .unwrap_or_else(|| config.draw.engine());

    let output = draw_from_files(&args, engine)?;
    print!("{output}");
    Ok(())
}

fn draw_from_files(args: &DrawArgs, engine: AssignmentEngine) -> Result<String, AppError> {
    let participants = ParticipantImporter::from_path(&args.participants)?;
    let rules = match &args.rules {
        Some(path) => ExclusionRuleImporter::from_path(path, &participants)?,
        None => Vec::new(),
    };

    let assignments = match args.seed {
        Some(seed) => engine.draw(&participants, &rules, &mut StdRng::seed_from_u64(seed))?,
        None => engine.draw(&participants, &rules, &mut rand::thread_rng())?,
    };

    Ok(render_assignments(
        args.event_name.as_deref(),
        &participants,
        &assignments,
    ))
}

fn render_assignments(
    event_name: Option<&str>,
    participants: &[Participant],
    assignments: &[Assignment],
) -> String {
    let names: HashMap<&ParticipantId, &str> = participants
        .iter()
        .map(|participant| (&participant.id, participant.name.as_str()))
        .collect();
    let name_of = |id: &ParticipantId| names.get(id).copied().unwrap_or(id.as_str()).to_string();

    let mut output = String::new();
    output.push_str(&format!("{}\n", event_name.unwrap_or("Secret Santa")));
    output.push_str(&format!("Assignments ({}):\n", assignments.len()));
    for assignment in assignments {
        output.push_str(&format!(
            "  {} -> {}\n",
            name_of(&assignment.giver_id),
            name_of(&assignment.receiver_id)
        ));
    }
    output
}
