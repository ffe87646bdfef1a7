use crate::commands::{print_json, CandidateArgs, Context};
use crate::util::validate_search;
use anyhow::Result;
use clap::Args;
use gatekeeper_core::{classify, ClassificationDto, Decision};
use tracing::debug;

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub candidate: CandidateArgs,
}

pub fn check(ctx: &Context<'_>, args: CheckArgs) -> Result<()> {
    validate_search(&args.candidate)?;
    let index = ctx.load_index()?;
    let result = classify(&args.candidate.to_candidate(), &index);
    debug!(
        decision = result.decision.label(),
        matches = result.matches.len(),
        near = result.near.len(),
        "candidate classified"
    );

    if ctx.json {
        return print_json(&result);
    }
    print_classification(&result);
    Ok(())
}

pub(crate) fn print_classification(result: &ClassificationDto) {
    match &result.decision {
        Decision::ExactSame { record } => {
            println!("EXACT_SAME: customer already on file");
            println!("  {}  {} ({})", record.id, record.full_name, record.phone);
        }
        Decision::WarnConfirm { reason } => {
            println!("WARN_CONFIRM ({}): confirm before adding a new customer", reason.as_str());
        }
        Decision::Ok { reason } => {
            println!("OK ({}): no relevant duplicate found", reason.as_str());
        }
    }

    if !matches!(result.decision, Decision::ExactSame { .. }) && !result.matches.is_empty() {
        println!("Phone matches:");
        for item in &result.matches {
            match item.name_distance {
                Some(name_distance) => println!(
                    "- {}  {} ({})  phone distance {}, name distance {}",
                    item.id, item.full_name, item.phone, item.distance, name_distance
                ),
                None => println!(
                    "- {}  {} ({})  phone distance {}",
                    item.id, item.full_name, item.phone, item.distance
                ),
            }
        }
    }
    if !result.near.is_empty() {
        println!("Similar names:");
        for item in &result.near {
            println!(
                "- {}  {} ({})  {} {}",
                item.id,
                item.full_name,
                item.phone,
                item.kind.as_str(),
                item.distance
            );
        }
    }
}
