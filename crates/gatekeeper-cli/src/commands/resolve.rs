use crate::commands::{print_json, CandidateArgs, Context};
use crate::util::validate_search;
use anyhow::Result;
use clap::Args;
use gatekeeper_core::{
    resolve_with, MatchKind, NameMatchDto, PhoneHitDto, ResolutionDto, ResolveOptions,
};
use tracing::debug;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub candidate: CandidateArgs,
    /// Cap on each suggestion list (defaults to result_limit)
    #[arg(long)]
    pub limit: Option<usize>,
}

pub fn resolve(ctx: &Context<'_>, args: ResolveArgs) -> Result<()> {
    validate_search(&args.candidate)?;
    let options = ResolveOptions::with_limit(args.limit.unwrap_or(ctx.config.result_limit))?;
    let index = ctx.load_index()?;
    let result = resolve_with(&args.candidate.to_candidate(), &index, options)?;
    debug!(
        found = result.found,
        matches = result.matches.len(),
        near = result.near.len(),
        name_near = result.name_near.len(),
        "lookup resolved"
    );

    if ctx.json {
        return print_json(&result);
    }
    print_resolution(&result);
    Ok(())
}

fn print_resolution(result: &ResolutionDto) {
    if let Some(record) = &result.record {
        println!(
            "found: {}  {} ({})",
            record.id(),
            record.full_name(),
            record.phone()
        );
    } else {
        println!("not found");
    }
    if let Some(suggestion) = result.suggestion {
        println!("{}", suggestion.message());
    }

    print_section(
        "Other phone matches:",
        result
            .matches
            .iter()
            .skip(usize::from(result.found))
            .map(phone_line),
    );
    print_section("Similar phones:", result.near.iter().map(phone_line));
    print_section("Similar names:", result.name_near.iter().map(name_line));
}

// id, full name, phone, match kind, distance, order count (name hits only)
type Line<'a> = (&'a str, &'a str, &'a str, MatchKind, f64, Option<usize>);

fn phone_line(hit: &PhoneHitDto) -> Line<'_> {
    (
        hit.id.as_str(),
        hit.full_name.as_str(),
        hit.phone.as_str(),
        hit.kind,
        hit.distance,
        None,
    )
}

fn name_line(hit: &NameMatchDto) -> Line<'_> {
    (
        hit.id.as_str(),
        hit.full_name.as_str(),
        hit.phone.as_str(),
        hit.kind,
        hit.distance,
        Some(hit.orders),
    )
}

fn print_section<'a>(title: &str, items: impl Iterator<Item = Line<'a>>) {
    let mut items = items.peekable();
    if items.peek().is_none() {
        return;
    }
    println!("{title}");
    for (id, full_name, phone, kind, distance, orders) in items {
        match orders {
            Some(orders) if orders > 0 => println!(
                "- {id}  {full_name} ({phone})  {} {distance}  orders: {orders}",
                kind.as_str()
            ),
            _ => println!("- {id}  {full_name} ({phone})  {} {distance}", kind.as_str()),
        }
    }
}
