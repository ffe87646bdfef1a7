use crate::commands::check::print_classification;
use crate::commands::{print_json, CandidateArgs, Context};
use crate::error::{invalid_input, not_found};
use crate::util::{validate_new_customer, validate_search};
use anyhow::Result;
use clap::Args;
use gatekeeper_config::FormConfig;
use gatekeeper_core::{classify, Decision};
use gatekeeper_sync::prefill::{
    build_prefill_url, CustomerStatus, PrefillEntries, PrefillForm, PrefillRequest,
};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("status")
        .required(true)
        .args(["new", "existing_id"])
))]
pub struct PrefillUrlArgs {
    #[command(flatten)]
    pub candidate: CandidateArgs,
    /// Prefill the form for a new customer
    #[arg(long)]
    pub new: bool,
    /// Prefill the form for the existing customer with this id
    #[arg(long, value_name = "ID")]
    pub existing_id: Option<String>,
    /// Proceed with a new customer despite possible duplicates
    #[arg(long, requires = "new")]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
struct PrefillDto {
    url: String,
    new_customer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_id: Option<String>,
}

pub fn prefill_url(ctx: &Context<'_>, args: PrefillUrlArgs) -> Result<()> {
    validate_search(&args.candidate)?;
    let form = prefill_form(&ctx.config.form)?;
    let index = ctx.load_index()?;

    let status = match args.existing_id.as_deref().map(str::trim) {
        Some(id) => {
            if id.is_empty() {
                return Err(invalid_input("customer id cannot be empty"));
            }
            if !index.iter().any(|record| record.id == id) {
                return Err(not_found(format!("customer {id}")));
            }
            CustomerStatus::Existing(id.to_string())
        }
        None => {
            validate_new_customer(&args.candidate)?;
            let result = classify(&args.candidate.to_candidate(), &index);
            debug!(decision = result.decision.label(), "new customer checked");
            match &result.decision {
                Decision::ExactSame { record } => {
                    if !ctx.json {
                        print_classification(&result);
                    }
                    // Id-less rows still match but cannot be referenced.
                    if record.id.is_empty() {
                        return Err(invalid_input(format!(
                            "customer already on file as {} ({}) without an id; \
                             assign an id to that pipeline row before prefilling",
                            record.full_name, record.phone
                        )));
                    }
                    return Err(invalid_input(format!(
                        "customer already on file as {}; use --existing-id {}",
                        record.id, record.id
                    )));
                }
                Decision::WarnConfirm { reason } if !args.confirm => {
                    if !ctx.json {
                        print_classification(&result);
                    }
                    return Err(invalid_input(format!(
                        "possible duplicate ({}); rerun with --confirm to add a new customer",
                        reason.as_str()
                    )));
                }
                _ => CustomerStatus::New,
            }
        }
    };

    let request = PrefillRequest {
        first_name: args.candidate.first_name.clone(),
        last_name: args.candidate.last_name.clone(),
        phone: args.candidate.phone.clone(),
        status,
    };
    let url = build_prefill_url(&form, &request)?;

    if ctx.json {
        let (new_customer, customer_id) = match request.status {
            CustomerStatus::New => (true, None),
            CustomerStatus::Existing(id) => (false, Some(id)),
        };
        return print_json(&PrefillDto {
            url,
            new_customer,
            customer_id,
        });
    }
    println!("{url}");
    Ok(())
}

fn prefill_form(config: &FormConfig) -> Result<PrefillForm> {
    let Some(url) = config.url.clone() else {
        return Err(invalid_input("form.url is not configured"));
    };
    Ok(PrefillForm {
        url,
        new_customer_yes: config.new_customer_yes.clone(),
        new_customer_no: config.new_customer_no.clone(),
        entries: PrefillEntries {
            first_name: config.entries.first_name.clone(),
            last_name: config.entries.last_name.clone(),
            phone: config.entries.phone.clone(),
            new_customer: config.entries.new_customer.clone(),
            customer_id: config.entries.customer_id.clone(),
        },
    })
}
