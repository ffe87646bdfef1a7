use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use anyhow::Result;
use clap::Args;
use gatekeeper_core::{CustomerRecord, SUB_RECORD_SEPARATOR};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Args)]
pub struct OrdersArgs {
    /// Base customer id (without an order suffix)
    #[arg(long, value_name = "ID")]
    pub id: String,
}

#[derive(Debug, Serialize)]
struct CustomerOrdersDto<'a> {
    id: &'a str,
    full_name: &'a str,
    phones: &'a [String],
    orders: Vec<OrderDto<'a>>,
}

#[derive(Debug, Serialize)]
struct OrderDto<'a> {
    id: &'a str,
    full_name: &'a str,
    phone: &'a str,
}

impl<'a> From<&'a CustomerRecord> for OrderDto<'a> {
    fn from(record: &'a CustomerRecord) -> Self {
        Self {
            id: &record.id,
            full_name: &record.full_name,
            phone: record.primary_phone(),
        }
    }
}

/// Lists the order sub-records filed under one base customer.
pub fn orders(ctx: &Context<'_>, args: OrdersArgs) -> Result<()> {
    let id = args.id.trim();
    if id.is_empty() {
        return Err(invalid_input("customer id cannot be empty"));
    }
    if id.contains(SUB_RECORD_SEPARATOR) {
        return Err(invalid_input(format!(
            "{id} is an order id; pass the base customer id before '{SUB_RECORD_SEPARATOR}'"
        )));
    }

    let index = ctx.load_index()?;
    let customer = index
        .customer(id)
        .ok_or_else(|| not_found(format!("customer {id}")))?;
    let dto = CustomerOrdersDto {
        id: &customer.id,
        full_name: &customer.full_name,
        phones: &customer.phones,
        orders: index.orders_of(id).map(OrderDto::from).collect(),
    };
    debug!(id, orders = dto.orders.len(), "customer orders listed");

    if ctx.json {
        return print_json(&dto);
    }

    println!("{}  {} ({})", dto.id, dto.full_name, dto.phones.join(", "));
    if dto.orders.is_empty() {
        println!("no orders on file");
        return Ok(());
    }
    println!("Orders:");
    for order in &dto.orders {
        println!("- {}  {} ({})", order.id, order.full_name, order.phone);
    }
    Ok(())
}
