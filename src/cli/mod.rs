use chrono::Utc;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::services::{normalize_memos, Aggregator, JsonStore, StatsOptions};
use crate::types::{
    MemoEntry, Plan, PlanCatalog, Result, ServiceRegistry, SubtrackError,
};

/// Subscription plan, usage, and memo tracker for your SaaS tool stack
#[derive(Parser)]
#[command(name = "subtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered services grouped by category, with assigned plans
    Services,

    /// Show monthly usage statistics (default)
    Stats {
        /// Only include services on a paid plan
        #[arg(long)]
        paid_only: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show total monthly spend and paid subscription count
    Costs {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a use of a service right now
    Use { service: String },

    /// Assign a subscription plan (free, basic, pro) to a service
    Plan { service: String, plan: String },

    /// List notes, or manage them with a subcommand
    Notes {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        #[command(subcommand)]
        action: Option<NoteAction>,
    },
}

#[derive(Subcommand)]
enum NoteAction {
    /// Add a note, optionally tagged with the tool it relates to
    Add {
        text: String,
        #[arg(long)]
        tool: Option<String>,
    },

    /// Delete a note record by id (removes every note stored under it)
    Rm { id: Uuid },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let store = JsonStore::new()?;
        let registry = ServiceRegistry::builtin();
        let catalog = PlanCatalog::default();

        match self.command {
            None => show_stats(&store, &catalog, StatsOptions::default(), false).await,
            Some(Commands::Stats { paid_only, json }) => {
                show_stats(&store, &catalog, StatsOptions { paid_only }, json).await
            }
            Some(Commands::Services) => show_services(&store, &registry, &catalog).await,
            Some(Commands::Costs { json }) => show_costs(&store, &registry, &catalog, json).await,
            Some(Commands::Use { service }) => {
                ensure_known_service(&registry, &service)?;
                store.append_usage(&service, Utc::now()).await?;
                println!("Recorded use of {}", service);
                Ok(())
            }
            Some(Commands::Plan { service, plan }) => {
                ensure_known_service(&registry, &service)?;
                let plan: Plan = plan.parse()?;
                store.upsert_plan(&service, plan).await?;
                println!(
                    "{} is now on the {} plan (${}/mo)",
                    service,
                    plan,
                    catalog.monthly_price(plan)
                );
                Ok(())
            }
            Some(Commands::Notes { json, action }) => match action {
                None => show_notes(&store, json).await,
                Some(NoteAction::Add { text, tool }) => {
                    let entry = MemoEntry {
                        text,
                        tool: tool.unwrap_or_default(),
                    };
                    let id = store.add_memo(vec![entry]).await?;
                    println!("Added note {}", id);
                    Ok(())
                }
                Some(NoteAction::Rm { id }) => {
                    if store.delete_memo(id).await? {
                        println!("Deleted note record {}", id);
                    } else {
                        println!("No note record with id {}", id);
                    }
                    Ok(())
                }
            },
        }
    }
}

async fn show_stats(
    store: &JsonStore,
    catalog: &PlanCatalog,
    options: StatsOptions,
    json: bool,
) -> anyhow::Result<()> {
    let usage = store.fetch_usage_records().await?;
    let assignments = store.fetch_plan_assignments().await?;
    let now = Utc::now();
    let stats = Aggregator::monthly_stats(&usage, &assignments, catalog, now, options);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if stats.is_empty() {
        if options.paid_only {
            println!("No usage recorded for paid services");
        } else {
            println!("No usage recorded yet");
        }
        return Ok(());
    }

    println!("Usage for {}", now.format("%B %Y"));
    for stat in &stats {
        println!(
            "  {:<22} {:<6} {:>4} uses  ${:>3}/mo  ${:.2}/use",
            stat.service_name,
            stat.plan.as_str(),
            stat.monthly_count,
            stat.monthly_price,
            stat.cost_per_use
        );
    }
    Ok(())
}

async fn show_services(
    store: &JsonStore,
    registry: &ServiceRegistry,
    catalog: &PlanCatalog,
) -> anyhow::Result<()> {
    let assignments = store.fetch_plan_assignments().await?;
    let summary = Aggregator::cost_summary(registry, &assignments, catalog);

    println!(
        "Monthly total: ${}   Paid plans: {}",
        summary.total_monthly_cost, summary.paid_service_count
    );

    for (category, services) in registry.by_category() {
        println!("\n{}", category);
        for service in services {
            let plan = assignments
                .iter()
                .find(|a| a.service_name == service.name)
                .map(|a| a.plan)
                .unwrap_or_default();
            println!(
                "  {:<22} {:<6} ${:>3}/mo  {}",
                service.name,
                plan.as_str(),
                catalog.monthly_price(plan),
                service.url
            );
        }
    }
    Ok(())
}

async fn show_costs(
    store: &JsonStore,
    registry: &ServiceRegistry,
    catalog: &PlanCatalog,
    json: bool,
) -> anyhow::Result<()> {
    let assignments = store.fetch_plan_assignments().await?;
    let summary = Aggregator::cost_summary(registry, &assignments, catalog);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Monthly total: ${}", summary.total_monthly_cost);
        println!("Paid subscriptions: {}", summary.paid_service_count);
    }
    Ok(())
}

async fn show_notes(store: &JsonStore, json: bool) -> anyhow::Result<()> {
    let memos = store.fetch_memo_records().await?;
    let notes = normalize_memos(&memos);

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    if notes.is_empty() {
        println!("No notes yet");
        return Ok(());
    }

    for note in &notes {
        if note.tool.is_empty() {
            println!("{}  {}", note.id, note.text);
        } else {
            println!("{}  {} (tool: {})", note.id, note.text, note.tool);
        }
    }
    Ok(())
}

fn ensure_known_service(registry: &ServiceRegistry, name: &str) -> Result<()> {
    if registry.contains(name) {
        return Ok(());
    }
    Err(SubtrackError::Config(format!(
        "unknown service '{}'; run `subtrack services` to list known services",
        name
    )))
}
