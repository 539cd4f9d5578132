//! Populates the Postgres store.
//!
//! `seed [COUNT]` inserts randomly generated leads (default 50).
//! `seed --users` creates one viewer and one saler account.

use anyhow::{Context, bail};
use chrono::Utc;
use db::{DBService, models::lead::Lead};
use server::config::{Config, StoreConfig};
use services::services::{
    sample_leads::{DEFAULT_COUNT, generate_lead},
    sample_users::ensure_demo_users,
    store::{PgStore, Repository},
};
use tracing::info;
use utils::logging::init_tracing;

enum Mode {
    Leads(usize),
    Users,
}

fn parse_mode(arg: Option<String>) -> anyhow::Result<Mode> {
    match arg.as_deref() {
        None => Ok(Mode::Leads(DEFAULT_COUNT)),
        Some("--users") => Ok(Mode::Users),
        Some(raw) => raw
            .parse::<usize>()
            .map(Mode::Leads)
            .with_context(|| format!("invalid lead count '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mode = parse_mode(std::env::args().nth(1))?;

    let config = Config::from_env().context("invalid configuration")?;
    let StoreConfig::Postgres {
        database_url,
        max_connections,
    } = config.store
    else {
        bail!("seeding requires STORE=postgres");
    };

    let store = PgStore::new(DBService::new(&database_url, max_connections).await?);

    match mode {
        Mode::Users => {
            let users = ensure_demo_users(&store).await?;
            info!(count = users.len(), "Demo users created");
        }
        Mode::Leads(count) => {
            let now = Utc::now();
            let mut rng = rand::thread_rng();
            for n in 0..count {
                let lead = Repository::<Lead>::create(&store, generate_lead(&mut rng, now)).await?;
                info!(n = n + 1, id = %lead.id, name = %lead.name, "Inserted lead");
            }
            info!(count, "Seeding complete");
        }
    }
    Ok(())
}
