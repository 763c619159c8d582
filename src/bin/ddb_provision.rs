//! ddb-provision: ensure DynamoDB tables exist at startup
//!
//! Creates every configured table that does not exist yet, deriving its
//! schema from the bound entity model. Existing tables are left untouched.
//! Any failure exits non-zero so the surrounding startup sequence aborts.
//!
//! ## Configuration
//! - `ddb-provision.yaml` in the working directory, `--config`, or DDB_PROVISION_CONFIG
//! - DDB_PROVISION__DYNAMO__ENDPOINT_URL: endpoint override (e.g. DynamoDB Local)
//! - DDB_PROVISION__DYNAMO__REGION: AWS region
//! - DDB_PROVISION_LOG: tracing filter (default: info)

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use ddb_provisioner::config::Config;
use ddb_provisioner::control_plane::DynamoControlPlane;
use ddb_provisioner::provisioner::{plan_table, Ensured, Provisioner};
use ddb_provisioner::utils::bootstrap::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<String>,
    /// Print the create request for each table as JSON without calling DynamoDB.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing();

    let config = Config::load(args.config.as_deref())?;
    let tables = config.resolve_tables()?;

    if args.dry_run {
        for (table, descriptor) in &tables {
            let request = plan_table(table, descriptor, config.attribute_typing)?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        return Ok(());
    }

    let control_plane = Arc::new(DynamoControlPlane::new(&config.dynamo).await);
    let provisioner =
        Provisioner::new(control_plane).with_attribute_typing(config.attribute_typing);

    let mut created = 0;
    for (table, descriptor) in &tables {
        match provisioner.ensure_table(table, descriptor).await {
            Ok(Ensured::Created(_)) => created += 1,
            Ok(Ensured::AlreadyExists(_)) => {}
            Err(e) => {
                error!(table = %table, error = %e, "Failed to ensure table");
                return Err(e.into());
            }
        }
    }

    info!(
        tables = tables.len(),
        created = created,
        "All tables provisioned"
    );

    Ok(())
}
