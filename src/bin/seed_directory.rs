use anyhow::{Context, Result};
use clap::Parser;
use tenders::{
    config::ConfigLoader,
    db,
    models::organization::OrganizationType,
    seeds::{grant_responsibility, seed_demo_directory, seed_employee, seed_organization},
};

/// Seed employees and organizations for local development.
///
/// Without arguments the demo directory is created. With `--username` and
/// `--organization` the given employee is made responsible for the given
/// organization, creating either when missing.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Employee username to create or reuse
    #[arg(short, long, requires = "organization")]
    username: Option<String>,

    /// Organization name to create or reuse
    #[arg(short, long, requires = "username")]
    organization: Option<String>,

    /// Organization type used when the organization is created (IE, LLC or JSC)
    #[arg(long, default_value = "LLC", value_parser = parse_organization_type)]
    organization_type: OrganizationType,

    /// Apply migrations before seeding
    #[arg(long)]
    migrate: bool,
}

fn parse_organization_type(value: &str) -> Result<OrganizationType, String> {
    match value.trim().to_ascii_uppercase().as_str() {
        "IE" => Ok(OrganizationType::Ie),
        "LLC" => Ok(OrganizationType::Llc),
        "JSC" => Ok(OrganizationType::Jsc),
        other => Err(format!("unknown organization type '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    if args.migrate {
        db::migrate(&db).await?;
    }

    match (args.username, args.organization) {
        (Some(username), Some(organization)) => {
            let employee = seed_employee(&db, &username, None, None).await?;
            let organization =
                seed_organization(&db, &organization, None, args.organization_type).await?;
            grant_responsibility(&db, organization.id, employee.id).await?;
            println!(
                "{} is responsible for {} ({})",
                employee.username, organization.name, organization.id
            );
        }
        _ => {
            let directory = seed_demo_directory(&db).await?;
            println!(
                "Seeded organization {} ({}) with responsible '{}' and outsider '{}'",
                directory.organization.name,
                directory.organization.id,
                directory.responsible.username,
                directory.outsider.username
            );
        }
    }

    Ok(())
}
