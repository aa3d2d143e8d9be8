use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use eudr::cli::admin::{AdminAction, RecordPatch};
use eudr::cli::calculate::CalculateArgs;
use eudr::cli::list::ListTarget;
use eudr::core::log::init_logging;
use eudr::core::reference::{Collection, RiskLevel};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert a processed quantity into raw equivalent, planted area and risk
    Calculate {
        /// Raw commodity, e.g. "Cocoa"
        #[arg(long)]
        commodity: String,
        /// Processed product id or name, e.g. "Cocoa butter"
        #[arg(long)]
        product: String,
        /// Quantity of the processed product in kg
        #[arg(long)]
        quantity: String,
        /// Origin country, e.g. "Ivory Coast"
        #[arg(long)]
        country: String,
        /// Write a due diligence report to the report directory
        #[arg(long)]
        report: bool,
    },
    /// List commodities, processed products or origin countries
    List {
        #[command(subcommand)]
        target: ListCommand,
    },
    /// Manage reference data
    Admin {
        /// Admin password
        #[arg(long, env = "EUDR_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[command(subcommand)]
        action: AdminCommand,
    },
    /// Load the default reference data into an empty store
    Seed {
        /// Admin password
        #[arg(long, env = "EUDR_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Replace existing reference data
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ListCommand {
    /// Raw commodities that have processed products
    Commodities,
    /// Processed products of a commodity
    Products {
        #[arg(long)]
        commodity: String,
    },
    /// Origin countries with yield data for a commodity
    Countries {
        #[arg(long)]
        commodity: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Products,
    Ratios,
    Yields,
    Risks,
}

impl From<Table> for Collection {
    fn from(table: Table) -> Collection {
        match table {
            Table::Products => Collection::ProductTypes,
            Table::Ratios => Collection::ConversionRatios,
            Table::Yields => Collection::YieldData,
            Table::Risks => Collection::RiskFlags,
        }
    }
}

#[derive(Args)]
struct RecordFields {
    #[arg(long)]
    commodity: Option<String>,
    /// Product name (products)
    #[arg(long)]
    name: Option<String>,
    /// Processed product name (ratios)
    #[arg(long)]
    processed_product: Option<String>,
    /// Raw kg needed per kg of processed product (ratios)
    #[arg(long)]
    ratio: Option<f64>,
    /// Country (yields, risks)
    #[arg(long)]
    country: Option<String>,
    /// Yield in kg per hectare per year (yields)
    #[arg(long = "yield")]
    yield_kg_per_ha: Option<f64>,
    /// Low, Medium or High (risks)
    #[arg(long)]
    risk_level: Option<RiskLevel>,
    /// Risk narrative (risks)
    #[arg(long)]
    description: Option<String>,
}

impl RecordFields {
    fn into_patch(self, table: Table) -> RecordPatch {
        match table {
            Table::Products => RecordPatch::Product {
                commodity: self.commodity,
                name: self.name,
            },
            Table::Ratios => RecordPatch::Ratio {
                commodity: self.commodity,
                processed_product: self.processed_product,
                ratio: self.ratio,
            },
            Table::Yields => RecordPatch::Yield {
                country: self.country,
                commodity: self.commodity,
                yield_kg_per_ha: self.yield_kg_per_ha,
            },
            Table::Risks => RecordPatch::Risk {
                country: self.country,
                risk_level: self.risk_level,
                description: self.description,
            },
        }
    }
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Show all records of a table
    List { table: Table },
    /// Add a record; every field of the table is required
    Add {
        table: Table,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Change the given fields of a record
    Update {
        table: Table,
        id: String,
        #[command(flatten)]
        fields: RecordFields,
    },
    /// Delete a record
    Remove { table: Table, id: String },
}

impl From<AdminCommand> for AdminAction {
    fn from(cmd: AdminCommand) -> AdminAction {
        match cmd {
            AdminCommand::List { table } => AdminAction::List(table.into()),
            AdminCommand::Add { table, fields } => AdminAction::Add(fields.into_patch(table)),
            AdminCommand::Update { table, id, fields } => AdminAction::Update {
                id,
                patch: fields.into_patch(table),
            },
            AdminCommand::Remove { table, id } => AdminAction::Remove {
                collection: table.into(),
                id,
            },
        }
    }
}

impl From<Commands> for eudr::AppCommand {
    fn from(cmd: Commands) -> eudr::AppCommand {
        match cmd {
            Commands::Calculate {
                commodity,
                product,
                quantity,
                country,
                report,
            } => eudr::AppCommand::Calculate(CalculateArgs {
                commodity,
                product,
                quantity,
                country,
                report,
            }),
            Commands::List { target } => eudr::AppCommand::List(match target {
                ListCommand::Commodities => ListTarget::Commodities,
                ListCommand::Products { commodity } => ListTarget::Products { commodity },
                ListCommand::Countries { commodity } => ListTarget::Countries { commodity },
            }),
            Commands::Admin { password, action } => eudr::AppCommand::Admin {
                password,
                action: action.into(),
            },
            Commands::Seed { password, force } => eudr::AppCommand::Seed { password, force },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => eudr::cli::setup::setup(),
        Some(cmd) => eudr::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
