//! Command-line interface over the inventory store.
//!
//! Subcommands map one-to-one onto repository operations:
//! - `signup`, `login`, `reset-password` - credential store
//! - `manufacturers`, `suppliers`, `models` - catalogs
//! - `assets`, `users`, `assignments` - registries
//! - `schema ensure|status` - table maintenance
//! - `config check` - validate the configuration file

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::db::{
    self, schema, AssetInput, AssetModelInput, EnrollRequest, ManufacturerInput, NewAssignment,
    ResetPasswordRequest, SupplierInput, UserInput, Verification,
};
use crate::error::InventoryError;
use crate::Inventory;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "inventario")]
#[command(author, version, about = "Asset inventory on an embedded SQLite store", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "inventario.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Database file (overrides [database].path)
    #[arg(long, env = "INVENTARIO_DATABASE")]
    pub database: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a login
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "INVENTARIO_PASSWORD")]
        password: String,
        /// Repeat the password; checked when given
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Check a password against the stored login
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "INVENTARIO_PASSWORD")]
        password: String,
    },

    /// Replace the password of every login with this email
    ResetPassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm: Option<String>,
    },

    /// Manufacturer catalog
    #[command(subcommand)]
    Manufacturers(ManufacturerCommands),

    /// Supplier catalog
    #[command(subcommand)]
    Suppliers(SupplierCommands),

    /// Asset model catalog
    #[command(subcommand)]
    Models(ModelCommands),

    /// Asset registry
    #[command(subcommand)]
    Assets(AssetCommands),

    /// Organizational users
    #[command(subcommand)]
    Users(UserCommands),

    /// Asset assignments
    #[command(subcommand)]
    Assignments(AssignmentCommands),

    /// Table maintenance
    #[command(subcommand)]
    Schema(SchemaCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ManufacturerCommands {
    List,
    Add {
        #[arg(long)]
        name: String,
        /// CNPJ, with or without punctuation
        #[arg(long)]
        tax_id: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SupplierCommands {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: String,
        /// yes/no (Sim/Não)
        #[arg(long)]
        contract: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        tax_id: String,
        #[arg(long)]
        contract: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModelCommands {
    List,
    Add {
        #[arg(long)]
        name: String,
        /// Smartphone, Notebook or Monitor
        #[arg(long = "type")]
        asset_type: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        asset_type: String,
    },
}

/// Asset fields shared by `add` and `update`
#[derive(Args, Debug)]
pub struct AssetArgs {
    #[arg(long)]
    pub serial: String,
    /// Smartphone, Notebook or Monitor
    #[arg(long = "type")]
    pub asset_type: String,
    #[arg(long)]
    pub manufacturer: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub property_number: Option<String>,
    /// Required for smartphones, ignored otherwise
    #[arg(long)]
    pub imei: Option<String>,
}

impl From<&AssetArgs> for AssetInput {
    fn from(args: &AssetArgs) -> Self {
        Self {
            serial: args.serial.clone(),
            asset_type: args.asset_type.clone(),
            manufacturer: args.manufacturer.clone(),
            model: args.model.clone(),
            property_number: args.property_number.clone(),
            imei: args.imei.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    List,
    /// Show every asset registered under a serial
    Show { serial: String },
    Add(AssetArgs),
    Update {
        /// Serial currently on record
        current: String,
        #[command(flatten)]
        asset: AssetArgs,
    },
}

/// User fields shared by `add` and `update`
#[derive(Args, Debug)]
pub struct UserArgs {
    /// Register a vessel (identified by IMO number) instead of an employee
    #[arg(long)]
    pub vessel: bool,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub cost_center: String,
    /// Registration number, or IMO number for vessels
    #[arg(long, default_value = "")]
    pub identifier: String,
}

impl From<&UserArgs> for UserInput {
    fn from(args: &UserArgs) -> Self {
        Self {
            is_vessel: args.vessel,
            full_name: args.name.clone(),
            cost_center: args.cost_center.clone(),
            identifier: args.identifier.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    List,
    Add(UserArgs),
    Update {
        id: i64,
        #[command(flatten)]
        user: UserArgs,
    },
    Deactivate { id: i64 },
    /// Search by name or registration number
    Search { term: String },
}

#[derive(Subcommand, Debug)]
pub enum AssignmentCommands {
    /// Hand an asset to a user
    Create {
        #[arg(long)]
        serial: String,
        /// Registration or IMO number of the receiving user
        #[arg(long)]
        identifier: String,
        /// DD-MM-YYYY
        #[arg(long)]
        date: String,
        #[arg(long)]
        document: Option<String>,
    },
    /// Assignment history of one serial
    History { serial: String },
    /// Search by registration number, IMO number or serial
    Search { term: String },
}

#[derive(Subcommand, Debug)]
pub enum SchemaCommands {
    /// Create missing tables and upgrade legacy ones
    Ensure,
    /// Report which tables exist
    Status,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

impl Cli {
    /// Whether the command needs an open store
    pub fn needs_store(&self) -> bool {
        !matches!(self.command, Commands::Config(_))
    }
}

/// Run a command that does not touch the store
pub fn run_offline(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Config(ConfigCommands::Check) => cmd_config_check(&cli.config),
        _ => anyhow::bail!("This command needs an open database"),
    }
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, inventory: &Inventory) -> Result<()> {
    let out = Output { json: cli.json };

    match &cli.command {
        Commands::Signup {
            name,
            email,
            password,
            confirm,
        } => {
            let summary = inventory
                .credentials
                .enroll(&EnrollRequest {
                    name: name.clone(),
                    email: email.clone(),
                    password: password.clone(),
                    confirm_password: confirm.clone(),
                })
                .await?;
            out.done(&summary, &format!("Login created for {}", summary.email))
        }
        Commands::Login { email, password } => cmd_login(&out, inventory, email, password).await,
        Commands::ResetPassword {
            email,
            new_password,
            confirm,
        } => {
            inventory
                .credentials
                .reset_password(&ResetPasswordRequest {
                    email: email.clone(),
                    new_password: new_password.clone(),
                    confirm_password: confirm.clone(),
                })
                .await?;
            println!("[OK] Password updated for {}", email.trim());
            Ok(())
        }
        Commands::Manufacturers(cmd) => cmd_manufacturers(&out, inventory, cmd).await,
        Commands::Suppliers(cmd) => cmd_suppliers(&out, inventory, cmd).await,
        Commands::Models(cmd) => cmd_models(&out, inventory, cmd).await,
        Commands::Assets(cmd) => cmd_assets(&out, inventory, cmd).await,
        Commands::Users(cmd) => cmd_users(&out, inventory, cmd).await,
        Commands::Assignments(cmd) => cmd_assignments(&out, inventory, cmd).await,
        Commands::Schema(SchemaCommands::Ensure) => cmd_schema_ensure(inventory).await,
        Commands::Schema(SchemaCommands::Status) => cmd_schema_status(inventory).await,
        Commands::Config(_) => run_offline(cli),
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
        println!("{}", text);
        Ok(())
    }

    /// Confirm a write: the stored record as JSON, or a one-line message
    fn done<T: Serialize>(&self, value: &T, message: &str) -> Result<()> {
        if self.json {
            self.print_json(value)
        } else {
            println!("[OK] {}", message);
            Ok(())
        }
    }
}

async fn cmd_login(out: &Output, inventory: &Inventory, email: &str, password: &str) -> Result<()> {
    let verification = inventory.credentials.verify(email, password).await?;
    if out.json {
        out.print_json(&verification)?;
    }

    match verification {
        Verification::Matched(summary) => {
            if !out.json {
                println!("[OK] Welcome, {}", summary.name);
            }
            Ok(())
        }
        Verification::Mismatch => anyhow::bail!("Incorrect password"),
        Verification::NotFound => anyhow::bail!("No login registered for {}", email.trim()),
    }
}

async fn cmd_manufacturers(
    out: &Output,
    inventory: &Inventory,
    cmd: &ManufacturerCommands,
) -> Result<()> {
    let repo = &inventory.manufacturers;
    match cmd {
        ManufacturerCommands::List => {
            let manufacturers = repo.list().await?;
            if out.json {
                return out.print_json(&manufacturers);
            }
            if manufacturers.is_empty() {
                println!("No manufacturers found.");
                return Ok(());
            }

            println!();
            println!("{:<6}  {:<30}  {:<20}", "ID", "NAME", "CNPJ");
            println!("{}", "-".repeat(60));
            for m in manufacturers {
                println!(
                    "{:<6}  {:<30}  {:<20}",
                    m.id,
                    truncate(&m.name, 30),
                    m.formatted_tax_id()
                );
            }
            println!();
            Ok(())
        }
        ManufacturerCommands::Add { name, tax_id } => {
            let m = repo
                .insert(&ManufacturerInput {
                    name: name.clone(),
                    tax_id: tax_id.clone(),
                })
                .await?;
            out.done(&m, &format!("Manufacturer {} registered (id {})", m.name, m.id))
        }
        ManufacturerCommands::Update { id, name, tax_id } => {
            let m = repo
                .update(
                    *id,
                    &ManufacturerInput {
                        name: name.clone(),
                        tax_id: tax_id.clone(),
                    },
                )
                .await?;
            out.done(&m, &format!("Manufacturer {} updated", m.id))
        }
    }
}

async fn cmd_suppliers(out: &Output, inventory: &Inventory, cmd: &SupplierCommands) -> Result<()> {
    let repo = &inventory.suppliers;
    match cmd {
        SupplierCommands::List => {
            let suppliers = repo.list().await?;
            if out.json {
                return out.print_json(&suppliers);
            }
            if suppliers.is_empty() {
                println!("No suppliers found.");
                return Ok(());
            }

            println!();
            println!(
                "{:<6}  {:<30}  {:<20}  {:<8}",
                "ID", "NAME", "CNPJ", "CONTRACT"
            );
            println!("{}", "-".repeat(70));
            for s in suppliers {
                println!(
                    "{:<6}  {:<30}  {:<20}  {:<8}",
                    s.id,
                    truncate(&s.name, 30),
                    s.formatted_tax_id(),
                    s.active_contract
                );
            }
            println!();
            Ok(())
        }
        SupplierCommands::Add {
            name,
            tax_id,
            contract,
        } => {
            let s = repo
                .insert(&SupplierInput {
                    name: name.clone(),
                    tax_id: tax_id.clone(),
                    active_contract: contract.clone(),
                })
                .await?;
            out.done(&s, &format!("Supplier {} registered (id {})", s.name, s.id))
        }
        SupplierCommands::Update {
            id,
            name,
            tax_id,
            contract,
        } => {
            let s = repo
                .update(
                    *id,
                    &SupplierInput {
                        name: name.clone(),
                        tax_id: tax_id.clone(),
                        active_contract: contract.clone(),
                    },
                )
                .await?;
            out.done(&s, &format!("Supplier {} updated", s.id))
        }
    }
}

async fn cmd_models(out: &Output, inventory: &Inventory, cmd: &ModelCommands) -> Result<()> {
    let repo = &inventory.models;
    match cmd {
        ModelCommands::List => {
            let models = repo.list().await?;
            if out.json {
                return out.print_json(&models);
            }
            if models.is_empty() {
                println!("No asset models found.");
                return Ok(());
            }

            println!();
            println!("{:<6}  {:<30}  {:<12}", "ID", "NAME", "TYPE");
            println!("{}", "-".repeat(52));
            for m in models {
                println!(
                    "{:<6}  {:<30}  {:<12}",
                    m.id,
                    truncate(&m.name, 30),
                    m.asset_type
                );
            }
            println!();
            Ok(())
        }
        ModelCommands::Add { name, asset_type } => {
            let m = repo
                .insert(&AssetModelInput {
                    name: name.clone(),
                    asset_type: asset_type.clone(),
                })
                .await?;
            out.done(&m, &format!("Model {} registered (id {})", m.name, m.id))
        }
        ModelCommands::Update {
            id,
            name,
            asset_type,
        } => {
            let m = repo
                .update(
                    *id,
                    &AssetModelInput {
                        name: name.clone(),
                        asset_type: asset_type.clone(),
                    },
                )
                .await?;
            out.done(&m, &format!("Model {} updated", m.id))
        }
    }
}

fn print_assets(assets: &[crate::db::Asset]) {
    println!();
    println!(
        "{:<20}  {:<11}  {:<16}  {:<20}  {:<12}  {:<16}",
        "SERIAL", "TYPE", "MANUFACTURER", "MODEL", "PROPERTY", "IMEI"
    );
    println!("{}", "-".repeat(106));
    for a in assets {
        println!(
            "{:<20}  {:<11}  {:<16}  {:<20}  {:<12}  {:<16}",
            truncate(&a.serial, 20),
            a.asset_type,
            truncate(&a.manufacturer, 16),
            truncate(&a.model, 20),
            a.property_number.as_deref().unwrap_or("-"),
            a.imei.as_deref().unwrap_or("-")
        );
    }
    println!();
}

async fn cmd_assets(out: &Output, inventory: &Inventory, cmd: &AssetCommands) -> Result<()> {
    let repo = &inventory.assets;
    match cmd {
        AssetCommands::List => {
            let assets = repo.list().await?;
            if out.json {
                return out.print_json(&assets);
            }
            if assets.is_empty() {
                println!("No assets found.");
            } else {
                print_assets(&assets);
            }
            Ok(())
        }
        AssetCommands::Show { serial } => {
            let assets = inventory.search.search_assets(serial).await?;
            if out.json {
                return out.print_json(&assets);
            }
            if assets.is_empty() {
                anyhow::bail!("No asset registered under serial {}", serial.trim());
            }
            print_assets(&assets);
            Ok(())
        }
        AssetCommands::Add(args) => {
            let asset = repo.insert(&AssetInput::from(args)).await?;
            out.done(&asset, &format!("Asset {} registered", asset.serial))
        }
        AssetCommands::Update { current, asset } => {
            let asset = repo.update(current, &AssetInput::from(asset)).await?;
            out.done(&asset, &format!("Asset {} updated", asset.serial))
        }
    }
}

fn print_users(users: &[crate::db::User]) {
    println!();
    println!(
        "{:<6}  {:<11}  {:<30}  {:<12}  {:<12}  {:<10}",
        "ID", "TYPE", "NAME", "COST CENTER", "NUMBER", "STATUS"
    );
    println!("{}", "-".repeat(91));
    for u in users {
        let number = u
            .identifier()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6}  {:<11}  {:<30}  {:<12}  {:<12}  {:<10}",
            u.id,
            u.user_type,
            truncate(&u.full_name, 30),
            truncate(&u.cost_center, 12),
            number,
            u.status
        );
    }
    println!();
}

async fn cmd_users(out: &Output, inventory: &Inventory, cmd: &UserCommands) -> Result<()> {
    let repo = &inventory.users;
    match cmd {
        UserCommands::List => {
            let users = repo.list().await?;
            if out.json {
                return out.print_json(&users);
            }
            if users.is_empty() {
                println!("No users found.");
            } else {
                print_users(&users);
            }
            Ok(())
        }
        UserCommands::Search { term } => {
            let users = inventory.search.search_users(term).await?;
            if out.json {
                return out.print_json(&users);
            }
            if users.is_empty() {
                println!("No users match '{}'.", term.trim());
            } else {
                print_users(&users);
            }
            Ok(())
        }
        UserCommands::Add(args) => {
            let user = repo.insert(&UserInput::from(args)).await?;
            out.done(&user, &format!("User {} registered (id {})", user.full_name, user.id))
        }
        UserCommands::Update { id, user } => {
            let user = repo.update(*id, &UserInput::from(user)).await?;
            out.done(&user, &format!("User {} updated", user.id))
        }
        UserCommands::Deactivate { id } => {
            repo.deactivate(*id).await?;
            println!("[OK] User {} deactivated", id);
            Ok(())
        }
    }
}

async fn cmd_assignments(
    out: &Output,
    inventory: &Inventory,
    cmd: &AssignmentCommands,
) -> Result<()> {
    match cmd {
        AssignmentCommands::Create {
            serial,
            identifier,
            date,
            document,
        } => {
            let assignment = inventory
                .assignments
                .create(&NewAssignment {
                    serial: serial.clone(),
                    identifier: identifier.clone(),
                    received_date: date.clone(),
                    document_reference: document.clone(),
                })
                .await?;
            out.done(
                &assignment,
                &format!(
                    "Asset {} assigned to {} (id {})",
                    assignment.serial, assignment.user_identifier, assignment.id
                ),
            )
        }
        AssignmentCommands::History { serial } => {
            let history = inventory.assignments.list_by_serial(serial).await?;
            if out.json {
                return out.print_json(&history);
            }
            if history.is_empty() {
                println!("No assignments for {}.", serial.trim());
                return Ok(());
            }

            println!();
            println!("{:<6}  {:<14}  {:<12}  {:<20}", "ID", "USER", "RECEIVED", "DOCUMENT");
            println!("{}", "-".repeat(58));
            for a in history {
                println!(
                    "{:<6}  {:<14}  {:<12}  {:<20}",
                    a.id,
                    a.user_identifier,
                    a.received_date,
                    a.document_reference.as_deref().unwrap_or("-")
                );
            }
            println!();
            Ok(())
        }
        AssignmentCommands::Search { term } => {
            let records = inventory.search.search_assignments(term).await?;
            if out.json {
                return out.print_json(&records);
            }
            if records.is_empty() {
                println!("No assignments match '{}'.", term.trim());
                return Ok(());
            }

            println!();
            println!(
                "{:<6}  {:<20}  {:<30}  {:<12}  {:<12}  {:<20}",
                "ID", "SERIAL", "USER", "NUMBER", "RECEIVED", "DOCUMENT"
            );
            println!("{}", "-".repeat(110));
            for r in records {
                println!(
                    "{:<6}  {:<20}  {:<30}  {:<12}  {:<12}  {:<20}",
                    r.id,
                    truncate(&r.serial, 20),
                    truncate(&r.user_name, 30),
                    r.user_identifier,
                    r.received_date,
                    r.document_reference.as_deref().unwrap_or("-")
                );
            }
            println!();
            Ok(())
        }
    }
}

async fn cmd_schema_ensure(inventory: &Inventory) -> Result<()> {
    let failed = inventory.ensure_schema().await;
    if failed.is_empty() {
        println!("[OK] All {} tables are ready", schema::ALL_TABLES.len());
        Ok(())
    } else {
        anyhow::bail!("Failed to ensure tables: {}", failed.join(", "))
    }
}

async fn cmd_schema_status(inventory: &Inventory) -> Result<()> {
    println!();
    for table in schema::ALL_TABLES.iter() {
        let exists = db::table_exists(inventory.store.pool(), table.name).await?;
        let icon = if exists { "[OK]" } else { "[!!]" };
        let status = if exists { "present" } else { "missing" };
        println!("  {} {:14} {}", icon, table.name, status);
    }
    println!();
    Ok(())
}

/// Validate configuration file
pub fn cmd_config_check(config_path: &Path) -> Result<()> {
    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used. See inventario.example.toml for the available settings.");
        return Ok(());
    }

    let config = Config::load(config_path)?;
    let on_off = |enabled: bool| if enabled { "Enabled" } else { "Disabled" };

    println!("[OK] Configuration file is valid!");
    println!();
    println!("Database:");
    println!("  Path:            {}", config.database.path.display());
    println!("  Connections:     {}", config.database.max_connections);
    println!();
    println!("Logging:");
    println!("  Level:           {}", config.logging.level);
    println!();
    println!("Rules:");
    println!(
        "  Unique emails:   {}",
        on_off(config.rules.unique_login_email)
    );
    println!(
        "  Unique serials:  {}",
        on_off(config.rules.unique_asset_serial)
    );
    println!(
        "  Existing asset:  {}",
        on_off(config.rules.require_existing_asset)
    );
    println!(
        "  Catalog names:   {}",
        on_off(config.rules.require_catalog_references)
    );
    println!();
    Ok(())
}

/// One "field: message" line per rejected input, sorted by field.
///
/// Empty unless `err` carries a validation failure.
pub fn validation_details(err: &anyhow::Error) -> Vec<String> {
    let errors = match err
        .chain()
        .find_map(|cause| cause.downcast_ref::<InventoryError>())
    {
        Some(InventoryError::Validation(errors)) => errors,
        _ => return Vec::new(),
    };

    let mut lines: Vec<String> = errors
        .fields()
        .flat_map(|(field, messages)| {
            messages
                .iter()
                .map(move |message| format!("{}: {}", field, message))
        })
        .collect();
    lines.sort();
    lines
}

/// Print the per-field breakdown of a failed command to stderr
pub fn report_error(err: &anyhow::Error) {
    for line in validation_details(err) {
        eprintln!("  {}", line);
    }
}

/// Truncate to `max_len` characters, marking the cut with "..."
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
