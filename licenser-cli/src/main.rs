//! Licenser command-line tool
//!
//! Issues signed license files with a private key and verifies them with
//! the matching public key. Everything runs offline.
//!
//! Usage:
//!   licenser keygen --private-key private.pem --public-key public.pem
//!   licenser issue --private-key private.pem --customer Acme --app-id acme \
//!       --service api:API --expires-in-days 365 --out license.json
//!   licenser verify --public-key public.pem license.json
//!   licenser info --public-key public.pem license.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use licenser::{
    DEFAULT_KEY_SIZE, LicenseBuilder, Manager, ManagerConfig, Service, format_expiry,
};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "licenser")]
#[command(about = "Issue and verify offline RSA-signed licenses")]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new RSA key pair
    Keygen {
        /// Where to write the private key (PKCS#1 PEM)
        #[arg(long)]
        private_key: PathBuf,

        /// Where to write the public key (SPKI PEM)
        #[arg(long)]
        public_key: PathBuf,

        /// Modulus size in bits
        #[arg(long, default_value_t = DEFAULT_KEY_SIZE)]
        bits: usize,
    },

    /// Sign a new license
    Issue(IssueArgs),

    /// Check a license file, exiting with status 1 if it is invalid
    Verify {
        /// Public key PEM file
        #[arg(long)]
        public_key: PathBuf,

        /// License file
        license: PathBuf,
    },

    /// Print the details of a license file as JSON
    Info {
        /// Public key PEM file
        #[arg(long)]
        public_key: PathBuf,

        /// License file
        license: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct IssueArgs {
    /// Manager configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Private key PEM file, overriding the configuration
    #[arg(long)]
    private_key: Option<PathBuf>,

    #[arg(long)]
    customer: String,

    #[arg(long)]
    app_id: String,

    /// Licensed service as `id` or `id:name` (repeatable)
    #[arg(long = "service", value_parser = parse_service, required = true)]
    services: Vec<Service>,

    /// Usage limit as `name=value` (repeatable)
    #[arg(long = "limit", value_parser = parse_limit)]
    limits: Vec<(String, i64)>,

    /// Feature flag as `name` or `name=true|false` (repeatable)
    #[arg(long = "feature", value_parser = parse_feature)]
    features: Vec<(String, bool)>,

    /// Metadata entry as `key=value` (repeatable)
    #[arg(long = "metadata", value_parser = parse_metadata)]
    metadata: Vec<(String, String)>,

    /// Days until the license expires; omit for a perpetual license
    #[arg(long)]
    expires_in_days: Option<i64>,

    #[arg(long)]
    version: Option<String>,

    #[arg(long)]
    environment: Option<String>,

    /// Where to write the signed license
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Keygen {
            private_key,
            public_key,
            bits,
        } => keygen(&private_key, &public_key, bits),
        Command::Issue(issue_args) => issue(issue_args),
        Command::Verify {
            public_key,
            license,
        } => verify(&public_key, &license),
        Command::Info {
            public_key,
            license,
        } => print_info(&public_key, &license),
    }
}

fn keygen(private_key: &Path, public_key: &Path, bits: usize) -> Result<ExitCode> {
    info!("Generating {}-bit RSA key pair", bits);
    let manager = Manager::new(ManagerConfig::generator().with_key_size(bits))
        .context("Failed to generate key pair")?;
    manager
        .save_keys(private_key, public_key)
        .context("Failed to write key files")?;

    println!("Key ID: {}", manager.key_id());
    Ok(ExitCode::SUCCESS)
}

fn issue(args: IssueArgs) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => ManagerConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ManagerConfig::generator(),
    };
    if let Some(path) = args.private_key {
        config.private_key_pem = None;
        config = config.with_private_key_path(path);
    }
    if !config.mode.is_generator() {
        bail!("Configuration is not in generator mode");
    }
    if config.private_key_pem.is_none() && config.private_key_path.is_none() {
        bail!("No private key given; pass --private-key or set one in --config");
    }

    let manager = Manager::new(config).context("Failed to load signing key")?;

    let mut builder = LicenseBuilder::new()
        .customer(args.customer)
        .app_id(args.app_id)
        .services(args.services);
    for (name, value) in args.limits {
        builder = builder.limit(name, value);
    }
    for (name, enabled) in args.features {
        builder = builder.feature(name, enabled);
    }
    for (key, value) in args.metadata {
        builder = builder.metadata(key, value);
    }
    if let Some(days) = args.expires_in_days {
        if days <= 0 {
            bail!("--expires-in-days must be positive");
        }
        let lifetime = chrono::Duration::try_days(days)
            .with_context(|| format!("--expires-in-days {days} is out of range"))?;
        builder = builder.expires_in(lifetime);
    }
    if let Some(version) = args.version {
        builder = builder.version(version);
    }
    if let Some(environment) = args.environment {
        builder = builder.environment(environment);
    }

    let signed = manager
        .generate(&builder.build())
        .context("Failed to generate license")?;
    manager
        .save_license(&signed, &args.out)
        .context("Failed to write license")?;

    println!("License written to {}", args.out.display());
    println!("  Customer: {}", signed.data.customer);
    println!("  Expires:  {}", format_expiry(signed.data.expires_at));
    Ok(ExitCode::SUCCESS)
}

fn verify(public_key: &Path, license: &Path) -> Result<ExitCode> {
    let manager = validator(public_key)?;
    let (signed, result) = manager
        .load_and_validate(license)
        .context("Failed to read license")?;

    if result.valid {
        println!("License is valid");
        println!("  Customer: {}", signed.data.customer);
        println!("  Expires:  {}", format_expiry(signed.data.expires_at));
        Ok(ExitCode::SUCCESS)
    } else {
        println!("License is INVALID");
        for error in &result.errors {
            println!("  - {error}");
        }
        Ok(ExitCode::FAILURE)
    }
}

fn print_info(public_key: &Path, license: &Path) -> Result<ExitCode> {
    let manager = validator(public_key)?;
    let (signed, result) = manager
        .load_and_validate(license)
        .context("Failed to read license")?;
    if !result.valid {
        warn!("License did not validate: {}", result.errors.join(", "));
    }

    let info = manager.license_info(&signed.data);
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(ExitCode::SUCCESS)
}

fn validator(public_key: &Path) -> Result<Manager> {
    let config = ManagerConfig::validator().with_public_key_path(public_key);
    Manager::new(config).with_context(|| format!("Failed to load {}", public_key.display()))
}

fn parse_service(s: &str) -> Result<Service, String> {
    let (id, name) = match s.split_once(':') {
        Some((id, name)) => (id, name),
        None => (s, s),
    };
    if id.is_empty() || name.is_empty() {
        return Err(format!("expected `id` or `id:name`, got `{s}`"));
    }
    Ok(Service::new(id, name))
}

fn split_pair(s: &str) -> Result<(&str, &str), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!("expected `key=value`, got `{s}`")),
    }
}

fn parse_limit(s: &str) -> Result<(String, i64), String> {
    let (name, value) = split_pair(s)?;
    let value = value
        .parse()
        .map_err(|_| format!("limit `{name}` is not an integer: `{value}`"))?;
    Ok((name.to_string(), value))
}

fn parse_feature(s: &str) -> Result<(String, bool), String> {
    if !s.contains('=') {
        if s.is_empty() {
            return Err("feature name is empty".to_string());
        }
        return Ok((s.to_string(), true));
    }
    let (name, value) = split_pair(s)?;
    let enabled = value
        .parse()
        .map_err(|_| format!("feature `{name}` must be true or false, got `{value}`"))?;
    Ok((name.to_string(), enabled))
}

fn parse_metadata(s: &str) -> Result<(String, String), String> {
    let (key, value) = split_pair(s)?;
    Ok((key.to_string(), value.to_string()))
}
