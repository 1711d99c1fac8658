use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distributions::Alphanumeric;
use tracing::info;
use tracing_subscriber::EnvFilter;

use keyrack::auth::{PasswordHasher, TokenSigner};
use keyrack::config::ServerConfig;
use keyrack::images::ImageStore;
use keyrack::server::{AppState, create_router};
use keyrack::store::{NewUser, SqliteStore, Store};
use keyrack::types::Role;

const SECRET_LEN: usize = 48;

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "keyrack")]
#[command(about = "A catalog server for equipment passwords and reset instructions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(long, short, default_value = "8080")]
        port: u16,

        /// Data directory for database and uploaded images
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Login token lifetime in hours
        #[arg(long, default_value = "24")]
        token_ttl_hours: i64,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, signing secret, and admin account)
    Init {
        /// Data directory for database and uploaded images
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Skip interactive prompts and generate the admin password
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: String, non_interactive: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir: data_dir.into(),
        ..ServerConfig::default()
    };
    fs::create_dir_all(&config.data_dir)?;
    fs::create_dir_all(config.data_dir.join("uploads"))?;

    let store = SqliteStore::new(&config.db_path())?;
    store.initialize()?;

    let secret_file = config.secret_path();

    if store.admin_exists()? {
        bail!(
            "Server already initialized. Signing secret exists at: {}",
            secret_file.display()
        );
    }

    fs::write(&secret_file, random_string(SECRET_LEN))?;

    #[cfg(unix)]
    set_restrictive_permissions(&secret_file);

    let (username, password, generated) = if non_interactive {
        ("admin".to_string(), random_string(16), true)
    } else {
        prompt_admin_credentials()?
    };

    let password_hash = PasswordHasher::new().hash(&password)?;
    store.create_user(&NewUser {
        username: username.clone(),
        password_hash,
        role: Role::Admin,
        active: true,
    })?;

    println!();
    println!("========================================");
    println!("Created administrator account '{username}'.");
    if generated {
        println!();
        println!("Generated password (save this, it won't be shown again):");
        println!();
        println!("  {password}");
    }
    println!();
    println!("Signing secret written to: {}", secret_file.display());
    println!("========================================");
    println!();

    Ok(())
}

fn prompt_admin_credentials() -> anyhow::Result<(String, String, bool)> {
    let username = inquire::Text::new("Administrator username:")
        .with_default("admin")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Username cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("Username cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let generate = inquire::Confirm::new("Generate a random password?")
        .with_default(true)
        .prompt()?;

    if generate {
        return Ok((username, random_string(16), true));
    }

    let password = inquire::Password::new("Administrator password:")
        .with_validator(|input: &str| {
            if input.len() < 6 {
                Err("Password must be at least 6 characters".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    Ok((username, password, false))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("keyrack=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            host,
            port,
            data_dir,
            token_ttl_hours,
        } => {
            let config = ServerConfig {
                host,
                port,
                data_dir: data_dir.into(),
                token_ttl_hours,
            };

            let secret_file = config.secret_path();
            if !secret_file.exists() {
                bail!(
                    "Server not initialized. Run 'keyrack admin init' first to create the database and admin account."
                );
            }
            let secret = fs::read_to_string(&secret_file)?;
            let secret = secret.trim();
            if secret.is_empty() {
                bail!("Signing secret at {} is empty", secret_file.display());
            }

            let store = SqliteStore::new(&config.db_path())?;
            store.initialize()?;
            if !store.admin_exists()? {
                bail!(
                    "No administrator account found. Run 'keyrack admin init' first to create one."
                );
            }

            let state = Arc::new(AppState::new(
                Arc::new(store),
                ImageStore::new(&config.data_dir),
                TokenSigner::new(secret, config.token_ttl_hours),
            ));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await?;
        }
    }

    Ok(())
}
