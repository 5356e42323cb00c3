use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use auth::PasswordHasher;
use clap::Parser;
use clap::Subcommand;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use benchdb_backend::config;
use benchdb_backend::config::AppConfig;
use benchdb_backend::domain::account::models::Account;
use benchdb_backend::domain::account::models::AccountId;
use benchdb_backend::domain::account::models::AccountStatus;
use benchdb_backend::domain::account::models::EmailAddress;
use benchdb_backend::domain::account::models::Role;
use benchdb_backend::domain::account::ports::CredentialStore;
use benchdb_backend::outbound::mailer;
use benchdb_backend::outbound::repositories::PostgresCredentialStore;

/// Provisioning tool for the benchdb backend.
///
/// Runs against the database named in `<app-dir>/config.toml`.
#[derive(Parser)]
#[command(name = "benchdb-admin")]
struct Cli {
    /// Override the application config directory.
    #[arg(long)]
    app_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run migrations and create the first owner account
    InitDb {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
    },
    /// Provision a new account
    CreateAccount {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "user")]
        role: String,
        #[arg(long)]
        password: String,
    },
    /// Store the SMTP settings used for account mail
    SetMail {
        #[arg(long)]
        host: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        from: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "benchdb_backend=info,benchdb_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let app_dir = match cli.app_dir {
        Some(dir) => dir,
        None => config::app_dir()?,
    };
    let app_config = AppConfig::load(&app_dir)?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&app_config.database.connection_string())
        .await
        .context("could not connect to database")?;

    match cli.command {
        Commands::InitDb {
            email,
            name,
            password,
        } => {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("migrations failed")?;
            tracing::info!("migrations applied");

            let id = provision_account(&pool, &email, &name, Role::Owner, &password).await?;
            println!("created owner account {id}");
        }
        Commands::CreateAccount {
            email,
            name,
            role,
            password,
        } => {
            let role: Role = role.parse().map_err(anyhow::Error::msg)?;
            let id = provision_account(&pool, &email, &name, role, &password).await?;
            println!("created account {id}");
        }
        Commands::SetMail {
            host,
            username,
            password,
            from,
        } => {
            set_mail_settings(&pool, &host, &username, &password, &from).await?;
            println!("mail settings stored");
        }
    }

    Ok(())
}

/// Insert an account and its credential directly, bypassing the gated
/// service; provisioning runs before any identity exists to authorize it.
async fn provision_account(
    pool: &PgPool,
    email: &str,
    name: &str,
    role: Role,
    password: &str,
) -> Result<AccountId, anyhow::Error> {
    let account = Account {
        id: AccountId::new(),
        email: EmailAddress::new(email.to_string())?,
        name: name.to_string(),
        role,
        status: AccountStatus::Active,
    };
    let password_hash = PasswordHasher::new()
        .encode(password)
        .context("could not hash password")?;

    let store = PostgresCredentialStore::new(pool.clone());
    store.create_account(&account, &password_hash).await?;

    tracing::info!(account = %account.id, role = %role, "account provisioned");
    Ok(account.id)
}

async fn set_mail_settings(
    pool: &PgPool,
    host: &str,
    username: &str,
    password: &str,
    from: &str,
) -> Result<(), anyhow::Error> {
    // Validate before storing; a bad from address fails every later send.
    EmailAddress::new(from.to_string())?;

    let settings = [
        (mailer::MAIL_HOST_KEY, host),
        (mailer::MAIL_USERNAME_KEY, username),
        (mailer::MAIL_PASSWORD_KEY, password),
        (mailer::MAIL_FROM_KEY, from),
    ];

    for (key, value) in settings {
        sqlx::query(
            "INSERT INTO app_data (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(value)
        .execute(pool)
        .await
        .context("could not store mail setting")?;
    }

    Ok(())
}
