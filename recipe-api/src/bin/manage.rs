use clap::{Parser, Subcommand};
use color_eyre::Result;
use log::{info, LevelFilter};
use recipe_api::{
    config::AppConfig,
    database::{
        create_superuser,
        postgres::{connect, PgStore},
    },
    migrator::migrate,
    validation::{clean_password, normalize_email, validate_email},
};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Administrative commands for the recipe API database.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// PostgreSQL connection string.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
    /// How often to try reaching the database before giving up.
    #[arg(long, default_value_t = 10)]
    attempts: u32,
    /// Milliseconds to sleep between attempts.
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
    #[arg(long)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Block until the database accepts connections.
    WaitForDb,
    /// Apply pending schema migrations.
    Migrate,
    /// Create a staff account with every permission.
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[rocket::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let config = AppConfig {
        database_url: Some(cli.database_url.clone()),
        db_wait_attempts: cli.attempts,
        db_wait_interval_ms: cli.interval_ms,
        ..AppConfig::default()
    };
    let pool = connect(&cli.database_url, &config).await?;

    match cli.command {
        Command::WaitForDb => info!("Database available!"),
        Command::Migrate => {
            let applied = migrate(&pool).await?;
            info!("Applied {applied} migration(s).");
        }
        Command::CreateSuperuser {
            email,
            password,
            name,
        } => {
            let email = normalize_email(&email);
            validate_email(&email)?;
            let password = clean_password(&password)?;

            migrate(&pool).await?;
            let store = PgStore::new(pool);
            let user = create_superuser(&store, Some(email.as_str()), &password, &name).await?;
            info!("Superuser {} created.", user.email);
        }
    }

    Ok(())
}
