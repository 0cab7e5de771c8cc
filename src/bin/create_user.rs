use std::io::{self, Write};

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use album_server::auth::passwords::PasswordService;

#[derive(Parser, Debug)]
#[command(
    name = "create_user",
    about = "Create an account allowed to create albums and run imports"
)]
struct Args {
    /// Email address for the account (case insensitive).
    #[arg(long)]
    email: String,

    /// Plaintext password to hash and store for this user.
    #[arg(long)]
    password: String,

    /// Optional display name to associate with the account.
    #[arg(long)]
    display_name: Option<String>,

    /// Database to write to; defaults to `DATABASE_URL`.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    let email = args.email.trim().to_lowercase();

    if !email.contains('@') {
        writeln!(io::stderr(), "error: email must contain '@'")?;
        std::process::exit(1);
    }
    if args.password.trim().is_empty() {
        writeln!(io::stderr(), "error: password must not be empty")?;
        std::process::exit(1);
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&args.database_url)
        .await?;

    let existing =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE lower(email) = lower($1)")
            .bind(&email)
            .fetch_one(&pool)
            .await?;

    if existing > 0 {
        writeln!(
            io::stderr(),
            "error: a user with email '{email}' already exists."
        )?;
        std::process::exit(1);
    }

    let password_service = PasswordService::new()
        .map_err(|err| io::Error::other(format!("argon2 init failed: {err}")))?;
    let password_hash = password_service
        .hash_password(args.password.trim())
        .map_err(|err| io::Error::other(format!("password hash failed: {err}")))?;

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (email, display_name, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&email)
    .bind(args.display_name.as_deref())
    .bind(password_hash)
    .fetch_one(&pool)
    .await?;

    log::info!("created user '{}' with id {}", email, user_id);
    println!("Created user '{email}' with id {user_id}");
    Ok(())
}
