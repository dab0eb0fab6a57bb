use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use rollcall_cli::seeder::{self, PeoplePerClass, SeedConfig};
use rollcall_core::hash_password;
use rollcall_db::{PgPool, PgStore, Store};
use rollcall_models::{NewUser, Role, UniqueId};

#[derive(Parser)]
#[command(name = "rollcall-cli")]
#[command(about = "Rollcall CLI - Administrative tools for Rollcall", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Institutional ID, must start with ADM
        #[arg(short = 'i', long)]
        unique_id: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake classes, faculty, students and attendance
    Seed {
        /// Number of classes to create
        #[arg(short = 'c', long, default_value = "4")]
        classes: usize,

        /// Number of faculty per class
        #[arg(long, default_value = "2")]
        faculty: usize,

        /// Number of students per class
        #[arg(long, default_value = "30")]
        students: usize,

        /// School days of attendance history
        #[arg(long, default_value = "10")]
        days: usize,
    },
    /// Clear all seeded data (keeps real accounts and classes)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("❌ DATABASE_URL must be set");
        std::process::exit(1);
    };

    let store = match PgStore::connect(&database_url).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = store.migrate().await {
        eprintln!("❌ Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            unique_id,
            password,
        } => handle_create_admin(&store, name, email, unique_id, password).await,
        Commands::Seed {
            classes,
            faculty,
            students,
            days,
        } => handle_seed(store.pool(), classes, faculty, students, days).await,
        Commands::ClearSeed => handle_clear_seed(store.pool()).await,
    }
}

fn prompt(value: Option<String>, label: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(value) => Ok(value),
        None => Input::new().with_prompt(label).interact_text(),
    }
}

fn read_admin_input(
    name: Option<String>,
    email: Option<String>,
    unique_id: Option<String>,
    password: Option<String>,
) -> Result<(String, String, String, String), dialoguer::Error> {
    let name = prompt(name, "Full name")?;
    let email = prompt(email, "Email address")?;
    let unique_id = prompt(unique_id, "Admin ID (ADM...)")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };
    Ok((name, email, unique_id, password))
}

async fn handle_create_admin(
    store: &PgStore,
    name: Option<String>,
    email: Option<String>,
    unique_id: Option<String>,
    password: Option<String>,
) {
    let input = read_admin_input(name, email, unique_id, password);

    let (name, email, unique_id, password) = match input {
        Ok(input) => input,
        Err(e) => {
            eprintln!("\n❌ Failed to read input: {}", e);
            std::process::exit(1);
        }
    };

    match create_admin(store, &name, &email, &unique_id, &password).await {
        Ok(()) => {
            println!("\n✅ Administrator created successfully!");
            println!("   ID: {}", unique_id.trim());
            println!("   Email: {}", email.trim().to_lowercase());
            println!("   Name: {}", name.trim());
        }
        Err(e) => {
            eprintln!("\n❌ Error creating administrator: {}", e);
            std::process::exit(1);
        }
    }
}

async fn create_admin(
    store: &PgStore,
    name: &str,
    email: &str,
    unique_id: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let unique_id = UniqueId::new(unique_id)?;
    if !unique_id.matches_role(Role::Admin) {
        return Err(format!("Admin ID must start with {}", Role::Admin.id_prefix()).into());
    }
    if name.trim().is_empty() || !email.contains('@') {
        return Err("A name and a valid email address are required".into());
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".into());
    }

    let password_hash = hash_password(password).map_err(|e| e.error)?;

    store
        .create_user(NewUser {
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            unique_id,
            role: Role::Admin,
            class_id: None,
            password_hash,
        })
        .await?;

    Ok(())
}

async fn handle_seed(pool: &PgPool, classes: usize, faculty: usize, students: usize, days: usize) {
    let config = SeedConfig::new(classes)
        .with_people(PeoplePerClass { faculty, students })
        .with_attendance_days(days);

    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {}", e);
        std::process::exit(1);
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    if let Err(e) = seeder::clear_all(pool).await {
        eprintln!("\n❌ Error clearing seeded data: {}", e);
        std::process::exit(1);
    }
}
