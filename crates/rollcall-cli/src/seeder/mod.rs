//! Fake data for development databases.
//!
//! Seeded classes are named `Seeded ...` and seeded accounts use the
//! `example.com` email domain, so [`clear_all`] removes exactly what
//! [`seed_all`] created and leaves real data alone.

pub mod attendance;
pub mod classes;
pub mod models;
pub mod users;

pub use models::{PeoplePerClass, SeedConfig};

use rollcall_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> Result<(), Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...");
    println!(
        "   {} classes, {} students, ~{} attendance records\n",
        config.num_classes,
        config.total_students(),
        config.total_attendance_records()
    );

    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.error)?;

    let class_ids = classes::seed_classes(db, config.num_classes).await?;
    let seeded_users =
        users::seed_users(db, &class_ids, &config.people_per_class, &password_hash).await?;
    attendance::seed_attendance(db, &seeded_users, config.attendance_days).await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Seeded accounts log in with password: {}", SEED_PASSWORD);
    Ok(())
}

pub async fn clear_all(db: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧹 Clearing seeded data...");

    let users = users::clear_users(db).await?;
    println!("   ✓ Removed {} users", users);

    let classes = classes::clear_classes(db).await?;
    println!("   ✓ Removed {} classes", classes);

    println!("✅ Seeded data cleared");
    Ok(())
}
