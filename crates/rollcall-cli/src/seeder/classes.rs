//! Class seeding.

use rayon::prelude::*;
use rollcall_models::ClassId;
use sqlx::PgPool;
use std::time::Instant;

use super::models::{ClassSeed, SEED_CLASS_PREFIX};

const DEPARTMENTS: [&str; 6] = ["CSE", "ECE", "EEE", "MECH", "CIVIL", "IT"];
const SECTIONS: [&str; 3] = ["A", "B", "C"];

/// Generates distinct `(name, section)` pairs, cycling through sections
/// before moving to the next department and year.
pub fn generate_classes(count: usize) -> Vec<ClassSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let section = SECTIONS[idx % SECTIONS.len()];
            let group = idx / SECTIONS.len();
            let department = DEPARTMENTS[group % DEPARTMENTS.len()];
            let year = group / DEPARTMENTS.len() + 1;

            ClassSeed {
                id: ClassId::new(),
                name: format!("{} {} Year {}", SEED_CLASS_PREFIX, department, year),
                section: section.to_string(),
            }
        })
        .collect()
}

pub async fn seed_classes(
    db: &PgPool,
    count: usize,
) -> Result<Vec<ClassId>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classes...", count);

    let classes = generate_classes(count);
    insert_classes(db, &classes).await?;

    println!(
        "   ✓ Inserted {} classes in {:?}",
        classes.len(),
        start_time.elapsed()
    );

    Ok(classes.into_iter().map(|c| c.id).collect())
}

async fn insert_classes(db: &PgPool, classes: &[ClassSeed]) -> Result<(), sqlx::Error> {
    if classes.is_empty() {
        return Ok(());
    }

    let mut query = String::from("INSERT INTO classes (id, name, section) VALUES ");
    for i in 0..classes.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 3;
        query.push_str(&format!("(${}, ${}, ${})", p + 1, p + 2, p + 3));
    }

    let mut q = sqlx::query(&query);
    for class in classes {
        q = q.bind(class.id).bind(&class.name).bind(&class.section);
    }
    q.execute(db).await?;

    Ok(())
}

pub async fn clear_classes(db: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM classes WHERE name LIKE $1")
        .bind(format!("{} %", SEED_CLASS_PREFIX))
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
