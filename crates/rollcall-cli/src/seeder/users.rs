//! User seeding: faculty and students for each seeded class.

use fake::Fake;
use fake::faker::name::en::*;
use rayon::prelude::*;
use rollcall_models::{ClassId, Role, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{PeoplePerClass, SEED_EMAIL_DOMAIN, UserSeed};

/// Generates the faculty and students of every class.
///
/// Unique IDs encode the class and position (`FAC-S0301`, `STU-S03012`), so
/// they never collide within one seeding run.
pub fn generate_class_users(
    class_ids: &[ClassId],
    people: &PeoplePerClass,
    password_hash: &str,
) -> Vec<UserSeed> {
    class_ids
        .par_iter()
        .enumerate()
        .flat_map(|(class_idx, &class_id)| {
            let faculty = (0..people.faculty).map(move |idx| {
                generate_user(Role::Faculty, class_id, class_idx, idx, password_hash)
            });
            let students = (0..people.students).map(move |idx| {
                generate_user(Role::Student, class_id, class_idx, idx, password_hash)
            });
            faculty.chain(students).collect::<Vec<_>>()
        })
        .collect()
}

fn generate_user(
    role: Role,
    class_id: ClassId,
    class_idx: usize,
    user_idx: usize,
    password_hash: &str,
) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let unique_id = match role {
        Role::Student => format!("{}-S{:02}{:03}", role.id_prefix(), class_idx, user_idx),
        _ => format!("{}-S{:02}{:02}", role.id_prefix(), class_idx, user_idx),
    };

    let email = format!(
        "{}.{}+{}@{}",
        first_name.to_lowercase(),
        last_name.to_lowercase(),
        unique_id.to_lowercase(),
        SEED_EMAIL_DOMAIN
    );

    UserSeed {
        id: UserId::new(),
        name: format!("{} {}", first_name, last_name),
        email,
        unique_id,
        role,
        class_id: Some(class_id),
        password_hash: password_hash.to_string(),
    }
}

pub async fn seed_users(
    db: &PgPool,
    class_ids: &[ClassId],
    people: &PeoplePerClass,
    password_hash: &str,
) -> Result<Vec<UserSeed>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!(
        "👥 Seeding {} users ({} faculty, {} students per class)...",
        class_ids.len() * (people.faculty + people.students),
        people.faculty,
        people.students
    );

    let users = generate_class_users(class_ids, people, password_hash);
    insert_users_batch(db, &users).await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        users.len(),
        start_time.elapsed()
    );

    Ok(users)
}

pub async fn insert_users_batch(db: &PgPool, users: &[UserSeed]) -> Result<(), sqlx::Error> {
    let mut tx = db.begin().await?;

    // 7 params per user
    const BATCH_SIZE: usize = 800;

    for chunk in users.chunks(BATCH_SIZE) {
        insert_users_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<(), sqlx::Error> {
    if users.is_empty() {
        return Ok(());
    }

    let mut query = String::from(
        "INSERT INTO users (id, name, email, unique_id, role, class_id, password_hash) VALUES ",
    );

    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 7;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6,
            p + 7
        ));
    }

    let mut q = sqlx::query(&query);
    for user in users {
        q = q
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.unique_id)
            .bind(user.role)
            .bind(user.class_id)
            .bind(&user.password_hash);
    }

    q.execute(&mut **tx).await?;
    Ok(())
}

/// Removes every seeded account along with its attendance and leaves.
pub async fn clear_users(db: &PgPool) -> Result<u64, sqlx::Error> {
    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let mut tx = db.begin().await?;

    sqlx::query(
        "DELETE FROM attendance WHERE student_id IN (SELECT id FROM users WHERE email LIKE $1)",
    )
    .bind(&pattern)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "DELETE FROM leave_applications WHERE student_id IN (SELECT id FROM users WHERE email LIKE $1)",
    )
    .bind(&pattern)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(result.rows_affected())
}
