//! Seeds the database with demo users and messages.
//!
//! Intended for local development: creates ten users with bcrypt-hashed
//! passwords (the password is the lowercased first name), a theme with a
//! forum, thirty root messages and twenty follow-ups of which most are
//! replies to an existing message.

use forum_api::auth::hash_password;
use forum_api::config::Config;
use forum_api::database::Database;
use rand::seq::SliceRandom;
use rand::Rng;
use std::process;

const DEMO_USERS: &[(&str, &str)] = &[
    ("Jean", "Dupont"),
    ("Marie", "Durand"),
    ("Pierre", "Martin"),
    ("Sophie", "Bernard"),
    ("Luc", "Petit"),
    ("Claire", "Moreau"),
    ("Antoine", "Laurent"),
    ("Julie", "Simon"),
    ("Nicolas", "Michel"),
    ("Camille", "Leroy"),
];

const DEMO_SUBJECTS: &[&str] = &[
    "Welcome to the forum",
    "Introductions thread",
    "Tips and tricks",
    "What are you reading?",
    "Weekly discussion",
    "Feature wishlist",
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("[seed] Failed to load configuration: {err}");
            process::exit(1);
        }
    };

    println!("[seed] Connecting to database: {}", config.database_url);
    let db = match Database::new_with_migrations(&config.database_url).await {
        Ok(db) => db,
        Err(err) => {
            eprintln!("[seed] Database initialisation failed: {err}");
            process::exit(1);
        }
    };

    if let Err(err) = seed(&db).await {
        eprintln!("[seed] Seeding failed: {err}");
        process::exit(1);
    }

    println!("[seed] Demo data inserted successfully.");
}

async fn seed(db: &Database) -> forum_api::AppResult<()> {
    let mut rng = rand::thread_rng();

    let mut user_ids = Vec::new();
    for (first_name, last_name) in DEMO_USERS {
        let email = format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        );
        let password_hash = hash_password(&first_name.to_lowercase())?;
        let user = db
            .create_user(first_name, last_name, &email, &password_hash)
            .await?;
        user_ids.push(user.id);
    }
    println!("[seed] Created {} users.", user_ids.len());

    let theme = db
        .create_theme(Some("General"), Some("General discussion"))
        .await?;
    let forum = db
        .create_forum("Open floor", Some("Anything goes"), theme.id)
        .await?;
    println!("[seed] Created theme {} and forum {}.", theme.id, forum.id);

    let mut message_ids = Vec::new();
    for i in 0..30 {
        let user_id = *user_ids.choose(&mut rng).unwrap_or(&user_ids[0]);
        let subject = DEMO_SUBJECTS[i % DEMO_SUBJECTS.len()];
        let message = db
            .create_message(
                subject,
                &format!("Root message number {} of the demo data set.", i + 1),
                user_id,
                Some(forum.id),
                None,
            )
            .await?;
        message_ids.push(message.id);
    }

    // Follow-ups: four out of five are replies to an existing message
    for i in 0..20 {
        let user_id = *user_ids.choose(&mut rng).unwrap_or(&user_ids[0]);
        let reply_to = if rng.gen_bool(0.8) {
            message_ids.choose(&mut rng).copied()
        } else {
            None
        };
        let message = db
            .create_message(
                "Re: discussion",
                &format!("Follow-up number {} of the demo data set.", i + 1),
                user_id,
                None,
                reply_to,
            )
            .await?;
        message_ids.push(message.id);
    }
    println!("[seed] Created {} messages.", message_ids.len());

    Ok(())
}
