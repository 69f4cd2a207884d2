//! Mint a session token for local testing against the API.

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::env;

use portfolio_api::routes::auth::{Claims, SESSION_SECRET};

fn main() {
    dotenvy::dotenv().ok();

    let email = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin mint-session <EMAIL> [NAME]");
        std::process::exit(1);
    });
    let name = env::args().nth(2);

    let now = Utc::now();
    let claims = Claims {
        sub: email.clone(),
        email: email.clone(),
        name,
        picture: None,
        exp: (now + Duration::hours(24)).timestamp(),
        iat: now.timestamp(),
    };

    match encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SESSION_SECRET.as_bytes()),
    ) {
        Ok(token) => {
            println!("\nEmail  : {}", email);
            println!("Expires: {}\n", now + Duration::hours(24));
            println!("Authorization: Bearer {}", token);
        }
        Err(e) => {
            eprintln!("Error minting session token: {}", e);
            std::process::exit(1);
        }
    }
}
