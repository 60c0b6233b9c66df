use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use grocery_orders::handlers::auth::StaticTokenResolver;
use grocery_orders::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .expect("PORT must be a valid number");

    // API_TOKENS holds `token=user_uuid[:manager]` entries, comma separated.
    let resolver = match env::var("API_TOKENS") {
        Ok(spec) => StaticTokenResolver::from_spec(&spec),
        Err(_) => {
            log::warn!("API_TOKENS not set; every request will be rejected with 401");
            StaticTokenResolver::new()
        }
    };

    let pool = create_pool(&database_url);
    run_migrations(&pool);

    log::info!("Starting server at http://{}:{}", host, port);

    build_server(pool, Arc::new(resolver), &host, port)?.await
}
