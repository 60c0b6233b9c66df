pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod models;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::order_service::OrderService;
use handlers::auth::ActorResolver;
use infrastructure::order_store::PgOrderStore;
use infrastructure::product_store::PgProductStore;

pub use db::{create_pool, DbPool};

/// The workflow service as wired in production: Diesel-backed stores over a
/// shared connection pool.
pub type AppOrderService = OrderService<PgOrderStore, PgProductStore>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller supplies the bearer-token resolver and is responsible for
/// `.await`-ing (or `tokio::spawn`-ing) the returned server.
pub fn build_server(
    pool: DbPool,
    resolver: Arc<dyn ActorResolver>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(OrderService::new(
        PgOrderStore::new(pool.clone()),
        PgProductStore::new(pool),
    ));
    let resolver = web::Data::from(resolver);

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(resolver.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/api/orders")
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("/stats", web::get().to(handlers::orders::order_stats))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}", web::put().to(handlers::orders::update_order_status)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_tail:.*}")
                    .url("/api-docs/openapi.json", handlers::ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
