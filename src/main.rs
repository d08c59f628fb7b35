use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use school_portal::database;
use school_portal::web::middleware::auth as auth_middleware;
use school_portal::web::routes::{activity, cart, registration};

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("cannot connect to database");

    database::apply_schema(&pool)
        .await
        .expect("cannot apply schema");

    // Every enrollment route requires an authenticated caller; role checks
    // happen per operation in the services.
    let protected_routes = Router::new()
        .route("/activities", post(activity::create_activity_handler))
        .route(
            "/activities/:activity_id/summary",
            get(activity::activity_summary_handler),
        )
        .route(
            "/activities/:activity_id/register",
            post(activity::register_handler),
        )
        .route("/activities/:activity_id/like", post(activity::like_handler))
        .route(
            "/activities/:activity_id/comments",
            post(activity::comment_handler),
        )
        .route("/cart", get(cart::cart_index_handler))
        .route("/cart/add", post(cart::add_to_cart_handler))
        .route(
            "/cart/:cart_item_id/remove",
            post(cart::remove_from_cart_handler),
        )
        .route(
            "/cart/:cart_item_id/checkout",
            post(cart::checkout_handler),
        )
        .route("/registrations", get(registration::my_registrations_handler))
        .route(
            "/registrations/:registration_id/cancel",
            post(registration::cancel_handler),
        )
        .route(
            "/registrations/:registration_id/approve",
            post(registration::approve_handler),
        )
        .route(
            "/registrations/:registration_id/decline",
            post(registration::decline_handler),
        )
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth_middleware::require_auth,
        ));

    let app = Router::new()
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(pool);

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("cannot parse host/port");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("cannot bind listener");
    let bound_addr = listener.local_addr().unwrap();
    println!("enrollment portal listening on http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
