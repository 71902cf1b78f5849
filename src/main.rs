use axum::{routing::get, routing::patch, routing::post, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use pharmacy_api::database::manager::DatabaseManager;
use pharmacy_api::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and JWT_SECRET
    let _ = dotenvy::dotenv();

    let config = pharmacy_api::config::config();
    tracing_subscriber::fmt::init();
    tracing::info!("Starting Pharmacy API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PHARMACY_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Pharmacy API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API (session token required)
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use pharmacy_api::handlers::public::auth;

    Router::new()
        .route("/auth/login", post(auth::login_post))
        .route("/auth/register", post(auth::register_post))
}

fn api_routes() -> Router {
    use pharmacy_api::handlers::protected::{
        admin, medicines, orders, patients, prescriptions, supplier,
    };

    Router::new()
        .route("/medicines", get(medicines::medicines_get))
        .route(
            "/supplier/medicines",
            get(supplier::supplier_medicines_get).post(supplier::supplier_medicines_post),
        )
        .route(
            "/customer/orders",
            get(orders::customer_orders_get).post(orders::customer_orders_post),
        )
        .route(
            "/doctor/prescriptions",
            get(prescriptions::doctor_prescriptions_get)
                .post(prescriptions::doctor_prescriptions_post),
        )
        .route("/prescriptions/:id", patch(prescriptions::prescription_patch))
        .route(
            "/customer/prescriptions",
            get(prescriptions::patient_prescriptions_get),
        )
        .route("/patients", get(patients::patients_get))
        .route("/admin/stats", get(admin::admin_stats_get))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Pharmacy API",
        "version": version,
        "description": "Role-based pharmacy management API",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/auth/login, /auth/register (public)",
            "medicines": "/medicines (any authenticated)",
            "supplier": "/supplier/medicines (supplier)",
            "customer": "/customer/orders, /customer/prescriptions (customer)",
            "doctor": "/doctor/prescriptions, /prescriptions/:id (doctor)",
            "patients": "/patients (any authenticated)",
            "admin": "/admin/stats (admin)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
