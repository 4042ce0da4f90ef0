use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::config::StorageConfig;
use crate::handlers::{admin, auth, bookings, console, guide, public, uploads};
use crate::middleware::auth::{
    auth_middleware, require_admin, require_console_enabled, require_guide, require_visitor,
};
use crate::middleware::rate_limit::create_public_governor;
use crate::middleware::role_rate_limit::{create_role_governor, RateLimitedRole};
use crate::AppState;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let visitor_governor = create_role_governor(RateLimitedRole::Visitor);
    let guide_governor = create_role_governor(RateLimitedRole::Guide);
    let upload_governor = create_role_governor(RateLimitedRole::Uploader);
    let public_governor = create_public_governor();
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes + MULTIPART_OVERHEAD);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(public_governor.clone())
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    // Directory browsing and search (per-IP rate limiting)
    let public_routes = Router::new()
        .route("/health", get(public::health))
        .route("/regions", get(public::list_regions))
        .route("/regions/{slug}", get(public::get_region))
        .route("/cities", get(public::list_cities))
        .route("/cities/{slug}", get(public::city_page))
        .route("/places", get(public::list_places))
        .route("/places/{id}", get(public::get_place))
        .route("/guides", get(public::list_guides))
        .route("/guides/{id}", get(public::get_guide))
        .route("/search", get(public::search))
        .layer(public_governor);

    // Tourist and local routes: 100 requests per minute per user
    let visitor_routes = Router::new()
        .route("/create-booking", post(bookings::create_booking))
        .route(
            "/bookings",
            post(bookings::create_booking).get(bookings::my_bookings),
        )
        .route("/bookings/quote", post(bookings::quote))
        .route("/bookings/{id}", delete(bookings::cancel_booking))
        .layer(visitor_governor)
        .layer(middleware::from_fn(require_visitor))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Guide routes: 500 requests per minute per user
    let guide_routes = Router::new()
        .route("/profile", get(guide::get_profile).put(guide::update_profile))
        .route("/bookings", get(guide::my_bookings))
        .route("/bookings/{id}/status", put(guide::update_booking_status))
        .layer(guide_governor)
        .layer(middleware::from_fn(require_guide))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Any signed-in user may upload images
    let upload_routes = Router::new()
        .route("/upload-blob", post(uploads::upload_blob))
        .layer(upload_limit.clone())
        .layer(upload_governor)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Idempotent seeds, kept at their historical paths
    let seed_routes = Router::new()
        .route("/setup-database", get(admin::setup_database))
        .route("/insert-chebba-data", get(admin::insert_chebba_data))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        // Regions & governorates
        .route("/regions", post(admin::create_region))
        .route(
            "/regions/{id}",
            put(admin::update_region).delete(admin::delete_region),
        )
        .route(
            "/governorates",
            get(admin::list_governorates).post(admin::create_governorate),
        )
        .route(
            "/governorates/{id}",
            put(admin::update_governorate).delete(admin::delete_governorate),
        )
        // Cities
        .route("/cities", post(admin::create_city))
        .route(
            "/cities/{id}",
            get(admin::get_city)
                .put(admin::update_city)
                .delete(admin::delete_city),
        )
        // Places
        .route("/places", post(admin::create_place))
        .route(
            "/places/{id}",
            put(admin::update_place).delete(admin::delete_place),
        )
        .route(
            "/places/{id}/images",
            post(uploads::upload_place_image).layer(upload_limit),
        )
        // Guides
        .route("/guides/{id}", delete(admin::delete_guide))
        // User management
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route("/users/{id}/role", put(admin::update_user_role))
        // Booking management
        .route("/bookings", get(admin::list_bookings))
        .route(
            "/bookings/{id}",
            put(admin::update_booking).delete(admin::delete_booking),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Read-only database console, off unless ENABLE_DATABASE_CONSOLE is set
    let console_routes = Router::new()
        .route("/tables", get(console::tables))
        .route("/schema", get(console::schema))
        .route("/data", get(console::data))
        .route("/query", get(console::query))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_console_enabled,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(visitor_routes)
        .merge(upload_routes)
        .merge(seed_routes);

    let mut router = Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .nest("/api/guide", guide_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/database", console_routes);

    if let StorageConfig::Local {
        base_path,
        public_url,
    } = &state.config.storage
    {
        if public_url.starts_with('/') {
            router = router.nest_service(public_url, ServeDir::new(base_path));
        }
    }

    router.with_state(state)
}
