use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Environment;
use crate::handlers::{protected, public};
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file cap
const MULTIPART_HEADROOM: usize = 64 * 1024;

/// Full application router over `state`.
pub fn app(state: AppState) -> Router {
    let mut router = Router::new()
        // Public
        .route("/", get(public::system::root))
        .route("/health", get(public::system::health))
        .merge(public_routes())
        // Protected (AuthUser extractor on every handler)
        .merge(auth_routes())
        .merge(livestock_routes())
        .merge(reminder_routes())
        .merge(note_routes())
        .merge(market_routes())
        .merge(gps_routes())
        .merge(semeia_routes(state.config.api.max_upload_bytes));

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state));
    }
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let security = &state.config.security;
    if state.config.environment == Environment::Development
        || security.cors_origins.iter().any(|o| o == "*")
    {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/weather/:location", get(public::weather::weather_get))
        .route("/api/news", get(public::news::news_list))
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/user", get(protected::auth::user_get))
}

fn livestock_routes() -> Router<AppState> {
    use protected::{animals, vaccinations};

    Router::new()
        .route("/api/animals", get(animals::animals_list).post(animals::animal_create))
        .route(
            "/api/animals/:id",
            get(animals::animal_get)
                .patch(animals::animal_update)
                .delete(animals::animal_delete),
        )
        .route("/api/animals/:id/vaccinations", get(vaccinations::vaccinations_list))
        .route("/api/vaccinations", post(vaccinations::vaccination_create))
        .route(
            "/api/vaccinations/:id",
            axum::routing::delete(vaccinations::vaccination_delete),
        )
}

fn reminder_routes() -> Router<AppState> {
    use protected::reminders;

    Router::new()
        .route("/api/reminders", get(reminders::reminders_list).post(reminders::reminder_create))
        .route("/api/reminders/today", get(reminders::reminders_today))
        .route(
            "/api/reminders/:id",
            get(reminders::reminder_get)
                .patch(reminders::reminder_update)
                .delete(reminders::reminder_delete),
        )
}

fn note_routes() -> Router<AppState> {
    use protected::notes;

    Router::new()
        .route("/api/notes", get(notes::notes_list).post(notes::note_create))
        .route(
            "/api/notes/:id",
            get(notes::note_get).patch(notes::note_update).delete(notes::note_delete),
        )
}

fn market_routes() -> Router<AppState> {
    use protected::market;

    Router::new()
        // Listing the feed is public; creating needs a token
        .route(
            "/api/market/listings",
            get(public::market::listings_public).post(market::listing_create),
        )
        .route("/api/market/listings/mine", get(market::listings_mine))
        .route(
            "/api/market/listings/:id",
            get(market::listing_get)
                .patch(market::listing_update)
                .delete(market::listing_delete),
        )
}

fn gps_routes() -> Router<AppState> {
    use protected::gps;

    Router::new()
        .route("/api/gps/routes", get(gps::routes_list).post(gps::route_create))
        .route("/api/gps/routes/:id", get(gps::route_get).delete(gps::route_delete))
}

fn semeia_routes(max_upload_bytes: usize) -> Router<AppState> {
    use protected::semeia;

    Router::new()
        .route("/api/semeia/chat", post(semeia::chat))
        .route(
            "/api/semeia/analyze-image",
            post(semeia::analyze_image).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_HEADROOM),
            )),
        )
}
