//! JSON API over the competition engine. Rankings live in memory.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST (e.g. 127.0.0.1), PORT (e.g. 9000).

use actix_web::{
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use padel_league::logic::{advance_round, generate_bracket, round_state, RoundState};
use padel_league::models::{RankingConfigBuilder, Seeding, StatAdjustment};
use padel_league::{
    build_playoff, close_phase, compute_standings, correct_match_result, preview_phase, record_match_result,
    start_ranking, EngineError, Entrants, MatchId, MovementPlan, Participant, PlayerId, Ranking, RankingId, Score,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Per-ranking entry: ranking data + last activity time (for auto-cleanup).
struct RankingEntry {
    ranking: Ranking,
    last_activity: Instant,
}

/// In-memory state: many rankings by ID. Entries are removed after a day without activity.
type AppState = Data<RwLock<HashMap<RankingId, RankingEntry>>>;

const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(24 * 3600);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateRankingBody {
    name: String,
    config: RankingConfigBuilder,
    /// Player names registered right away.
    #[serde(default)]
    players: Vec<String>,
}

#[derive(Deserialize)]
struct AddPlayerBody {
    name: String,
}

#[derive(Deserialize)]
struct StartBody {
    entrants: Entrants,
    #[serde(default = "default_division_count")]
    division_count: u32,
}

fn default_division_count() -> u32 {
    1
}

#[derive(Deserialize)]
struct ResultBody {
    score: Score,
    /// Replace an existing result instead of recording a new one.
    #[serde(default)]
    correction: bool,
}

#[derive(Deserialize)]
struct ClosePhaseBody {
    /// Plan with manual overrides; a fresh preview is used when absent.
    plan: Option<MovementPlan>,
}

#[derive(Deserialize)]
struct BracketBody {
    entrants: Vec<Participant>,
    #[serde(default)]
    seeding: Seeding,
    #[serde(default)]
    consolation: bool,
}

#[derive(Deserialize)]
struct RankingPath {
    id: RankingId,
}

#[derive(Deserialize)]
struct PlayerPath {
    id: RankingId,
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: RankingId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct DivisionPath {
    id: RankingId,
    number: u32,
}

fn bad_request(e: EngineError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No ranking" }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "padel-league",
    })
}

/// Create a ranking from a (partial) configuration and optional player names.
#[post("/api/rankings")]
async fn api_create_ranking(state: AppState, body: Json<CreateRankingBody>) -> HttpResponse {
    let body = body.into_inner();
    let config = match body.config.build() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    let mut ranking = Ranking::new(body.name.trim(), config);
    for name in &body.players {
        if let Err(e) = ranking.add_player(name) {
            return bad_request(e);
        }
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    log::info!("Created ranking {} ({})", ranking.id, ranking.config.format.kind());
    let response = HttpResponse::Ok().json(&ranking);
    g.insert(
        ranking.id,
        RankingEntry {
            ranking,
            last_activity: Instant::now(),
        },
    );
    response
}

/// Get a ranking by id (404 if not found). Touching it refreshes last_activity.
#[get("/api/rankings/{id}")]
async fn api_get_ranking(state: AppState, path: Path<RankingPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match g.get_mut(&path.id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(&entry.ranking)
        }
        None => not_found(),
    }
}

/// Replace the configuration. Applies to later standings and phases only.
#[put("/api/rankings/{id}/config")]
async fn api_update_config(
    state: AppState,
    path: Path<RankingPath>,
    body: Json<RankingConfigBuilder>,
) -> HttpResponse {
    let config = match body.into_inner().build() {
        Ok(c) => c,
        Err(e) => return bad_request(e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    if r.phase > 0 && config.format.kind() != r.config.format.kind() {
        return bad_request(EngineError::FormatMismatch {
            expected: r.config.format.kind(),
            found: config.format.kind(),
        });
    }
    r.update_config(config);
    HttpResponse::Ok().json(r)
}

#[post("/api/rankings/{id}/players")]
async fn api_add_player(state: AppState, path: Path<RankingPath>, body: Json<AddPlayerBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    match r.add_player(body.name.trim()) {
        Ok(_) => HttpResponse::Ok().json(r),
        Err(e) => bad_request(e),
    }
}

/// Set a player's manual statistics adjustment.
#[put("/api/rankings/{id}/players/{player_id}/adjustment")]
async fn api_set_adjustment(
    state: AppState,
    path: Path<PlayerPath>,
    body: Json<StatAdjustment>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    match r.set_adjustment(path.player_id, body.into_inner()) {
        Ok(()) => HttpResponse::Ok().json(r),
        Err(e) => bad_request(e),
    }
}

/// Build the first divisions and their schedules.
#[post("/api/rankings/{id}/start")]
async fn api_start_ranking(state: AppState, path: Path<RankingPath>, body: Json<StartBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    let body = body.into_inner();
    match start_ranking(r, body.entrants, body.division_count, &mut rand::thread_rng()) {
        Ok(()) => HttpResponse::Ok().json(r),
        Err(e) => bad_request(e),
    }
}

/// Record (or, with `correction`, replace) a match result.
#[put("/api/rankings/{id}/matches/{match_id}/result")]
async fn api_set_result(state: AppState, path: Path<MatchPath>, body: Json<ResultBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    let body = body.into_inner();
    let result = if body.correction {
        correct_match_result(r, path.match_id, body.score)
    } else {
        record_match_result(r, path.match_id, body.score)
    };
    match result {
        Ok(_) => HttpResponse::Ok().json(r),
        Err(e) => bad_request(e),
    }
}

/// Next round of a Pozo or Mexicano division.
#[post("/api/rankings/{id}/divisions/{number}/advance")]
async fn api_advance_division(state: AppState, path: Path<DivisionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    let format = r.config.format;
    let result = r
        .division_mut(path.number)
        .and_then(|d| advance_round(d, &format));
    match result {
        Ok(round) => {
            log::debug!("Ranking {} division {} now at round {}", r.id, path.number, round);
            HttpResponse::Ok().json(r)
        }
        Err(e) => bad_request(e),
    }
}

#[get("/api/rankings/{id}/divisions/{number}/standings")]
async fn api_standings(state: AppState, path: Path<DivisionPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &entry.ranking;
    let division = match r.division(path.number) {
        Ok(d) => d,
        Err(e) => return bad_request(e),
    };
    let adjustments = r.adjustments(&division.participants());
    let round = round_state(division);
    match compute_standings(division, &r.config, &adjustments, None) {
        Ok(rows) => HttpResponse::Ok().json(serde_json::json!({
            "division": division.number,
            "round_complete": matches!(round, RoundState::Complete(_)),
            "rows": rows,
        })),
        Err(e) => bad_request(e),
    }
}

/// Movements the current standings would produce; nothing is changed.
#[post("/api/rankings/{id}/phase/preview")]
async fn api_phase_preview(state: AppState, path: Path<RankingPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &entry.ranking;
    match preview_phase(r) {
        Ok(plan) => {
            let warnings = plan.validate(r.config.format.expected_division_size());
            HttpResponse::Ok().json(serde_json::json!({ "plan": plan, "warnings": warnings }))
        }
        Err(e) => bad_request(e),
    }
}

/// Close the phase with the given plan (or the computed one) and start the next.
#[post("/api/rankings/{id}/phase/close")]
async fn api_phase_close(
    state: AppState,
    path: Path<RankingPath>,
    body: Option<Json<ClosePhaseBody>>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    let r = &mut entry.ranking;
    let plan = match body.and_then(|b| b.into_inner().plan) {
        Some(plan) => plan,
        None => match preview_phase(r) {
            Ok(plan) => plan,
            Err(e) => return bad_request(e),
        },
    };
    match close_phase(r, &plan, &mut rand::thread_rng()) {
        Ok(warnings) => HttpResponse::Ok().json(serde_json::json!({ "ranking": r, "warnings": warnings })),
        Err(e) => bad_request(e),
    }
}

/// Playoff draw of a groups + playoff ranking, from the finished group stage.
#[post("/api/rankings/{id}/playoff")]
async fn api_playoff(state: AppState, path: Path<RankingPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    let entry = match g.get_mut(&path.id) {
        Some(e) => e,
        None => return not_found(),
    };
    entry.last_activity = Instant::now();
    match build_playoff(&entry.ranking, &mut rand::thread_rng()) {
        Ok(brackets) => HttpResponse::Ok().json(brackets),
        Err(e) => bad_request(e),
    }
}

/// Stand-alone elimination draw; not stored.
#[post("/api/brackets")]
async fn api_bracket(body: Json<BracketBody>) -> HttpResponse {
    match generate_bracket(&body.entrants, body.seeding, body.consolation, &mut rand::thread_rng()) {
        Ok(brackets) => HttpResponse::Ok().json(brackets),
        Err(e) => bad_request(e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(HashMap::<RankingId, RankingEntry>::new()));

    // Hourly sweep of rankings nobody touched for a day
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive ranking(s)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_ranking)
            .service(api_get_ranking)
            .service(api_update_config)
            .service(api_add_player)
            .service(api_set_adjustment)
            .service(api_start_ranking)
            .service(api_set_result)
            .service(api_advance_division)
            .service(api_standings)
            .service(api_phase_preview)
            .service(api_phase_close)
            .service(api_playoff)
            .service(api_bracket)
    })
    .bind(bind)?
    .run()
    .await
}
