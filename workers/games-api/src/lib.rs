//! ==============================================================================
//! lib.rs - games api cloudflare worker
//! ==============================================================================
//!
//! purpose:
//!     serves further pages of a team's results and upcoming fixtures to the
//!     team page's "load more" buttons. schedules live in workers kv, one
//!     entry per team.
//!
//! relationships:
//!     - uses: shared (TeamSchedule, GamesResponse, ResultGame, UpcomingGame)
//!     - uses: workers kv namespace "GAMES" for team schedules
//!     - uses: workers kv namespace "RATES" for request counters
//!     - called by: team-page (MoreGames component)
//!
//! configuration (wrangler.toml vars / secrets):
//!     RATE_LIMIT           requests per window per client (default 100)
//!     RATE_WINDOW_SECONDS  window length (default 60)
//!     PAGE_SIZE            games per page (default 4)
//!     ADMIN_KEY            secret required to upload schedules
//!
//! api:
//!     GET /api/more-games/:team/:amount
//!         response: {"games": [{"dcb_team", "opposition", "time",
//!                               "location", "dcb_score", "opp_score"}]}
//!
//!     GET /api/more-upcomings/:team/:amount
//!         response: {"games": [{"pk", "time", "location", "dcb_team",
//!                               "opposition"}]}
//!
//!     PUT /api/schedule/:team
//!         headers: X-API-Key: <ADMIN_KEY>
//!         body: {"team": {...}, "games": [...]}
//!
//! ==============================================================================

use serde::{Deserialize, Serialize};
use shared::{GamesResponse, Panel, ResultGame, TeamSchedule, UpcomingGame};
use worker::*;

const DEFAULT_RATE_LIMIT: u32 = 100;
const DEFAULT_WINDOW_SECONDS: u64 = 60;
const DEFAULT_PAGE_SIZE: usize = 4;

// ==============================================================================
// types
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RateInfo {
    count: u32,
    window_start: u64,
}

#[derive(Debug, Serialize)]
struct RateLimitedResponse {
    error: String,
    retry_after_seconds: u64,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct StoredResponse {
    team: String,
    games: usize,
}

/// runtime settings read from the worker environment
#[derive(Debug, Clone, Copy)]
struct Config {
    rate_limit: u32,
    window_seconds: u64,
    page_size: usize,
}

impl Config {
    fn from_env(env: &Env) -> Self {
        Config {
            rate_limit: env_or(env, "RATE_LIMIT", DEFAULT_RATE_LIMIT),
            window_seconds: env_or(env, "RATE_WINDOW_SECONDS", DEFAULT_WINDOW_SECONDS),
            page_size: env_or(env, "PAGE_SIZE", DEFAULT_PAGE_SIZE),
        }
    }
}

fn env_or<T: std::str::FromStr>(env: &Env, name: &str, default: T) -> T {
    env.var(name)
        .ok()
        .and_then(|v| v.to_string().parse().ok())
        .unwrap_or(default)
}

// ==============================================================================
// worker entry point
// ==============================================================================

#[event(fetch)]
async fn fetch(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let router = Router::new();

    router
        // paging endpoints (rate limited)
        .get_async("/api/more-games/:team/:amount", |req, ctx| {
            handle_page(req, ctx, Panel::Results)
        })
        .get_async("/api/more-upcomings/:team/:amount", |req, ctx| {
            handle_page(req, ctx, Panel::Upcoming)
        })
        // schedule upload
        .put_async("/api/schedule/:team", handle_put_schedule)
        .get("/health", |_, _| Response::ok("ok"))
        // cors
        .options("/api/more-games/:team/:amount", handle_cors)
        .options("/api/more-upcomings/:team/:amount", handle_cors)
        .options("/api/schedule/:team", handle_cors)
        .run(req, env)
        .await
}

// ==============================================================================
// request handlers
// ==============================================================================

/// one page of results or upcoming games for a team
async fn handle_page(req: Request, ctx: RouteContext<()>, panel: Panel) -> Result<Response> {
    let config = Config::from_env(&ctx.env);
    let client_id = get_client_id(&req);

    let (allowed, rate_info) =
        check_rate_limit(&ctx, &client_id, config.rate_limit, config.window_seconds).await?;
    let now = js_sys::Date::now() as u64 / 1000;
    let reset_after = reset_in(&rate_info, now, config.window_seconds);

    if !allowed {
        console_warn!("rate limited {} on {}", client_id, panel.tag());
        return rate_limited(config.rate_limit, reset_after);
    }

    let team = match ctx.param("team").and_then(|raw| decode_team(raw)) {
        Some(team) => team,
        None => return Response::error("invalid team name", 400),
    };
    let amount = match ctx.param("amount").and_then(|raw| parse_amount(raw)) {
        Some(amount) => amount,
        None => return Response::error("amount must be a non-negative integer", 400),
    };

    let schedule = load_schedule(&ctx, &team).await?;
    if schedule.is_none() {
        console_log!("no schedule stored for {}", team);
    }
    let json = page_json(schedule.as_ref(), panel, amount, config.page_size)?;

    let headers = json_headers()?;
    headers.set("X-RateLimit-Limit", &config.rate_limit.to_string())?;
    headers.set(
        "X-RateLimit-Remaining",
        &remaining(&rate_info, config.rate_limit).to_string(),
    )?;
    headers.set("X-RateLimit-Reset", &reset_after.to_string())?;

    Ok(Response::ok(json)?.with_headers(headers))
}

/// store a team's schedule, replacing what was there
async fn handle_put_schedule(mut req: Request, ctx: RouteContext<()>) -> Result<Response> {
    let admin_key = match ctx.env.secret("ADMIN_KEY") {
        Ok(key) => key.to_string(),
        Err(_) => return Response::error("admin key not configured", 500),
    };
    let provided = req.headers().get("X-API-Key")?;
    if provided.as_deref() != Some(admin_key.as_str()) {
        return Response::error("unauthorized", 401);
    }

    let team = match ctx.param("team").and_then(|raw| decode_team(raw)) {
        Some(team) => team,
        None => return Response::error("invalid team name", 400),
    };

    let schedule: TeamSchedule = match req.json().await {
        Ok(s) => s,
        Err(_) => return Response::error("invalid json body", 400),
    };
    if schedule.team.name != team {
        return Response::error("team name in body does not match path", 400);
    }

    let kv = ctx.env.kv("GAMES")?;
    let json = serde_json::to_string(&schedule)?;
    kv.put(&schedule_key(&team), json)?.execute().await?;
    console_log!("stored {} games for {}", schedule.games.len(), team);

    let response = StoredResponse {
        team,
        games: schedule.games.len(),
    };
    Ok(Response::ok(serde_json::to_string(&response)?)?.with_headers(json_headers()?))
}

fn handle_cors(_req: Request, _ctx: RouteContext<()>) -> Result<Response> {
    let headers = Headers::new();
    headers.set("Access-Control-Allow-Origin", "*")?;
    headers.set("Access-Control-Allow-Methods", "GET, PUT, OPTIONS")?;
    headers.set("Access-Control-Allow-Headers", "Content-Type, X-API-Key")?;
    headers.set(
        "Access-Control-Expose-Headers",
        "X-RateLimit-Limit, X-RateLimit-Remaining, X-RateLimit-Reset",
    )?;

    Ok(Response::empty()?.with_headers(headers))
}

fn rate_limited(limit: u32, reset_in: u64) -> Result<Response> {
    let response = RateLimitedResponse {
        error: "Too Many Requests".to_string(),
        retry_after_seconds: reset_in,
        limit,
    };

    let headers = json_headers()?;
    headers.set("X-RateLimit-Limit", &limit.to_string())?;
    headers.set("X-RateLimit-Remaining", "0")?;
    headers.set("X-RateLimit-Reset", &reset_in.to_string())?;
    headers.set("Retry-After", &reset_in.to_string())?;

    Ok(Response::ok(serde_json::to_string(&response)?)?
        .with_status(429)
        .with_headers(headers))
}

fn json_headers() -> Result<Headers> {
    let headers = Headers::new();
    headers.set("Content-Type", "application/json")?;
    headers.set("Access-Control-Allow-Origin", "*")?;
    Ok(headers)
}

// ==============================================================================
// storage
// ==============================================================================

fn schedule_key(team: &str) -> String {
    format!("team:{}", team)
}

async fn load_schedule(ctx: &RouteContext<()>, team: &str) -> Result<Option<TeamSchedule>> {
    let kv = ctx.env.kv("GAMES")?;

    match kv.get(&schedule_key(team)).text().await? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|_| Error::from("invalid stored schedule")),
        None => Ok(None),
    }
}

/// serialize one page; an unknown team yields an empty list
fn page_json(
    schedule: Option<&TeamSchedule>,
    panel: Panel,
    amount: usize,
    page_size: usize,
) -> serde_json::Result<String> {
    match panel {
        Panel::Results => {
            let games: Vec<ResultGame> = schedule
                .map(|s| s.results_page(amount, page_size))
                .unwrap_or_default();
            serde_json::to_string(&GamesResponse { games })
        }
        Panel::Upcoming => {
            let games: Vec<UpcomingGame> = schedule
                .map(|s| s.upcoming_page(amount, page_size))
                .unwrap_or_default();
            serde_json::to_string(&GamesResponse { games })
        }
    }
}

// ==============================================================================
// rate limiting logic
// ==============================================================================

/// check if request is allowed and update counter
async fn check_rate_limit(
    ctx: &RouteContext<()>,
    client_id: &str,
    limit: u32,
    window_seconds: u64,
) -> Result<(bool, RateInfo)> {
    let kv = ctx.env.kv("RATES")?;
    let now = js_sys::Date::now() as u64 / 1000;

    let stored = match kv.get(client_id).text().await? {
        Some(json) => serde_json::from_str::<RateInfo>(&json).ok(),
        None => None,
    };
    let mut rate_info = current_window(stored, now, window_seconds);

    if rate_info.count >= limit {
        return Ok((false, rate_info));
    }

    rate_info.count += 1;

    let json = serde_json::to_string(&rate_info)?;
    kv.put(client_id, json)?
        .expiration_ttl(window_seconds)
        .execute()
        .await?;

    Ok((true, rate_info))
}

/// the counter for the window containing `now`; expired or missing
/// counters start a fresh window
fn current_window(stored: Option<RateInfo>, now: u64, window_seconds: u64) -> RateInfo {
    match stored {
        Some(info) if now.saturating_sub(info.window_start) < window_seconds => info,
        _ => RateInfo {
            count: 0,
            window_start: now,
        },
    }
}

fn remaining(info: &RateInfo, limit: u32) -> u32 {
    limit.saturating_sub(info.count)
}

fn reset_in(info: &RateInfo, now: u64, window_seconds: u64) -> u64 {
    window_seconds.saturating_sub(now.saturating_sub(info.window_start))
}

// ==============================================================================
// helpers
// ==============================================================================

/// client identifier for rate limiting
fn get_client_id(req: &Request) -> String {
    if let Ok(Some(ip)) = req.headers().get("CF-Connecting-IP") {
        return format!("ip:{}", ip);
    }
    "unknown".to_string()
}

/// percent-decode a team path segment ("Boys%20Volleyball")
fn decode_team(raw: &str) -> Option<String> {
    let team = urlencoding::decode(raw).ok()?.into_owned();
    if team.trim().is_empty() {
        None
    } else {
        Some(team)
    }
}

fn parse_amount(raw: &str) -> Option<usize> {
    raw.parse().ok()
}

// ==============================================================================
// tests
// ==============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{GameRecord, Level, Season, Sport, Team};

    fn schedule() -> TeamSchedule {
        let games = (1..=6)
            .map(|id| GameRecord {
                id,
                opposition: format!("School {}", id),
                our_score: 2,
                opp_score: 1,
                date: format!("2025-02-{:02}", id),
                time: "15:30".to_string(),
                location: "Main Gym".to_string(),
                is_finished: id <= 5,
            })
            .collect();
        TeamSchedule {
            team: Team {
                name: "Girls Basketball".to_string(),
                sport: Sport::Basketball,
                level: Level::GirlsVarsity,
                season: Season::Two,
                year: 2025,
            },
            games,
        }
    }

    #[test]
    fn test_decode_team() {
        assert_eq!(decode_team("Boys%20Volleyball"), Some("Boys Volleyball".to_string()));
        assert_eq!(decode_team("Tennis"), Some("Tennis".to_string()));
        assert_eq!(decode_team("%20"), None);
        assert_eq!(decode_team("%FF"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("0"), Some(0));
        assert_eq!(parse_amount("8"), Some(8));
        assert_eq!(parse_amount("-4"), None);
        assert_eq!(parse_amount("four"), None);
    }

    #[test]
    fn test_schedule_key() {
        assert_eq!(schedule_key("Boys Volleyball"), "team:Boys Volleyball");
    }

    #[test]
    fn test_page_json_results() {
        let json = page_json(Some(&schedule()), Panel::Results, 0, 4).unwrap();
        let parsed: GamesResponse<ResultGame> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.games.len(), 4);
        assert_eq!(parsed.games[0].opposition, "School 5");
        assert_eq!(parsed.games[0].dcb_team, "Girls Varsity Basketball");
        assert_eq!(parsed.games[0].time, "2025-02-05 15:30");
    }

    #[test]
    fn test_page_json_second_page() {
        let json = page_json(Some(&schedule()), Panel::Results, 4, 4).unwrap();
        let parsed: GamesResponse<ResultGame> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.games.len(), 1);
        assert_eq!(parsed.games[0].opposition, "School 1");
    }

    #[test]
    fn test_page_json_upcoming() {
        let json = page_json(Some(&schedule()), Panel::Upcoming, 0, 4).unwrap();
        let parsed: GamesResponse<UpcomingGame> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.games.len(), 1);
        assert_eq!(parsed.games[0].pk, 6);
    }

    #[test]
    fn test_page_json_unknown_team() {
        assert_eq!(page_json(None, Panel::Results, 0, 4).unwrap(), "{\"games\":[]}");
        assert_eq!(page_json(None, Panel::Upcoming, 8, 4).unwrap(), "{\"games\":[]}");
    }

    #[test]
    fn test_current_window_keeps_live_counter() {
        let stored = RateInfo { count: 7, window_start: 1_000 };
        let info = current_window(Some(stored), 1_059, 60);
        assert_eq!(info.count, 7);
        assert_eq!(info.window_start, 1_000);
    }

    #[test]
    fn test_current_window_resets_expired_counter() {
        let stored = RateInfo { count: 100, window_start: 1_000 };
        let info = current_window(Some(stored), 1_060, 60);
        assert_eq!(info.count, 0);
        assert_eq!(info.window_start, 1_060);
        assert_eq!(current_window(None, 5, 60).window_start, 5);
    }

    #[test]
    fn test_remaining_and_reset() {
        let info = RateInfo { count: 40, window_start: 1_000 };
        assert_eq!(remaining(&info, 100), 60);
        assert_eq!(remaining(&info, 10), 0);
        assert_eq!(reset_in(&info, 1_045, 60), 15);
        assert_eq!(reset_in(&info, 2_000, 60), 0);
    }

    #[test]
    fn test_rate_limited_response_serialization() {
        let resp = RateLimitedResponse {
            error: "Too Many Requests".to_string(),
            retry_after_seconds: 45,
            limit: 100,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"retry_after_seconds\":45"));
        assert!(json.contains("\"limit\":100"));
    }
}
