//! ==============================================================================
//! api.rs - client for the games api worker
//! ==============================================================================

use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use shared::{GamesResponse, Panel, ResultGame, UpcomingGame};

/// same origin unless a mount point sets `data-api-base`
pub const DEFAULT_API_BASE: &str = "";

fn route(panel: Panel) -> &'static str {
    match panel {
        Panel::Results => "more-games",
        Panel::Upcoming => "more-upcomings",
    }
}

/// url of the page starting `amount` games in
pub fn page_url(base: &str, panel: Panel, team: &str, amount: usize) -> String {
    format!(
        "{}/api/{}/{}/{}",
        base.trim_end_matches('/'),
        route(panel),
        urlencoding::encode(team),
        amount
    )
}

/// Next page of finished games
pub async fn more_results(base: &str, team: &str, amount: usize) -> Result<Vec<ResultGame>, String> {
    fetch_page(&page_url(base, Panel::Results, team, amount)).await
}

/// Next page of upcoming games
pub async fn more_upcomings(
    base: &str,
    team: &str,
    amount: usize,
) -> Result<Vec<UpcomingGame>, String> {
    fetch_page(&page_url(base, Panel::Upcoming, team, amount)).await
}

async fn fetch_page<T: DeserializeOwned>(url: &str) -> Result<Vec<T>, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status() == 429 {
        return Err("Rate limited (429)".to_string());
    }
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }

    response
        .json::<GamesResponse<T>>()
        .await
        .map(|page| page.games)
        .map_err(|e| e.to_string())
}
