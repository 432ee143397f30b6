//! Load-more list appended under a results or upcoming panel

use leptos::prelude::*;
use shared::{Panel, ResultGame, UpcomingGame};

use crate::api;

/// one rendered fixture, whichever list it came from
#[derive(Debug, Clone, PartialEq)]
pub struct GameRow {
    pub matchup: String,
    pub time: String,
    pub location: String,
    pub score: Option<String>,
}

impl From<ResultGame> for GameRow {
    fn from(game: ResultGame) -> Self {
        GameRow {
            matchup: format!("{} vs {}", game.dcb_team, game.opposition),
            time: game.time,
            location: game.location,
            score: Some(format!("{} - {}", game.dcb_score, game.opp_score)),
        }
    }
}

impl From<UpcomingGame> for GameRow {
    fn from(game: UpcomingGame) -> Self {
        GameRow {
            matchup: format!("{} vs {}", game.dcb_team, game.opposition),
            time: game.time,
            location: game.location,
            score: None,
        }
    }
}

async fn fetch_rows(
    panel: Panel,
    base: &str,
    team: &str,
    amount: usize,
) -> Result<Vec<GameRow>, String> {
    match panel {
        Panel::Results => api::more_results(base, team, amount)
            .await
            .map(|games| games.into_iter().map(GameRow::from).collect()),
        Panel::Upcoming => api::more_upcomings(base, team, amount)
            .await
            .map(|games| games.into_iter().map(GameRow::from).collect()),
    }
}

#[component]
pub fn MoreGames(
    panel: Panel,
    team: String,
    api_base: String,
    /// games already rendered by the page
    #[prop(default = 0)]
    offset: usize,
) -> impl IntoView {
    let team = StoredValue::new(team);
    let api_base = StoredValue::new(api_base);

    let (rows, set_rows) = signal(Vec::<GameRow>::new());
    let (loading, set_loading) = signal(false);
    let (exhausted, set_exhausted) = signal(false);
    let (error, set_error) = signal::<Option<String>>(None);

    let load_more = move |_| {
        set_loading.set(true);

        leptos::task::spawn_local(async move {
            let amount = offset + rows.get_untracked().len();
            let team = team.get_value();

            match fetch_rows(panel, &api_base.get_value(), &team, amount).await {
                Ok(fetched) if fetched.is_empty() => set_exhausted.set(true),
                Ok(fetched) => {
                    set_rows.update(|r| r.extend(fetched));
                    set_error.set(None);
                }
                Err(e) => {
                    log::warn!("loading more {} for {} failed: {}", panel.tag(), team, e);
                    set_error.set(Some(e));
                }
            }

            set_loading.set(false);
        });
    };

    view! {
        <ul class="more-games">
            {move || rows.get().into_iter().map(|row| view! {
                <li class="game">
                    <span class="matchup">{row.matchup}</span>
                    <span class="time">{row.time}</span>
                    <span class="location">{row.location}</span>
                    {row.score.map(|score| view! { <span class="score">{score}</span> })}
                </li>
            }).collect_view()}
        </ul>

        {move || error.get().map(|e| view! {
            <p class="load-error">{format!("Couldn't load more games: {}", e)}</p>
        })}

        <Show when=move || !exhausted.get()>
            <button
                class="load-more"
                on:click=load_more
                disabled=move || loading.get()
            >
                {move || if loading.get() { "Loading..." } else { "Load more" }}
            </button>
        </Show>
    }
}
