//! ==============================================================================
//! lib.rs - shared types for the team page
//! ==============================================================================
//!
//! purpose:
//!     defines the types used by both the browser side (team-page) and the
//!     games api worker. keeping them in one crate means the json the worker
//!     emits is exactly the json the page decodes.
//!
//! relationships:
//!     - used by: team-page (Panel, Visibility, markup, ResultGame, UpcomingGame)
//!     - used by: workers/games-api (TeamSchedule, GamesResponse, paging)
//!
//! markup contract:
//!     the host page renders the team page. the tab switcher only relies on
//!     the ids, classes and attributes listed in `markup`.
//!
//! ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// markup contract
// ==============================================================================

/// selectors and attributes the host page markup must provide
pub mod markup {
    /// id of the navigation container holding the tabs
    pub const NAV_ID: &str = "team-nav";
    /// marker class carried by every tab
    pub const TAB_CLASS: &str = "tabs";
    /// selector form of `TAB_CLASS`
    pub const TAB_SELECTOR: &str = ".tabs";
    /// class marking the active tab
    pub const ACTIVE_CLASS: &str = "underline";
    /// optional explicit discriminator on a tab ("results" | "upcoming")
    pub const TAB_ATTR: &str = "data-tab";
    /// legacy discriminator: exact visible text of the results tab
    pub const RESULTS_LABEL: &str = "Results";
    pub const RESULTS_SELECTOR: &str = ".games";
    pub const UPCOMING_SELECTOR: &str = ".upcoming";

    /// mount point for the load-more component ("results" | "upcoming")
    pub const MORE_GAMES_ATTR: &str = "data-more-games";
    pub const MORE_GAMES_SELECTOR: &str = "[data-more-games]";
    pub const TEAM_ATTR: &str = "data-team";
    pub const OFFSET_ATTR: &str = "data-offset";
    pub const API_BASE_ATTR: &str = "data-api-base";
}

// ==============================================================================
// panels
// ==============================================================================

/// which of the two game lists a tab selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    /// finished games (`.games`)
    Results,
    /// games still to be played (`.upcoming`)
    Upcoming,
}

impl Panel {
    /// parse the explicit `data-tab` tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "results" => Some(Panel::Results),
            "upcoming" => Some(Panel::Upcoming),
            _ => None,
        }
    }

    /// legacy dispatch on the tab's visible text.
    /// exact, case and whitespace sensitive match against "Results";
    /// anything else selects the upcoming panel.
    pub fn from_label(label: &str) -> Self {
        if label == markup::RESULTS_LABEL {
            Panel::Results
        } else {
            Panel::Upcoming
        }
    }

    /// resolve the panel for a clicked tab: a valid tag wins, otherwise
    /// fall back to the label comparison
    pub fn for_tab(tag: Option<&str>, label: &str) -> Self {
        tag.and_then(Self::from_tag)
            .unwrap_or_else(|| Self::from_label(label))
    }

    pub fn tag(self) -> &'static str {
        match self {
            Panel::Results => "results",
            Panel::Upcoming => "upcoming",
        }
    }

    /// css selector of the panel container
    pub fn selector(self) -> &'static str {
        match self {
            Panel::Results => markup::RESULTS_SELECTOR,
            Panel::Upcoming => markup::UPCOMING_SELECTOR,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Panel::Results => Panel::Upcoming,
            Panel::Upcoming => Panel::Results,
        }
    }

    /// visibility of `panel` while `self` is the selected one
    pub fn visibility_of(self, panel: Panel) -> Visibility {
        if self == panel {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }

    pub fn all() -> [Panel; 2] {
        [Panel::Results, Panel::Upcoming]
    }
}

/// panel visibility, applied through `style.display`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn css_display(self) -> &'static str {
        match self {
            Visibility::Shown => "block",
            Visibility::Hidden => "none",
        }
    }
}

// ==============================================================================
// teams
// ==============================================================================

/// sports offered, serialized by their short code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sport {
    #[serde(rename = "VB")]
    Volleyball,
    #[serde(rename = "FB")]
    Football,
    #[serde(rename = "BB")]
    Basketball,
    #[serde(rename = "TE")]
    Tennis,
    #[serde(rename = "BD")]
    Badminton,
    #[serde(rename = "TR")]
    TrackAndField,
    #[serde(rename = "SW")]
    Swimming,
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sport::Volleyball => "Volleyball",
            Sport::Football => "Football",
            Sport::Basketball => "Basketball",
            Sport::Tennis => "Tennis",
            Sport::Badminton => "Badminton",
            Sport::TrackAndField => "Track & Field",
            Sport::Swimming => "Swimming",
        })
    }
}

/// team level / age group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "BV")]
    BoysVarsity,
    #[serde(rename = "GV")]
    GirlsVarsity,
    #[serde(rename = "JV")]
    JuniorVarsity,
    #[serde(rename = "U14B")]
    BoysU14A,
    #[serde(rename = "U14G")]
    GirlsU14,
    #[serde(rename = "14B")]
    U14A,
    #[serde(rename = "y7")]
    Year7,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::BoysVarsity => "Boys Varsity",
            Level::GirlsVarsity => "Girls Varsity",
            Level::JuniorVarsity => "Junior Varsity",
            Level::BoysU14A => "Boys U14s A",
            Level::GirlsU14 => "Girls U14s",
            Level::U14A => "U14s A",
            Level::Year7 => "Year 7",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Season::One => 1,
            Season::Two => 2,
            Season::Three => 3,
            Season::Four => 4,
        };
        write!(f, "Season {}", n)
    }
}

fn default_year() -> u16 {
    2025
}

/// a school team; `name` is the key used in page urls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub sport: Sport,
    pub level: Level,
    pub season: Season,
    #[serde(default = "default_year")]
    pub year: u16,
}

/// displays as "<level> <sport>", e.g. "Boys Varsity Volleyball"
impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level, self.sport)
    }
}

// ==============================================================================
// games
// ==============================================================================

/// a stored fixture for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: u32,
    pub opposition: String,
    #[serde(default)]
    pub our_score: u32,
    #[serde(default)]
    pub opp_score: u32,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub is_finished: bool,
}

impl GameRecord {
    /// "YYYY-MM-DD HH:MM"
    pub fn kickoff(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// a finished game as returned by `/api/more-games`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGame {
    pub dcb_team: String,
    pub opposition: String,
    pub time: String,
    pub location: String,
    pub dcb_score: u32,
    pub opp_score: u32,
}

/// an unplayed game as returned by `/api/more-upcomings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingGame {
    pub pk: u32,
    pub time: String,
    pub location: String,
    pub dcb_team: String,
    pub opposition: String,
}

/// envelope of both paging endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamesResponse<T> {
    pub games: Vec<T>,
}

/// everything stored for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSchedule {
    pub team: Team,
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

impl TeamSchedule {
    /// finished games, newest first, skipping `amount`
    pub fn results_page(&self, amount: usize, page_size: usize) -> Vec<ResultGame> {
        let dcb_team = self.team.to_string();
        self.newest_first(true)
            .into_iter()
            .skip(amount)
            .take(page_size)
            .map(|game| ResultGame {
                dcb_team: dcb_team.clone(),
                opposition: game.opposition.clone(),
                time: game.kickoff(),
                location: game.location.clone(),
                dcb_score: game.our_score,
                opp_score: game.opp_score,
            })
            .collect()
    }

    /// unfinished games, newest first, skipping `amount`
    pub fn upcoming_page(&self, amount: usize, page_size: usize) -> Vec<UpcomingGame> {
        let dcb_team = self.team.to_string();
        self.newest_first(false)
            .into_iter()
            .skip(amount)
            .take(page_size)
            .map(|game| UpcomingGame {
                pk: game.id,
                time: game.kickoff(),
                location: game.location.clone(),
                dcb_team: dcb_team.clone(),
                opposition: game.opposition.clone(),
            })
            .collect()
    }

    // ISO dates and zero-padded times sort correctly as strings
    fn newest_first(&self, finished: bool) -> Vec<&GameRecord> {
        let mut games: Vec<&GameRecord> = self
            .games
            .iter()
            .filter(|g| g.is_finished == finished)
            .collect();
        games.sort_by(|a, b| (&b.date, &b.time).cmp(&(&a.date, &a.time)));
        games
    }
}

// ==============================================================================
// tests
// ==============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: u32, date: &str, time: &str, finished: bool) -> GameRecord {
        GameRecord {
            id,
            opposition: format!("Opp {}", id),
            our_score: id,
            opp_score: 1,
            date: date.to_string(),
            time: time.to_string(),
            location: "Home".to_string(),
            is_finished: finished,
        }
    }

    fn schedule() -> TeamSchedule {
        TeamSchedule {
            team: Team {
                name: "Boys Volleyball".to_string(),
                sport: Sport::Volleyball,
                level: Level::BoysVarsity,
                season: Season::One,
                year: 2025,
            },
            games: vec![
                game(1, "2025-01-10", "15:00", true),
                game(2, "2025-03-02", "09:30", true),
                game(3, "2025-03-02", "16:00", true),
                game(4, "2025-02-20", "12:00", true),
                game(5, "2025-04-01", "10:00", false),
                game(6, "2025-05-01", "10:00", false),
                game(7, "2024-12-01", "08:00", true),
            ],
        }
    }

    #[test]
    fn test_results_tab_label_is_exact() {
        assert_eq!(Panel::from_label("Results"), Panel::Results);
        assert_eq!(Panel::from_label("results"), Panel::Upcoming);
        assert_eq!(Panel::from_label(" Results"), Panel::Upcoming);
        assert_eq!(Panel::from_label("Upcoming"), Panel::Upcoming);
        assert_eq!(Panel::from_label(""), Panel::Upcoming);
    }

    #[test]
    fn test_tag_wins_over_label() {
        assert_eq!(Panel::for_tab(Some("upcoming"), "Results"), Panel::Upcoming);
        assert_eq!(Panel::for_tab(Some("results"), "Résultats"), Panel::Results);
        // unknown tag falls back to the label
        assert_eq!(Panel::for_tab(Some("standings"), "Results"), Panel::Results);
        assert_eq!(Panel::for_tab(None, "Upcoming"), Panel::Upcoming);
    }

    #[test]
    fn test_exactly_one_panel_shown() {
        for selected in Panel::all() {
            let shown = Panel::all()
                .iter()
                .filter(|p| selected.visibility_of(**p) == Visibility::Shown)
                .count();
            assert_eq!(shown, 1);
            assert_eq!(selected.visibility_of(selected.other()), Visibility::Hidden);
        }
        assert_eq!(Visibility::Shown.css_display(), "block");
        assert_eq!(Visibility::Hidden.css_display(), "none");
    }

    #[test]
    fn test_panel_selectors() {
        assert_eq!(Panel::Results.selector(), ".games");
        assert_eq!(Panel::Upcoming.selector(), ".upcoming");
        assert_eq!(Panel::from_tag(Panel::Upcoming.tag()), Some(Panel::Upcoming));
    }

    #[test]
    fn test_team_display() {
        assert_eq!(schedule().team.to_string(), "Boys Varsity Volleyball");
        assert_eq!(Sport::TrackAndField.to_string(), "Track & Field");
        assert_eq!(Season::Three.to_string(), "Season 3");
    }

    #[test]
    fn test_team_codes_deserialize() {
        let team: Team = serde_json::from_str(
            r#"{"name":"U14 Girls","sport":"BB","level":"U14G","season":"2"}"#,
        )
        .unwrap();
        assert_eq!(team.level, Level::GirlsU14);
        assert_eq!(team.season, Season::Two);
        assert_eq!(team.year, 2025);
        assert_eq!(team.to_string(), "Girls U14s Basketball");
    }

    #[test]
    fn test_results_page_newest_first() {
        let page = schedule().results_page(0, 4);
        let opponents: Vec<_> = page.iter().map(|g| g.opposition.as_str()).collect();
        assert_eq!(opponents, vec!["Opp 3", "Opp 2", "Opp 4", "Opp 1"]);
        assert_eq!(page[0].time, "2025-03-02 16:00");
        assert_eq!(page[0].dcb_team, "Boys Varsity Volleyball");
        assert_eq!(page[0].dcb_score, 3);
    }

    #[test]
    fn test_results_page_offset() {
        let page = schedule().results_page(4, 4);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].opposition, "Opp 7");
        assert!(schedule().results_page(10, 4).is_empty());
    }

    #[test]
    fn test_upcoming_page_excludes_finished() {
        let page = schedule().upcoming_page(0, 4);
        let ids: Vec<_> = page.iter().map(|g| g.pk).collect();
        assert_eq!(ids, vec![6, 5]);
    }

    #[test]
    fn test_games_response_shape() {
        let response = GamesResponse {
            games: schedule().upcoming_page(0, 1),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.starts_with("{\"games\":[{\"pk\":6"));
        assert!(json.contains("\"time\":\"2025-05-01 10:00\""));
    }
}
