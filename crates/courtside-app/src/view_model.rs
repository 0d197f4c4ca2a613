// Results view model.
//
// Owns the held season's games, the outcome filter, the favorites ledger and
// the team header, and publishes a render-ready `ResultsSnapshot` after every
// change. Collaborators (data source, persistent store) are injected.
//
// All state sits behind one mutex that is only ever held between suspension
// points, never across an `.await`. Season loads are tagged with a
// generation number when issued; a response whose generation is no longer
// current is dropped, so the most recently requested season always wins no
// matter what order responses arrive in.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use courtside_core::config::{Config, SEASON_RANGE};
use courtside_core::favorites::FavoritesLedger;
use courtside_core::model::{season_label, Filter, Game};
use courtside_core::normalize::normalize_season;
use courtside_core::source::GameSource;
use courtside_core::store::PersistentStore;

use crate::protocol::{
    season_options, FavoritesView, GameRow, LoadOutcome, LoadState, ResultsSnapshot, TeamState,
    FILTER_EMPTY_NOTICE, LOADING_NOTICE, NO_GAMES_NOTICE, TEAM_ERROR_NOTICE,
};

// ---------------------------------------------------------------------------
// Inner state
// ---------------------------------------------------------------------------

struct Inner<P> {
    tracked_team_id: u64,
    default_season: i32,
    seasons_back: u32,
    /// Most recently requested season.
    season: i32,
    /// Incremented by every `load_season`; responses carrying an older value
    /// are stale.
    generation: u64,
    load_state: LoadState,
    /// The held list: newest first, at most ten games, all from `held_season`.
    games: Vec<Game>,
    held_season: Option<i32>,
    filter: Filter,
    team: TeamState,
    favorites: FavoritesLedger<P>,
}

impl<P: PersistentStore> Inner<P> {
    fn visible_games(&self) -> Vec<Game> {
        self.games
            .iter()
            .filter(|game| self.filter.admits(game))
            .cloned()
            .collect()
    }

    fn favorites_view(&self) -> FavoritesView {
        if self.favorites.list().is_empty() {
            return FavoritesView::Empty;
        }
        if self.games.is_empty() {
            return FavoritesView::AwaitingGames;
        }
        let games: Vec<Game> = self
            .games
            .iter()
            .filter(|game| self.favorites.is_favorite(game.id))
            .cloned()
            .collect();
        if games.is_empty() {
            FavoritesView::OtherSeason
        } else {
            FavoritesView::Games(games)
        }
    }

    fn notice(&self, visible: &[Game]) -> Option<String> {
        match &self.load_state {
            LoadState::Loading { .. } => Some(LOADING_NOTICE.to_string()),
            LoadState::Error { message, .. } => Some(message.clone()),
            _ if self.games.is_empty() => Some(NO_GAMES_NOTICE.to_string()),
            _ if visible.is_empty() => Some(FILTER_EMPTY_NOTICE.to_string()),
            _ => None,
        }
    }

    fn snapshot(&self) -> ResultsSnapshot {
        let visible = self.visible_games();
        let notice = self.notice(&visible);
        let rows = visible
            .into_iter()
            .map(|game| {
                let favorited = self.favorites.is_favorite(game.id);
                GameRow::new(game, favorited)
            })
            .collect();
        let favorites_view = self.favorites_view();

        ResultsSnapshot {
            season: self.season,
            season_label: season_label(self.season),
            held_season: self.held_season,
            load_state: self.load_state.clone(),
            filter: self.filter,
            team: self.team.clone(),
            rows,
            favorites: self.favorites.list().iter().copied().collect(),
            favorites_hint: favorites_view.hint(),
            favorites_view,
            notice,
            season_options: season_options(self.default_season, self.seasons_back, self.season),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultsViewModel
// ---------------------------------------------------------------------------

pub struct ResultsViewModel<S, P> {
    source: S,
    inner: Mutex<Inner<P>>,
    updates: watch::Sender<ResultsSnapshot>,
}

impl<S: GameSource, P: PersistentStore> ResultsViewModel<S, P> {
    /// Build a view model for the tracked team in `config`. Reads persisted
    /// favorites from `store` immediately; no network request is made until
    /// `load_season` or `load_team` is called.
    pub fn new(config: &Config, source: S, store: P) -> Self {
        let inner = Inner {
            tracked_team_id: config.tracked_team_id,
            default_season: config.default_season,
            seasons_back: config.seasons_back,
            season: config.default_season,
            generation: 0,
            load_state: LoadState::Idle,
            games: Vec::new(),
            held_season: None,
            filter: Filter::All,
            team: TeamState::Idle,
            favorites: FavoritesLedger::load(store),
        };
        let (updates, _rx) = watch::channel(inner.snapshot());
        Self {
            source,
            inner: Mutex::new(inner),
            updates,
        }
    }

    fn state(&self) -> MutexGuard<'_, Inner<P>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Push a fresh snapshot to subscribers. Called with the lock held so
    /// snapshots are published in mutation order.
    fn publish(&self, inner: &Inner<P>) {
        self.updates.send_replace(inner.snapshot());
    }

    /// Receive a new snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ResultsSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> ResultsSnapshot {
        self.state().snapshot()
    }

    // -- season loading ----------------------------------------------------

    /// Fetch, normalize and hold the tracked team's ten most recent games of
    /// `season`.
    ///
    /// Supersedes any load already in flight. On failure the previously held
    /// list (if any) is kept and the load state carries the error; errors are
    /// never returned as `Err`.
    ///
    /// A season outside `SEASON_RANGE` is ignored: no request is made and no
    /// in-flight load is superseded.
    pub async fn load_season(&self, season: i32) -> LoadOutcome {
        if !SEASON_RANGE.contains(&season) {
            warn!(
                "Ignoring season {season}: must be between {} and {}",
                SEASON_RANGE.start(),
                SEASON_RANGE.end()
            );
            return LoadOutcome::Rejected { season };
        }

        let (generation, team_id) = {
            let mut inner = self.state();
            inner.generation += 1;
            inner.season = season;
            inner.load_state = LoadState::Loading { season };
            self.publish(&inner);
            (inner.generation, inner.tracked_team_id)
        };
        info!("Loading season {season} (gen: {generation})");

        let fetched = self.source.fetch_games(team_id, season).await;

        let mut inner = self.state();
        if inner.generation != generation {
            debug!(
                "Discarding stale season {season} response (gen: {}, current gen: {})",
                generation, inner.generation
            );
            return LoadOutcome::Superseded { season };
        }

        let outcome = match fetched.and_then(|raw| normalize_season(&raw, team_id)) {
            Ok(games) => {
                let count = games.len();
                inner.games = games;
                inner.held_season = Some(season);
                inner.load_state = LoadState::Ready { season };
                info!("Season {season} ready with {count} game(s)");
                LoadOutcome::Ready {
                    season,
                    games: count,
                }
            }
            Err(error) => {
                warn!("Season {season} failed to load: {error}");
                inner.load_state = LoadState::failed(season, &error);
                LoadOutcome::Failed { season, error }
            }
        };
        self.publish(&inner);
        outcome
    }

    /// Load the configured default season.
    pub async fn load_default_season(&self) -> LoadOutcome {
        let season = self.state().default_season;
        self.load_season(season).await
    }

    /// Most recently accepted season request, loaded or not.
    pub fn current_season(&self) -> i32 {
        self.state().season
    }

    pub fn load_state(&self) -> LoadState {
        self.state().load_state.clone()
    }

    // -- team header -------------------------------------------------------

    /// Fetch the tracked team's metadata for the header.
    pub async fn load_team(&self) -> TeamState {
        let team_id = {
            let mut inner = self.state();
            inner.team = TeamState::Loading;
            self.publish(&inner);
            inner.tracked_team_id
        };

        let team = match self.source.fetch_team(team_id).await {
            Ok(team) => TeamState::ready(team),
            Err(e) => {
                warn!("Team info request failed: {e}");
                TeamState::Error {
                    message: TEAM_ERROR_NOTICE.to_string(),
                }
            }
        };

        let mut inner = self.state();
        inner.team = team.clone();
        self.publish(&inner);
        team
    }

    // -- filter --------------------------------------------------------------

    /// Set the filter from its name. Anything other than `"all"` or `"wins"`
    /// is ignored.
    pub fn set_filter(&self, filter: &str) {
        match filter.parse::<Filter>() {
            Ok(filter) => self.set_filter_value(filter),
            Err(_) => debug!("Ignoring unknown filter `{filter}`"),
        }
    }

    pub fn set_filter_value(&self, filter: Filter) {
        let mut inner = self.state();
        if inner.filter == filter {
            return;
        }
        inner.filter = filter;
        self.publish(&inner);
    }

    pub fn filter(&self) -> Filter {
        self.state().filter
    }

    /// The held list under the current filter, newest first.
    pub fn visible_games(&self) -> Vec<Game> {
        self.state().visible_games()
    }

    // -- favorites -----------------------------------------------------------

    pub fn is_game_favorited(&self, id: u64) -> bool {
        self.state().favorites.is_favorite(id)
    }

    /// Flip `id` in the favorites ledger. Returns whether it is a favorite
    /// afterwards. The held list is not touched.
    pub fn toggle_favorite(&self, id: u64) -> bool {
        let mut inner = self.state();
        let favorited = inner.favorites.toggle(id);
        self.publish(&inner);
        favorited
    }

    /// Every favorited id, ascending, including ids outside the held season.
    pub fn favorites(&self) -> Vec<u64> {
        self.state().favorites.list().iter().copied().collect()
    }

    pub fn favorite_games(&self) -> FavoritesView {
        self.state().favorites_view()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use courtside_core::error::FeedError;
    use courtside_core::favorites::FAVORITES_KEY;
    use courtside_core::model::{RawGame, RawTeamRef, Team};
    use courtside_core::store::MemoryStore;

    use crate::protocol::{LOAD_ERROR_NOTICE, NO_SEASON_GAMES_NOTICE};

    const SPURS: u64 = 27;

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn test_config() -> Config {
        let mut config = Config::new(SPURS, 2022, "http://localhost", "key");
        config.db_path = ":memory:".into();
        config
    }

    fn spurs_team() -> Team {
        Team {
            id: SPURS,
            full_name: "San Antonio Spurs".into(),
            conference: "West".into(),
            division: "Southwest".into(),
            city: "San Antonio".into(),
            name: Some("Spurs".into()),
            abbreviation: Some("SAS".into()),
        }
    }

    /// A game on January `day` of the year after `season` starts.
    fn raw_game(id: u64, season: i32, day: u32, spurs_win: bool) -> RawGame {
        let opponent = RawTeamRef {
            id: 100 + id,
            city: "Opp".into(),
            name: format!("Team{id}"),
        };
        let spurs = RawTeamRef {
            id: SPURS,
            city: "San Antonio".into(),
            name: "Spurs".into(),
        };
        let (spurs_score, opp_score) = if spurs_win { (110, 100) } else { (95, 101) };
        let spurs_home = id % 2 == 0;
        let (home_team, visitor_team, home_team_score, visitor_team_score) = if spurs_home {
            (spurs, opponent, spurs_score, opp_score)
        } else {
            (opponent, spurs, opp_score, spurs_score)
        };
        RawGame {
            id,
            date: format!("{}-01-{day:02}T00:00:00.000Z", season + 1),
            home_team,
            visitor_team,
            home_team_score,
            visitor_team_score,
        }
    }

    /// Ten games on Jan 1..=10 after the season starts, six of them wins.
    fn ten_games_six_wins(season: i32) -> Vec<RawGame> {
        let wins = [1, 2, 4, 5, 7, 9];
        (1..=10u64)
            .map(|id| raw_game(id + season as u64 * 100, season, id as u32, wins.contains(&id)))
            .collect()
    }

    /// Source with fixed, immediately available responses.
    #[derive(Default)]
    struct ScriptedSource {
        team: Option<Team>,
        seasons: HashMap<i32, Result<Vec<RawGame>, FeedError>>,
        game_calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn with_season(mut self, season: i32, games: Result<Vec<RawGame>, FeedError>) -> Self {
            self.seasons.insert(season, games);
            self
        }
    }

    #[async_trait]
    impl GameSource for ScriptedSource {
        async fn fetch_team(&self, _team_id: u64) -> Result<Team, FeedError> {
            self.team.clone().ok_or_else(|| FeedError::status(503))
        }

        async fn fetch_games(&self, _team_id: u64, season: i32) -> Result<Vec<RawGame>, FeedError> {
            self.game_calls.fetch_add(1, Ordering::SeqCst);
            self.seasons
                .get(&season)
                .cloned()
                .unwrap_or_else(|| Err(FeedError::status(404)))
        }
    }

    /// Source whose season responses are released by the test through
    /// oneshot channels, so response order can be controlled.
    struct GatedSource {
        gates: Mutex<HashMap<i32, oneshot::Receiver<Result<Vec<RawGame>, FeedError>>>>,
    }

    impl GatedSource {
        fn new() -> Self {
            Self {
                gates: Mutex::new(HashMap::new()),
            }
        }

        fn gate(&self, season: i32) -> oneshot::Sender<Result<Vec<RawGame>, FeedError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(season, rx);
            tx
        }
    }

    #[async_trait]
    impl GameSource for GatedSource {
        async fn fetch_team(&self, _team_id: u64) -> Result<Team, FeedError> {
            Ok(spurs_team())
        }

        async fn fetch_games(&self, _team_id: u64, season: i32) -> Result<Vec<RawGame>, FeedError> {
            let rx = self
                .gates
                .lock()
                .unwrap()
                .remove(&season)
                .expect("no gate registered for season");
            rx.await.expect("gate sender dropped")
        }
    }

    fn scripted_vm(source: ScriptedSource) -> ResultsViewModel<ScriptedSource, MemoryStore> {
        ResultsViewModel::new(&test_config(), source, MemoryStore::new())
    }

    /// View model whose 2022 season is `ten_games_six_wins(2022)`.
    fn six_wins_vm() -> ResultsViewModel<ScriptedSource, MemoryStore> {
        scripted_vm(ScriptedSource::default().with_season(2022, Ok(ten_games_six_wins(2022))))
    }

    // -----------------------------------------------------------------------
    // Tests: initial state
    // -----------------------------------------------------------------------

    #[test]
    fn starts_idle_with_no_data() {
        let vm = scripted_vm(ScriptedSource::default());
        let snap = vm.snapshot();
        assert_eq!(snap.load_state, LoadState::Idle);
        assert_eq!(snap.season, 2022);
        assert_eq!(snap.season_label, "2022–2023");
        assert!(snap.rows.is_empty());
        assert_eq!(snap.notice.as_deref(), Some(NO_GAMES_NOTICE));
        assert_eq!(snap.favorites_view, FavoritesView::Empty);
        assert_eq!(snap.season_options.len(), 4);
        assert!(vm.visible_games().is_empty());
    }

    #[test]
    fn corrupt_favorites_start_empty() {
        let store = MemoryStore::with_entry(FAVORITES_KEY, "definitely not json");
        let vm = ResultsViewModel::new(&test_config(), ScriptedSource::default(), store);
        assert!(vm.favorites().is_empty());
    }

    // -----------------------------------------------------------------------
    // Tests: load_season
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn load_season_holds_normalized_games() {
        let vm = six_wins_vm();

        let outcome = vm.load_season(2022).await;
        assert_eq!(
            outcome,
            LoadOutcome::Ready {
                season: 2022,
                games: 10
            }
        );
        assert_eq!(vm.load_state(), LoadState::Ready { season: 2022 });

        let games = vm.visible_games();
        assert_eq!(games.len(), 10);
        assert!(games.windows(2).all(|w| w[0].date >= w[1].date));
        assert!(games.iter().all(|g| g.opponent_name != "San Antonio Spurs"));
        assert_eq!(vm.snapshot().held_season, Some(2022));
        assert_eq!(vm.snapshot().notice, None);
    }

    #[tokio::test]
    async fn load_season_truncates_to_ten_most_recent() {
        let raws: Vec<RawGame> = (1..=15u64)
            .map(|id| raw_game(id, 2022, id as u32, true))
            .collect();
        let vm = scripted_vm(ScriptedSource::default().with_season(2022, Ok(raws)));

        vm.load_season(2022).await;
        let ids: Vec<u64> = vm.visible_games().iter().map(|g| g.id).collect();
        assert_eq!(ids, (6..=15u64).rev().collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn repeated_loads_are_idempotent() {
        let vm = six_wins_vm();

        vm.load_season(2022).await;
        let first = vm.visible_games();
        vm.load_season(2022).await;
        assert_eq!(vm.visible_games(), first);
    }

    #[tokio::test]
    async fn season_change_replaces_list_wholesale() {
        let vm = scripted_vm(
            ScriptedSource::default()
                .with_season(2022, Ok(ten_games_six_wins(2022)))
                .with_season(2021, Ok(vec![raw_game(1, 2021, 3, true)])),
        );

        vm.load_season(2022).await;
        vm.load_season(2021).await;
        let games = vm.visible_games();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].id, 1);
        assert_eq!(vm.snapshot().held_season, Some(2021));
    }

    #[tokio::test]
    async fn failure_keeps_previous_list() {
        let vm = scripted_vm(
            ScriptedSource::default()
                .with_season(2022, Ok(ten_games_six_wins(2022)))
                .with_season(2021, Err(FeedError::network("connection reset"))),
        );

        vm.load_season(2022).await;
        let held = vm.visible_games();

        let outcome = vm.load_season(2021).await;
        assert!(matches!(outcome, LoadOutcome::Failed { season: 2021, .. }));
        assert_eq!(vm.visible_games(), held);

        let snap = vm.snapshot();
        assert_eq!(snap.held_season, Some(2022));
        assert_eq!(snap.notice.as_deref(), Some(LOAD_ERROR_NOTICE));
        match snap.load_state {
            LoadState::Error { season, detail, .. } => {
                assert_eq!(season, 2021);
                assert!(detail.contains("connection reset"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_with_nothing_held_presents_no_data() {
        let vm = scripted_vm(ScriptedSource::default().with_season(2022, Ok(vec![])));

        let outcome = vm.load_season(2022).await;
        match outcome {
            LoadOutcome::Failed { error, .. } => assert!(error.is_empty_payload()),
            other => panic!("expected Failed, got {other:?}"),
        }
        let snap = vm.snapshot();
        assert!(snap.rows.is_empty());
        assert_eq!(snap.held_season, None);
        assert_eq!(snap.notice.as_deref(), Some(NO_SEASON_GAMES_NOTICE));
    }

    #[tokio::test]
    async fn retry_after_failure_requires_new_call() {
        let source = ScriptedSource::default().with_season(2022, Err(FeedError::status(500)));
        let vm = scripted_vm(source);

        vm.load_season(2022).await;
        assert_eq!(vm.source.game_calls.load(Ordering::SeqCst), 1);
        assert!(matches!(vm.load_state(), LoadState::Error { .. }));

        vm.load_season(2022).await;
        assert_eq!(vm.source.game_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn out_of_range_season_is_ignored() {
        let vm = six_wins_vm();
        vm.load_season(2022).await;
        let before = vm.snapshot();

        for season in [i32::MAX, i32::MIN, 1945, 2101] {
            let outcome = vm.load_season(season).await;
            assert_eq!(outcome, LoadOutcome::Rejected { season });
        }
        assert_eq!(vm.source.game_calls.load(Ordering::SeqCst), 1);
        assert_eq!(vm.snapshot(), before);
        assert_eq!(vm.current_season(), 2022);
    }

    #[tokio::test]
    async fn current_season_tracks_latest_request() {
        let vm = scripted_vm(
            ScriptedSource::default()
                .with_season(2022, Ok(ten_games_six_wins(2022)))
                .with_season(2021, Err(FeedError::status(500))),
        );
        assert_eq!(vm.current_season(), 2022);

        vm.load_season(2021).await;
        assert_eq!(vm.current_season(), 2021);
        assert_eq!(vm.snapshot().held_season, None);
    }

    // -----------------------------------------------------------------------
    // Tests: stale response discard
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn stale_response_arriving_late_is_discarded() {
        let source = GatedSource::new();
        let gate_2021 = source.gate(2021);
        let gate_2022 = source.gate(2022);
        let vm = ResultsViewModel::new(&test_config(), source, MemoryStore::new());

        let release = async {
            gate_2022.send(Ok(ten_games_six_wins(2022))).unwrap();
            tokio::task::yield_now().await;
            gate_2021.send(Ok(vec![raw_game(7, 2021, 1, true)])).unwrap();
        };

        let (outcome_2021, outcome_2022, ()) =
            tokio::join!(vm.load_season(2021), vm.load_season(2022), release);

        assert_eq!(outcome_2021, LoadOutcome::Superseded { season: 2021 });
        assert!(matches!(outcome_2022, LoadOutcome::Ready { season: 2022, .. }));
        assert_eq!(vm.load_state(), LoadState::Ready { season: 2022 });
        assert_eq!(vm.snapshot().held_season, Some(2022));
        assert_eq!(vm.visible_games().len(), 10);
        assert!(vm.visible_games().iter().all(|g| g.date.to_string().starts_with("2023-")));
    }

    #[tokio::test]
    async fn stale_response_arriving_early_is_discarded() {
        let source = GatedSource::new();
        let gate_2021 = source.gate(2021);
        let gate_2022 = source.gate(2022);
        let vm = ResultsViewModel::new(&test_config(), source, MemoryStore::new());

        let release = async {
            gate_2021.send(Ok(vec![raw_game(7, 2021, 1, true)])).unwrap();
            tokio::task::yield_now().await;
            // 2022 is still in flight after the stale response lands.
            assert!(vm.load_state().is_loading());
            assert_eq!(vm.snapshot().held_season, None);
            gate_2022.send(Ok(ten_games_six_wins(2022))).unwrap();
        };

        let (outcome_2021, outcome_2022, ()) =
            tokio::join!(vm.load_season(2021), vm.load_season(2022), release);

        assert_eq!(outcome_2021, LoadOutcome::Superseded { season: 2021 });
        assert!(matches!(outcome_2022, LoadOutcome::Ready { season: 2022, .. }));
        assert_eq!(vm.snapshot().held_season, Some(2022));
    }

    #[tokio::test]
    async fn stale_failure_does_not_clobber_newer_state() {
        let source = GatedSource::new();
        let gate_2021 = source.gate(2021);
        let gate_2022 = source.gate(2022);
        let vm = ResultsViewModel::new(&test_config(), source, MemoryStore::new());

        let release = async {
            gate_2022.send(Ok(ten_games_six_wins(2022))).unwrap();
            tokio::task::yield_now().await;
            gate_2021.send(Err(FeedError::status(500))).unwrap();
        };

        let (outcome_2021, _, ()) =
            tokio::join!(vm.load_season(2021), vm.load_season(2022), release);

        assert_eq!(outcome_2021, LoadOutcome::Superseded { season: 2021 });
        assert_eq!(vm.load_state(), LoadState::Ready { season: 2022 });
    }

    #[tokio::test]
    async fn never_answered_load_stays_loading() {
        let source = GatedSource::new();
        let _gate = source.gate(2022);
        let vm = ResultsViewModel::new(&test_config(), source, MemoryStore::new());

        let pending = vm.load_season(2022);
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), pending).await;
        assert!(timed_out.is_err());
        assert_eq!(vm.load_state(), LoadState::Loading { season: 2022 });
        assert_eq!(vm.snapshot().notice.as_deref(), Some(LOADING_NOTICE));
    }

    // -----------------------------------------------------------------------
    // Tests: filter
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn wins_filter_keeps_only_wins_in_order() {
        let vm = six_wins_vm();
        vm.load_season(2022).await;
        let all = vm.visible_games();

        vm.set_filter("wins");
        assert_eq!(vm.filter(), Filter::Wins);
        let wins = vm.visible_games();
        assert_eq!(wins.len(), 6);
        assert!(wins.iter().all(|g| g.is_win));

        let expected: Vec<u64> = all.iter().filter(|g| g.is_win).map(|g| g.id).collect();
        assert_eq!(wins.iter().map(|g| g.id).collect::<Vec<_>>(), expected);

        vm.set_filter("all");
        assert_eq!(vm.visible_games(), all);
    }

    #[tokio::test]
    async fn unknown_filter_is_ignored() {
        let vm = scripted_vm(ScriptedSource::default());
        vm.set_filter("wins");
        vm.set_filter("losses");
        vm.set_filter("");
        assert_eq!(vm.filter(), Filter::Wins);
    }

    #[tokio::test]
    async fn filter_hiding_everything_sets_notice() {
        let losses = vec![raw_game(1, 2022, 1, false), raw_game(2, 2022, 2, false)];
        let vm = scripted_vm(ScriptedSource::default().with_season(2022, Ok(losses)));
        vm.load_season(2022).await;

        vm.set_filter_value(Filter::Wins);
        let snap = vm.snapshot();
        assert!(snap.rows.is_empty());
        assert_eq!(snap.notice.as_deref(), Some(FILTER_EMPTY_NOTICE));
    }

    // -----------------------------------------------------------------------
    // Tests: favorites
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn toggle_favorite_marks_rows_and_persists() {
        let store = MemoryStore::new();
        let vm = ResultsViewModel::new(
            &test_config(),
            ScriptedSource::default().with_season(2022, Ok(ten_games_six_wins(2022))),
            store.clone(),
        );
        vm.load_season(2022).await;
        let id = vm.visible_games()[3].id;

        assert!(vm.toggle_favorite(id));
        assert!(vm.is_game_favorited(id));
        assert_eq!(store.get(FAVORITES_KEY).unwrap(), Some(format!("[{id}]")));

        let snap = vm.snapshot();
        let row = snap.rows.iter().find(|r| r.game.id == id).unwrap();
        assert!(row.favorited);
        assert_eq!(snap.rows.iter().filter(|r| r.favorited).count(), 1);
        match snap.favorites_view {
            FavoritesView::Games(games) => assert_eq!(games[0].id, id),
            other => panic!("expected Games, got {other:?}"),
        }

        assert!(!vm.toggle_favorite(id));
        assert!(vm.favorites().is_empty());
        assert_eq!(vm.visible_games().len(), 10);
    }

    #[tokio::test]
    async fn favorites_from_other_season_are_kept_but_not_shown() {
        let store = MemoryStore::with_entry(FAVORITES_KEY, "[999999]");
        let vm = ResultsViewModel::new(
            &test_config(),
            ScriptedSource::default().with_season(2022, Ok(ten_games_six_wins(2022))),
            store,
        );
        assert_eq!(vm.favorite_games(), FavoritesView::AwaitingGames);

        vm.load_season(2022).await;
        assert_eq!(vm.favorite_games(), FavoritesView::OtherSeason);
        assert_eq!(vm.favorites(), vec![999999]);
        assert!(vm.snapshot().rows.iter().all(|r| !r.favorited));
    }

    // -----------------------------------------------------------------------
    // Tests: team header and subscription
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn load_team_ready_and_error() {
        let ok = scripted_vm(ScriptedSource {
            team: Some(spurs_team()),
            ..Default::default()
        });
        match ok.load_team().await {
            TeamState::Ready { blurb, .. } => assert!(blurb.starts_with("San Antonio Spurs •")),
            other => panic!("expected Ready, got {other:?}"),
        }

        let failing = scripted_vm(ScriptedSource::default());
        assert_eq!(
            failing.load_team().await,
            TeamState::Error {
                message: TEAM_ERROR_NOTICE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn subscribers_see_each_transition() {
        let vm = six_wins_vm();
        let mut rx = vm.subscribe();
        assert_eq!(rx.borrow_and_update().load_state, LoadState::Idle);

        vm.load_season(2022).await;
        assert!(rx.has_changed().unwrap());
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.load_state, LoadState::Ready { season: 2022 });
        assert_eq!(snap.rows.len(), 10);

        vm.toggle_favorite(snap.rows[0].game.id);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().favorites, vec![snap.rows[0].game.id]);

        // Re-selecting the current filter is not a change.
        vm.set_filter("all");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn snapshot_serializes_for_ui() {
        let vm = six_wins_vm();
        vm.load_season(2022).await;

        let json = serde_json::to_value(vm.snapshot()).unwrap();
        assert_eq!(json["load_state"]["status"], "ready");
        assert_eq!(json["filter"], "all");
        let first = &json["rows"][0];
        assert!(first["date"].as_str().unwrap().len() == 10);
        assert!(first["result"] == "W" || first["result"] == "L");
        assert!(first["location"] == "Home" || first["location"] == "Away");
        assert!(first["opponent_name"].is_string());
    }
}
