//! End-to-end tests of the async driver with paused tokio time

use std::sync::{Arc, Mutex};
use std::time::Duration;

use memory_match::core::{BestScore, GameConfig, MemoryScoreStore, ScoreStore};
use memory_match::engine::{spawn_game, GameHandle, GameObserver, NoopObserver};
use memory_match::types::{Card, CardId, SelectOutcome};
use tokio::time::sleep;
use tokio_test::assert_ok;

/// Store that records every save attempt.
#[derive(Clone, Default)]
struct RecordingStore {
    inner: Arc<Mutex<(MemoryScoreStore, Vec<BestScore>)>>,
}

impl RecordingStore {
    fn attempts(&self) -> Vec<BestScore> {
        self.inner.lock().unwrap().1.clone()
    }
}

impl ScoreStore for RecordingStore {
    fn load(&self) -> Option<BestScore> {
        self.inner.lock().unwrap().0.load()
    }

    fn save(&mut self, candidate: BestScore) -> bool {
        let mut guard = self.inner.lock().unwrap();
        guard.1.push(candidate);
        guard.0.save(candidate)
    }
}

/// Observer that keeps what a view would render.
#[derive(Clone, Default)]
struct ViewLog {
    inner: Arc<Mutex<View>>,
}

#[derive(Default)]
struct View {
    deck: Vec<Card>,
    face_up: Vec<CardId>,
    last_tick: Option<u64>,
    banner: Option<String>,
}

impl ViewLog {
    fn with<R>(&self, f: impl FnOnce(&View) -> R) -> R {
        f(&self.inner.lock().unwrap())
    }
}

impl GameObserver for ViewLog {
    fn on_deck_built(&mut self, cards: &[Card]) {
        let mut view = self.inner.lock().unwrap();
        view.deck = cards.to_vec();
        view.face_up.clear();
        view.last_tick = None;
        view.banner = None;
    }

    fn on_reveal(&mut self, card: &Card) {
        self.inner.lock().unwrap().face_up.push(card.id);
    }

    fn on_unflip(&mut self, card: &Card) {
        self.inner.lock().unwrap().face_up.retain(|id| *id != card.id);
    }

    fn on_tick(&mut self, elapsed_ms: u64) {
        self.inner.lock().unwrap().last_tick = Some(elapsed_ms);
    }

    fn on_win(&mut self, moves: u32, formatted_time: &str) {
        self.inner.lock().unwrap().banner = Some(format!("{moves} moves in {formatted_time}"));
    }
}

fn pairs_of(cards: &[Card]) -> Vec<(CardId, CardId)> {
    let mut out = Vec::new();
    for (i, card) in cards.iter().enumerate() {
        if let Some(twin) = cards[i + 1..].iter().find(|c| c.symbol == card.symbol) {
            out.push((card.id, twin.id));
        }
    }
    out
}

async fn play_all(game: &GameHandle, pairs: &[(CardId, CardId)], step: Duration) {
    for (a, b) in pairs {
        assert_ok!(game.select_card(*a).await);
        sleep(step).await;
        assert_ok!(game.select_card(*b).await);
        sleep(step).await;
    }
}

#[tokio::test(start_paused = true)]
async fn full_game_through_the_driver() {
    let store = RecordingStore::default();
    let view = ViewLog::default();
    let config = GameConfig::default().with_pairs(3).with_seed(99);
    let (game, _task) = spawn_game(config, store.clone(), view.clone()).unwrap();

    assert_ok!(game.snapshot().await);
    let deck = view.with(|v| v.deck.clone());
    assert_eq!(deck.len(), 6);
    let pairs = pairs_of(&deck);

    // One wrong turn first.
    game.select_card(pairs[0].0).await.unwrap();
    let outcome = game.select_card(pairs[1].0).await.unwrap();
    assert!(matches!(outcome, SelectOutcome::Mismatched(_)));
    assert_eq!(view.with(|v| v.face_up.len()), 2);

    sleep(Duration::from_millis(800)).await;
    assert!(view.with(|v| v.face_up.is_empty()));
    assert_eq!(view.with(|v| v.last_tick), Some(750));

    play_all(&game, &pairs, Duration::from_millis(200)).await;

    let snap = game.snapshot().await.unwrap();
    assert_eq!(snap.phase, "won");
    assert_eq!(snap.moves, 4);
    assert!(!snap.timer_running);

    // 800ms wait plus five 200ms steps before the final selection.
    let expected = BestScore::new(4, 1_800);
    assert_eq!(store.attempts(), vec![expected]);
    assert_eq!(game.best_score().await.unwrap(), Some(expected));
    assert_eq!(view.with(|v| v.banner.clone()), Some("4 moves in 00:01".to_string()));
}

#[tokio::test(start_paused = true)]
async fn best_score_persists_across_resets() {
    let store = RecordingStore::default();
    let view = ViewLog::default();
    let config = GameConfig::default().with_pairs(2).with_seed(5);
    let (game, _task) = spawn_game(config, store.clone(), view.clone()).unwrap();
    assert_ok!(game.snapshot().await);

    let pairs = pairs_of(&view.with(|v| v.deck.clone()));
    play_all(&game, &pairs, Duration::from_millis(500)).await;
    assert_eq!(game.best_score().await.unwrap(), Some(BestScore::new(2, 1_500)));

    game.reset().await.unwrap();
    assert!(view.with(|v| v.banner.is_none()));
    let pairs = pairs_of(&view.with(|v| v.deck.clone()));
    play_all(&game, &pairs, Duration::from_millis(100)).await;

    assert_eq!(
        store.attempts(),
        vec![BestScore::new(2, 1_500), BestScore::new(2, 300)]
    );
    assert_eq!(game.best_score().await.unwrap(), Some(BestScore::new(2, 300)));
}

#[tokio::test(start_paused = true)]
async fn handles_share_one_game() {
    let config = GameConfig::default().with_pairs(2).with_seed(5);
    let (game, task) = spawn_game(config, MemoryScoreStore::new(), NoopObserver).unwrap();
    let other = game.clone();

    let first = game.snapshot().await.unwrap().cards[0].id.clone();
    let id = CardId::parse(&first).unwrap();
    assert_eq!(other.select_card(id).await.unwrap(), SelectOutcome::Revealed);
    assert_eq!(game.snapshot().await.unwrap().face_up(), 1);

    drop(game);
    drop(other);
    assert!(task.await.is_ok());
}
