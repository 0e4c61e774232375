//! Round state machine.
//!
//! The controller is the only writer of the [`GameStateStore`]. A round
//! walks `Ready -> Judging -> RoundResult`, and from there either back to
//! `Ready` or on to the terminal `GameOver`:
//!
//! ```text
//! INITIALIZED --initialize()--> READY
//! READY --select_card()--> JUDGING --(reveal delay)--> ROUND_RESULT
//! ROUND_RESULT --prepare_next_round()--> READY
//! ROUND_RESULT --finish_round() [game over]--> GAME_OVER
//! any --reset()--> READY
//! ```
//!
//! The outcome of a round is computed when the selection is accepted and
//! committed after the reveal delay in a single store write. The deferred
//! commit carries the session and round it was judged in and is dropped if
//! either has moved on by the time it fires.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use super::action::{CommandError, Selection};
use super::config::GameConfig;
use super::contracts::{CardInHand, Contract, RoundContract};
use super::invariants::{InvariantSet, JankenInvariants, describe};
use super::opponent::{OpponentSelector, SelectorError};
use super::rules::{evaluate_game_over, judge_round, loser_of};
use super::store::{GameStateStore, StatePatch};
use super::{Card, CardId, GameOverResult, GamePhase, GameState, Player, PlayerId, RoundResult};

/// Delay between accepting a selection and revealing the round.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1500);

/// What follows a revealed round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundFlow {
    /// The next round is ready.
    Continue,
    /// The game has ended.
    GameOver(GameOverResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RevealToken {
    session: u64,
    round: u32,
}

/// Drives a game through its phases.
pub struct GameController {
    store: GameStateStore,
    config: GameConfig,
    selector: Arc<dyn OpponentSelector>,
    card_ids: AtomicU64,
    reveal_delay: Duration,
    commands: Mutex<()>,
}

impl std::fmt::Debug for GameController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameController")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("selector", &self.selector.name())
            .field("reveal_delay", &self.reveal_delay)
            .finish()
    }
}

impl GameController {
    /// Creates a controller with a fresh, undealt store.
    #[instrument(skip(selector), fields(selector = selector.name()))]
    pub fn new(config: GameConfig, selector: Arc<dyn OpponentSelector>) -> Self {
        Self {
            store: GameStateStore::new(&config),
            config,
            selector,
            card_ids: AtomicU64::new(0),
            reveal_delay: REVEAL_DELAY,
            commands: Mutex::new(()),
        }
    }

    /// Overrides the reveal delay.
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// The store this controller writes to.
    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    /// The configuration games are dealt from.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The configured reveal delay.
    pub fn reveal_delay(&self) -> Duration {
        self.reveal_delay
    }

    fn lock_commands(&self) -> MutexGuard<'_, ()> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deals a fresh game and moves to `Ready`.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Arc<GameState> {
        let _guard = self.lock_commands();
        self.deal()
    }

    /// Restarts the card id sequence and deals a fresh game.
    ///
    /// A reveal still pending from the previous game is discarded.
    #[instrument(skip(self))]
    pub fn reset(&self) -> Arc<GameState> {
        let _guard = self.lock_commands();
        self.card_ids.store(0, Ordering::SeqCst);
        let state = self.deal();
        info!(session = state.session, "Game reset");
        state
    }

    fn deal(&self) -> Arc<GameState> {
        let session = self.store.get_state().session + 1;
        let players: Vec<Player> = (0..*self.config.player_count())
            .map(|seat| {
                let mut player = Player::seated(seat, *self.config.initial_coins());
                player.hand = self.deal_hand(session);
                player
            })
            .collect();

        let state = self.store.set_state(
            StatePatch::new()
                .phase(GamePhase::Ready)
                .players(players)
                .discard(Vec::new())
                .current_round(1)
                .last_result(None)
                .selected_cards(BTreeMap::new())
                .session(session),
        );
        self.verify(&state);
        info!(
            session,
            players = state.players.len(),
            hand_size = self.config.hand_size(),
            "Game initialized"
        );
        state
    }

    /// Cards grouped by kind; the remainder of `hand_size` goes to the
    /// first kinds.
    fn deal_hand(&self, session: u64) -> Vec<Card> {
        let kinds = self.config.card_types();
        let per_kind = self.config.hand_size() / kinds.len();
        let extra = self.config.hand_size() % kinds.len();
        kinds
            .iter()
            .enumerate()
            .flat_map(|(index, kind)| {
                let copies = per_kind + usize::from(index < extra);
                std::iter::repeat_n(*kind, copies)
            })
            .map(|kind| Card::new(kind, self.next_card_id(session)))
            .collect()
    }

    fn next_card_id(&self, session: u64) -> CardId {
        let n = self.card_ids.fetch_add(1, Ordering::SeqCst) + 1;
        CardId::from(format!("card-{session}-{n}"))
    }

    fn verify(&self, state: &GameState) {
        if cfg!(debug_assertions)
            && let Err(violations) = JankenInvariants::check_all(state)
        {
            error!(violations = %describe(&violations), "Game invariants violated");
        }
    }

    /// Commits the human's card for this round.
    ///
    /// On success the opponent's card is chosen, the phase moves to
    /// `Judging`, and the reveal is scheduled. Subscribers see three
    /// snapshots: the human's choice, both choices in `Judging`, and after
    /// the delay the scored round in `RoundResult`. On error the state is
    /// left as it was.
    #[instrument(skip(self, card), fields(player = %player_id, card = %card.id))]
    pub fn select_card(&self, player_id: &PlayerId, card: &Card) -> Result<(), CommandError> {
        let _guard = self.lock_commands();
        let state = self.store.get_state();

        let selection = Selection::new(player_id.clone(), card.clone());
        if let Err(err) = RoundContract::pre(&state, &selection) {
            warn!(code = %err.code(), error = %err, "Selection rejected");
            return Err(err);
        }
        let human_card = held_card(&state, player_id, &card.id).ok_or_else(|| {
            CommandError::CardNotInHand {
                card_id: card.id.clone(),
            }
        })?;

        let mut selected = BTreeMap::new();
        selected.insert(player_id.clone(), human_card.clone());
        self.store
            .set_state(StatePatch::new().selected_cards(selected.clone()));

        let (opponent_id, opponent_card) = match self.choose_for_opponent(&state) {
            Ok(choice) => choice,
            Err(err) => return Err(self.abort_selection(err)),
        };
        selected.insert(opponent_id.clone(), opponent_card.clone());

        let result = judge_round(&human_card, &opponent_card);
        let judging_patch = StatePatch::new()
            .selected_cards(selected)
            .phase(GamePhase::Judging);
        let judging = judging_patch.clone().apply(&self.store.get_state());
        let reveal = resolve_round(&judging, [player_id, &opponent_id], result);

        if cfg!(debug_assertions)
            && let Err(err) = RoundContract::post(&judging, &reveal.clone().apply(&judging))
        {
            return Err(self.abort_selection(err));
        }

        let judged = self.store.set_state(judging_patch);
        info!(
            round = judged.current_round,
            human = %human_card.kind,
            opponent = %opponent_card.kind,
            %result,
            "Round judged"
        );

        self.schedule_reveal(
            RevealToken {
                session: judged.session,
                round: judged.current_round,
            },
            reveal,
        );
        Ok(())
    }

    fn choose_for_opponent(&self, state: &GameState) -> Result<(PlayerId, Card), CommandError> {
        let opponent_id = state
            .opponent()
            .map(|player| player.id.clone())
            .ok_or(SelectorError::NoOpponent)?;

        let chosen = self
            .selector
            .select_card(&opponent_id, &self.store)
            .inspect_err(|err| error!(selector = self.selector.name(), error = %err, "Opponent selection failed"))?;

        let choice = Selection::new(opponent_id.clone(), chosen);
        CardInHand::check(&choice, state).map_err(|_| {
            error!(card = %choice.card.id, "Opponent chose a card outside its hand");
            CommandError::InvariantViolation {
                description: format!("opponent chose {} which is not in its hand", choice.card.id),
            }
        })?;
        let card = held_card(state, &opponent_id, &choice.card.id).unwrap_or(choice.card);
        Ok((opponent_id, card))
    }

    fn abort_selection(&self, err: CommandError) -> CommandError {
        warn!(code = %err.code(), error = %err, "Round aborted; clearing selections");
        self.store
            .set_state(StatePatch::new().selected_cards(BTreeMap::new()));
        err
    }

    fn schedule_reveal(&self, token: RevealToken, reveal: StatePatch) {
        let store = self.store.clone();
        let delay = self.reveal_delay;
        debug!(?token, ?delay, "Scheduling reveal");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    commit_reveal(&store, token, reveal);
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    commit_reveal(&store, token, reveal);
                });
            }
        }
    }

    /// Returns the final result if the game can no longer continue.
    ///
    /// Read-only. Always `None` before the first deal.
    #[instrument(skip(self))]
    pub fn check_game_over(&self) -> Option<GameOverResult> {
        let state = self.store.get_state();
        if state.phase == GamePhase::Initialized {
            return None;
        }
        evaluate_game_over(&state)
    }

    /// Clears the selections and opens the next round.
    ///
    /// Only valid in `RoundResult`.
    #[instrument(skip(self))]
    pub fn prepare_next_round(&self) -> Result<(), CommandError> {
        let _guard = self.lock_commands();
        self.advance()
    }

    fn advance(&self) -> Result<(), CommandError> {
        let state = self
            .store
            .try_update::<CommandError, _>(|state| {
                expect_phase(state, GamePhase::RoundResult)?;
                Ok(StatePatch::new()
                    .selected_cards(BTreeMap::new())
                    .current_round(state.current_round + 1)
                    .phase(GamePhase::Ready))
            })
            .inspect_err(|err| warn!(error = %err, "Cannot prepare next round"))?;
        self.verify(&state);
        info!(round = state.current_round, "Next round ready");
        Ok(())
    }

    /// Ends the game if it is over, otherwise opens the next round.
    ///
    /// Only valid in `RoundResult`.
    #[instrument(skip(self))]
    pub fn finish_round(&self) -> Result<RoundFlow, CommandError> {
        let _guard = self.lock_commands();
        let state = self.store.get_state();
        expect_phase(&state, GamePhase::RoundResult)?;

        match evaluate_game_over(&state) {
            Some(result) => {
                self.store.try_update::<CommandError, _>(|state| {
                    expect_phase(state, GamePhase::RoundResult)?;
                    Ok(StatePatch::new().phase(GamePhase::GameOver))
                })?;
                info!(winner = %result.winner, reason = %result.reason, "Game over");
                Ok(RoundFlow::GameOver(result))
            }
            None => {
                self.advance()?;
                Ok(RoundFlow::Continue)
            }
        }
    }
}

fn expect_phase(state: &GameState, expected: GamePhase) -> Result<(), CommandError> {
    if state.phase == expected {
        Ok(())
    } else {
        Err(CommandError::InvalidPhase {
            expected,
            actual: state.phase,
        })
    }
}

fn held_card(state: &GameState, player_id: &PlayerId, card_id: &CardId) -> Option<Card> {
    state
        .player(player_id)?
        .hand
        .iter()
        .find(|card| &card.id == card_id)
        .cloned()
}

/// Scores the round and moves the played cards to the discard, human's first.
fn resolve_round(judging: &GameState, seats: [&PlayerId; 2], result: RoundResult) -> StatePatch {
    let mut players = judging.players.clone();
    let mut discard = judging.discard.clone();

    for seat in seats {
        if let Some(card) = judging.selected_cards.get(seat)
            && let Some(player) = players.iter_mut().find(|player| &player.id == seat)
            && let Some(played) = player.remove_from_hand(&card.id)
        {
            discard.push(played);
        }
    }

    if let Some(loser) = loser_of(result).map(|index| seats[index])
        && let Some(player) = players.iter_mut().find(|player| &player.id == loser)
    {
        player.coins = player.coins.saturating_sub(1);
    }

    StatePatch::new()
        .players(players)
        .discard(discard)
        .last_result(Some(result))
        .phase(GamePhase::RoundResult)
}

#[instrument(skip(store, reveal))]
fn commit_reveal(store: &GameStateStore, token: RevealToken, reveal: StatePatch) {
    let outcome = store.try_update(|state| {
        if state.session == token.session
            && state.current_round == token.round
            && state.phase == GamePhase::Judging
        {
            Ok(reveal)
        } else {
            Err((state.session, state.current_round, state.phase))
        }
    });

    match outcome {
        Ok(state) => info!(
            round = state.current_round,
            result = ?state.last_result,
            "Round revealed"
        ),
        Err((session, round, phase)) => warn!(
            session,
            round,
            %phase,
            "Discarding stale reveal"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::janken::{CardKind, GameConfigOverrides};

    /// Plays the first card of one kind, or the first card in hand.
    struct FixedSelector(CardKind);

    impl OpponentSelector for FixedSelector {
        fn select_card(
            &self,
            player_id: &PlayerId,
            store: &GameStateStore,
        ) -> Result<Card, SelectorError> {
            let hand = crate::games::janken::current_hand(player_id, store)?;
            Ok(hand
                .iter()
                .find(|card| card.kind == self.0)
                .unwrap_or(&hand[0])
                .clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingSelector;

    impl OpponentSelector for FailingSelector {
        fn select_card(
            &self,
            player_id: &PlayerId,
            _store: &GameStateStore,
        ) -> Result<Card, SelectorError> {
            Err(SelectorError::HandEmpty {
                player_id: player_id.clone(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn controller(opponent: CardKind) -> GameController {
        GameController::new(GameConfig::default(), Arc::new(FixedSelector(opponent)))
    }

    fn human_card(controller: &GameController, kind: CardKind) -> Card {
        let state = controller.store().get_state();
        state.players[0]
            .hand
            .iter()
            .find(|card| card.kind == kind)
            .expect("kind in hand")
            .clone()
    }

    async fn wait_for_reveal() {
        tokio::time::sleep(REVEAL_DELAY + Duration::from_millis(10)).await;
    }

    #[test]
    fn test_initialize_deals_two_of_each() {
        let controller = controller(CardKind::Rock);
        let state = controller.initialize();

        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.current_round, 1);
        assert!(state.discard.is_empty());
        assert!(state.selected_cards.is_empty());
        for player in &state.players {
            assert_eq!(player.coins, 3);
            let kinds: Vec<_> = player.hand.iter().map(|card| card.kind).collect();
            assert_eq!(
                kinds,
                vec![
                    CardKind::Rock,
                    CardKind::Rock,
                    CardKind::Paper,
                    CardKind::Paper,
                    CardKind::Scissors,
                    CardKind::Scissors
                ]
            );
        }
    }

    #[test]
    fn test_uneven_hand_size_front_loads_remainder() {
        let config = GameConfig::create(GameConfigOverrides {
            hand_size: Some(7),
            ..Default::default()
        })
        .expect("valid config");
        let controller = GameController::new(config, Arc::new(FixedSelector(CardKind::Rock)));
        let state = controller.initialize();
        let rocks = state.players[0]
            .hand
            .iter()
            .filter(|card| card.kind == CardKind::Rock)
            .count();
        assert_eq!(state.players[0].hand.len(), 7);
        assert_eq!(rocks, 3);
    }

    #[test]
    fn test_reset_produces_fresh_ids() {
        let controller = controller(CardKind::Rock);
        let first = controller.initialize();
        let second = controller.reset();

        let old_ids: Vec<_> = first.players[0].hand.iter().map(|c| &c.id).collect();
        assert!(second.players[0].hand.iter().all(|card| !old_ids.contains(&&card.id)));
        assert_eq!(second.players[0].hand[0].id.as_str(), "card-2-1");
        assert!(JankenInvariants::check_all(&second).is_ok());
    }

    #[test]
    fn test_check_game_over_before_deal() {
        let controller = controller(CardKind::Rock);
        assert!(controller.check_game_over().is_none());
        controller.initialize();
        assert!(controller.check_game_over().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rock_beats_scissors() {
        let controller = controller(CardKind::Scissors);
        controller.initialize();
        let rock = human_card(&controller, CardKind::Rock);

        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");
        assert_eq!(controller.store().get_state().phase, GamePhase::Judging);

        wait_for_reveal().await;
        let state = controller.store().get_state();
        assert_eq!(state.phase, GamePhase::RoundResult);
        assert_eq!(state.last_result, Some(RoundResult::PlayerWin));
        assert_eq!(state.players[0].coins, 3);
        assert_eq!(state.players[1].coins, 2);
        assert_eq!(state.discard.len(), 2);
        assert_eq!(state.discard[0].id, rock.id);
        assert_eq!(state.players[0].hand.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_waits_for_delay() {
        let controller = controller(CardKind::Paper);
        controller.initialize();
        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");

        tokio::time::sleep(REVEAL_DELAY / 2).await;
        let state = controller.store().get_state();
        assert_eq!(state.phase, GamePhase::Judging);
        assert_eq!(state.players[0].hand.len(), 6);

        wait_for_reveal().await;
        let state = controller.store().get_state();
        assert_eq!(state.last_result, Some(RoundResult::ComputerWin));
        assert_eq!(state.players[0].coins, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_transitions_observed() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.store().subscribe(move |state| {
            sink.lock()
                .unwrap()
                .push((state.phase, state.selected_cards.len()));
        });

        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");
        wait_for_reveal().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                (GamePhase::Ready, 1),
                (GamePhase::Judging, 2),
                (GamePhase::RoundResult, 2),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_not_in_hand_leaves_state_unchanged() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        let before = controller.store().get_state();

        let bogus = Card::new(CardKind::Rock, "invalid-card-id".into());
        let err = controller
            .select_card(&PlayerId::seat(0), &bogus)
            .unwrap_err();
        assert!(matches!(err, CommandError::CardNotInHand { .. }));
        assert_eq!(*controller.store().get_state(), *before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_player_rejected() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        let rock = human_card(&controller, CardKind::Rock);
        let err = controller
            .select_card(&"nobody".into(), &rock)
            .unwrap_err();
        assert_eq!(err.code().to_string(), "NOT_PLAYER_TURN");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_selection_while_judging_rejected() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        let paper = human_card(&controller, CardKind::Paper);
        controller
            .select_card(&PlayerId::seat(0), &paper)
            .expect("valid selection");

        let scissors = human_card(&controller, CardKind::Scissors);
        let err = controller
            .select_card(&PlayerId::seat(0), &scissors)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidPhase {
                expected: GamePhase::Ready,
                actual: GamePhase::Judging
            }
        ));

        wait_for_reveal().await;
        assert_eq!(controller.store().get_state().discard.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_discards_pending_reveal() {
        let controller = controller(CardKind::Scissors);
        controller.initialize();
        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");

        controller.reset();
        wait_for_reveal().await;

        let state = controller.store().get_state();
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.discard.is_empty());
        assert!(state.last_result.is_none());
        assert!(state.players.iter().all(|p| p.coins == 3 && p.hand.len() == 6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selector_failure_aborts_round() {
        let controller = GameController::new(GameConfig::default(), Arc::new(FailingSelector));
        controller.initialize();
        let before = controller.store().get_state();
        let rock = human_card(&controller, CardKind::Rock);

        let err = controller
            .select_card(&PlayerId::seat(0), &rock)
            .unwrap_err();
        assert!(matches!(err, CommandError::Opponent(_)));
        assert_eq!(*controller.store().get_state(), *before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_opponent_seat_aborts_round() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        let human = controller.store().get_state().players[0].clone();
        controller
            .store()
            .set_state(StatePatch::new().players(vec![human]));
        let before = controller.store().get_state();
        let rock = human_card(&controller, CardKind::Rock);

        let err = controller
            .select_card(&PlayerId::seat(0), &rock)
            .unwrap_err();
        assert_eq!(err, CommandError::Opponent(SelectorError::NoOpponent));
        assert_eq!(*controller.store().get_state(), *before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_rejected_while_showing_result() {
        let controller = controller(CardKind::Paper);
        controller.initialize();
        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");
        wait_for_reveal().await;
        let before = controller.store().get_state();
        assert_eq!(before.phase, GamePhase::RoundResult);

        let scissors = human_card(&controller, CardKind::Scissors);
        let err = controller
            .select_card(&PlayerId::seat(0), &scissors)
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::InvalidPhase {
                expected: GamePhase::Ready,
                actual: GamePhase::RoundResult
            }
        ));
        assert_eq!(err.code().to_string(), "INVALID_PHASE");
        assert_eq!(*controller.store().get_state(), *before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepare_next_round() {
        let controller = controller(CardKind::Rock);
        controller.initialize();
        assert!(matches!(
            controller.prepare_next_round(),
            Err(CommandError::InvalidPhase { .. })
        ));

        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");
        wait_for_reveal().await;
        controller.prepare_next_round().expect("round result");

        let state = controller.store().get_state();
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.current_round, 2);
        assert!(state.selected_cards.is_empty());
        assert_eq!(state.last_result, Some(RoundResult::Draw));
    }

    #[tokio::test(start_paused = true)]
    async fn test_game_over_is_terminal() {
        let controller = controller(CardKind::Scissors);
        controller.initialize();
        let mut players = controller.store().get_state().players.clone();
        players[1].coins = 1;
        controller.store().set_state(StatePatch::new().players(players));

        let rock = human_card(&controller, CardKind::Rock);
        controller
            .select_card(&PlayerId::seat(0), &rock)
            .expect("valid selection");
        wait_for_reveal().await;

        let flow = controller.finish_round().expect("round result");
        let RoundFlow::GameOver(result) = flow else {
            panic!("expected game over, got {flow:?}");
        };
        assert_eq!(result.winner, crate::games::janken::Winner::Player(PlayerId::seat(0)));
        assert_eq!(controller.store().get_state().phase, GamePhase::GameOver);

        let before = controller.store().get_state();
        let rock = human_card(&controller, CardKind::Rock);
        assert!(controller.select_card(&PlayerId::seat(0), &rock).is_err());
        assert!(controller.prepare_next_round().is_err());
        assert!(controller.finish_round().is_err());
        assert_eq!(*controller.store().get_state(), *before);
    }
}
