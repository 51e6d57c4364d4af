use acrodash::auth::Identity;
use acrodash::protocol::{ClientMessage, ServerMessage};
use acrodash::state::AppState;
use acrodash::types::Phase;
use acrodash::ws::handlers::handle_message;
use std::sync::Arc;
use std::time::Duration;

const ROOM: &str = "AB7DEZ";

async fn enter(state: &Arc<AppState>, name: &str) -> Identity {
    let identity = state.sign_in(name).await.expect("any username signs in");
    state
        .join_room(ROOM, &identity.username)
        .await
        .expect("mock room exists");
    identity
}

async fn send(
    state: &Arc<AppState>,
    viewer: &Identity,
    msg: ClientMessage,
) -> Option<ServerMessage> {
    handle_message(msg, viewer, ROOM, state).await
}

/// Drive the running countdown to zero by hand, like its ticker would
async fn run_out_countdown(state: &Arc<AppState>) {
    let epoch = state.rooms.read().await[ROOM]
        .controller
        .timer_epoch()
        .expect("countdown running");
    while state.tick_room(ROOM, epoch).await {}
}

async fn phase(state: &Arc<AppState>) -> Phase {
    state.room_snapshot(ROOM).await.expect("room open").phase
}

async fn fitting_phrase(state: &Arc<AppState>) -> String {
    let snapshot = state.room_snapshot(ROOM).await.expect("room open");
    snapshot
        .acronym
        .letters()
        .iter()
        .map(|c| format!("{}ighty", c))
        .collect::<Vec<_>>()
        .join(" ")
}

/// End-to-end round: start, submit, vote, results, next round
#[tokio::test]
async fn test_full_round_flow() {
    let state = Arc::new(AppState::default());
    let alice = enter(&state, "Alice").await;
    let bob = enter(&state, "Bob").await;
    let charlie = enter(&state, "Charlie").await;

    // 1. Only the host can start
    assert!(send(&state, &bob, ClientMessage::StartRound).await.is_none());
    assert_eq!(phase(&state).await, Phase::NotStarted);

    assert!(send(&state, &alice, ClientMessage::StartRound).await.is_none());
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.phase, Phase::PhraseEntry);
    assert_eq!(snapshot.round_no, 1);
    assert_eq!(snapshot.acronym.len(), 3);
    assert_eq!(snapshot.remaining, 24);

    // 2. Phrase entry: one phrase per viewer, invalid ones ignored
    let text = fitting_phrase(&state).await;
    let bob_phrase = match send(
        &state,
        &bob,
        ClientMessage::SubmitPhrase { text: text.clone() },
    )
    .await
    {
        Some(ServerMessage::PhraseAccepted { phrase_id }) => phrase_id,
        other => panic!("Expected PhraseAccepted, got {:?}", other),
    };
    assert!(send(&state, &bob, ClientMessage::SubmitPhrase { text: text.clone() })
        .await
        .is_none());
    assert!(send(
        &state,
        &charlie,
        ClientMessage::SubmitPhrase {
            text: "not even close to fitting".to_string(),
        },
    )
    .await
    .is_none());

    // Submissions never end the phase early
    assert_eq!(phase(&state).await, Phase::PhraseEntry);

    // 3. Timer runs out -> voting with Bob's phrase on the ballot
    run_out_countdown(&state).await;
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Voting);
    assert_eq!(snapshot.remaining, 30);
    assert_eq!(snapshot.ballot.len(), 1);
    assert_eq!(snapshot.ballot[0].id, bob_phrase);

    // Late submission is ignored
    assert!(send(&state, &charlie, ClientMessage::SubmitPhrase { text })
        .await
        .is_none());

    // 4. One vote per viewer
    match send(
        &state,
        &alice,
        ClientMessage::CastVote {
            phrase_id: bob_phrase.clone(),
        },
    )
    .await
    {
        Some(ServerMessage::VoteAccepted { phrase_id }) => assert_eq!(phrase_id, bob_phrase),
        other => panic!("Expected VoteAccepted, got {:?}", other),
    }
    assert!(send(
        &state,
        &alice,
        ClientMessage::CastVote {
            phrase_id: bob_phrase.clone(),
        },
    )
    .await
    .is_none());

    // 5. Voting times out
    run_out_countdown(&state).await;
    assert_eq!(phase(&state).await, Phase::Results);
    assert!(send(
        &state,
        &charlie,
        ClientMessage::CastVote {
            phrase_id: bob_phrase.clone(),
        },
    )
    .await
    .is_none());

    // 6. Host closes results and the next round gets a longer acronym
    assert!(send(&state, &bob, ClientMessage::ConcludeRound).await.is_none());
    assert_eq!(phase(&state).await, Phase::Results);
    send(&state, &alice, ClientMessage::ConcludeRound).await;
    assert_eq!(phase(&state).await, Phase::NotStarted);

    send(&state, &alice, ClientMessage::StartRound).await;
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.round_no, 2);
    assert_eq!(snapshot.acronym.len(), 4);
    assert!(snapshot.ballot.is_empty());
}

#[tokio::test]
async fn test_room_broadcasts_phase_changes() {
    let state = Arc::new(AppState::default());
    let alice = enter(&state, "Alice").await;
    let mut rx = state.subscribe(ROOM).await.unwrap();

    send(&state, &alice, ClientMessage::StartRound).await;

    match rx.recv().await.unwrap() {
        ServerMessage::Phase {
            phase,
            round_no,
            acronym,
            remaining,
            ..
        } => {
            assert_eq!(phase, Phase::PhraseEntry);
            assert_eq!(round_no, 1);
            assert_eq!(acronym.len(), 3);
            assert_eq!(remaining, 24);
        }
        other => panic!("Expected Phase, got {:?}", other),
    }

    let epoch = state.rooms.read().await[ROOM]
        .controller
        .timer_epoch()
        .unwrap();
    state.tick_room(ROOM, epoch).await;
    match rx.recv().await.unwrap() {
        ServerMessage::Timer { remaining } => assert_eq!(remaining, 23),
        other => panic!("Expected Timer, got {:?}", other),
    }
}

/// The spawned ticker alone moves the room through both countdowns
#[tokio::test(start_paused = true)]
async fn test_timer_drives_phases() {
    let state = Arc::new(AppState::default());
    let alice = enter(&state, "Alice").await;
    send(&state, &alice, ClientMessage::StartRound).await;

    tokio::time::sleep(Duration::from_millis(23_500)).await;
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.phase, Phase::PhraseEntry);
    assert_eq!(snapshot.remaining, 1);

    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.phase, Phase::Voting);
    assert_eq!(snapshot.remaining, 30);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(phase(&state).await, Phase::Results);

    // No countdown left, no ticker left
    assert!(state.rooms.read().await[ROOM].timer.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_last_exit_stops_timer() {
    let state = Arc::new(AppState::default());
    let alice = enter(&state, "Alice").await;
    send(&state, &alice, ClientMessage::StartRound).await;

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    send(&state, &alice, ClientMessage::ExitRoom).await;
    assert!(state.room_snapshot(ROOM).await.is_none());

    // Reopening starts from a fresh controller
    tokio::time::sleep(Duration::from_secs(60)).await;
    enter(&state, "Bob").await;
    let snapshot = state.room_snapshot(ROOM).await.unwrap();
    assert_eq!(snapshot.phase, Phase::NotStarted);
    assert_eq!(snapshot.round_no, 0);
}
