use super::*;

fn start_game_msg(code: &str) -> ClientMessage {
    ClientMessage::StartGame {
        room_code: code.to_string(),
    }
}

async fn expect_start_error(ws: &mut TestSocket) -> String {
    match ws_expect_message(ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::StartGameError { .. })
    })
    .await
    {
        ServerMessage::StartGameError { message } => message,
        other => panic!("expected StartGameError, got {:?}", other),
    }
}

#[tokio::test]
async fn when_creator_starts_with_two_members_then_everyone_gets_game_id() {
    let (app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut member_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;
    join_room(&mut member_ws, "ABC", user(8, "bob")).await;

    ws_send_client(&mut creator_ws, &start_game_msg("ABC")).await;

    let expected = ServerMessage::GameStarting {
        game_id: "game_ABC_1700000000000".to_string(),
    };
    for ws in [&mut creator_ws, &mut member_ws] {
        let msg = ws_expect_message(ws, RECV_TIMEOUT, |m| {
            matches!(m, ServerMessage::GameStarting { .. })
        })
        .await;
        assert_eq!(msg, expected);
    }

    let room = app.rooms.snapshot(&code("ABC")).await.unwrap();
    assert_eq!(
        room.game_id().map(|id| id.as_str()),
        Some("game_ABC_1700000000000")
    );

    server.abort();
}

#[tokio::test]
async fn when_room_has_one_member_then_start_fails_with_not_enough_players() {
    let (app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;

    ws_send_client(&mut creator_ws, &start_game_msg("ABC")).await;

    assert_eq!(
        expect_start_error(&mut creator_ws).await,
        "Not enough players to start the game."
    );
    assert!(app
        .rooms
        .snapshot(&code("ABC"))
        .await
        .unwrap()
        .game_id()
        .is_none());

    server.abort();
}

#[tokio::test]
async fn when_non_creator_starts_then_not_authorized() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut member_ws = ws_connect(addr).await;
    let mut other_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;
    join_room(&mut member_ws, "ABC", user(8, "bob")).await;
    join_room(&mut other_ws, "ABC", user(9, "carol")).await;

    ws_send_client(&mut member_ws, &start_game_msg("ABC")).await;

    assert_eq!(
        expect_start_error(&mut member_ws).await,
        "Only the room creator can start the game."
    );
    ws_expect_no_message_matching(&mut creator_ws, QUIET_TIMEOUT, |m| {
        matches!(m, ServerMessage::GameStarting { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_outsider_starts_a_lone_creator_room_then_not_authorized() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut outsider_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;

    ws_send_client(&mut outsider_ws, &start_game_msg("ABC")).await;

    // Authorization is checked before the player count
    assert_eq!(
        expect_start_error(&mut outsider_ws).await,
        "Only the room creator can start the game."
    );

    server.abort();
}

#[tokio::test]
async fn when_room_is_missing_then_start_fails_with_not_found() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut ws = ws_connect(addr).await;

    ws_send_client(&mut ws, &start_game_msg("NOPE")).await;
    assert_eq!(
        expect_start_error(&mut ws).await,
        "The room does not exist."
    );

    ws_send_client(&mut ws, &start_game_msg("")).await;
    assert_eq!(
        expect_start_error(&mut ws).await,
        "The room does not exist."
    );

    server.abort();
}

#[tokio::test]
async fn when_game_already_started_then_second_start_fails() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut member_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;
    join_room(&mut member_ws, "ABC", user(8, "bob")).await;

    ws_send_client(&mut creator_ws, &start_game_msg("ABC")).await;
    ws_expect_message(&mut creator_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::GameStarting { .. })
    })
    .await;

    ws_send_client(&mut creator_ws, &start_game_msg("ABC")).await;
    assert_eq!(
        expect_start_error(&mut creator_ws).await,
        "The game has already started."
    );

    server.abort();
}
