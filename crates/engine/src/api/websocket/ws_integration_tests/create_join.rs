use super::*;

#[tokio::test]
async fn when_creating_room_then_creator_is_sole_member() {
    let (app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;

    ws_send_client(&mut creator_ws, &create_room_msg("ABC", 7, "alice")).await;

    let msg = ws_expect_message(&mut creator_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::RoomCreated { .. })
    })
    .await;
    let ServerMessage::RoomCreated {
        room_code,
        users,
        is_creator,
    } = msg
    else {
        panic!("expected RoomCreated");
    };
    assert_eq!(room_code, "ABC");
    assert!(is_creator);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].db_user_id, 7);
    assert_eq!(users[0].user_name, "alice");
    assert!(!users[0].socket_id.is_empty());

    assert!(app.rooms.contains(&code("ABC")).await);

    server.abort();
}

#[tokio::test]
async fn when_room_code_is_taken_then_second_create_fails() {
    let (app, addr, server) = spawn_test_server().await;
    let mut first_ws = ws_connect(addr).await;
    let mut second_ws = ws_connect(addr).await;

    create_room(&mut first_ws, "ABC", 7, "alice").await;
    ws_send_client(&mut second_ws, &create_room_msg("ABC", 8, "bob")).await;

    let msg = ws_expect_message(&mut second_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CreateRoomError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::CreateRoomError {
            message: "This room code is already in use. Try another one.".to_string()
        }
    );

    // The original room is untouched
    let room = app.rooms.snapshot(&code("ABC")).await.unwrap();
    assert_eq!(room.len(), 1);
    assert_eq!(room.members()[0].display_name().as_str(), "alice");

    server.abort();
}

#[tokio::test]
async fn when_create_payload_is_incomplete_then_create_fails() {
    let (app, addr, server) = spawn_test_server().await;
    let mut ws = ws_connect(addr).await;

    for msg in [
        ClientMessage::CreateRoom {
            room_code: Some("ABC".to_string()),
            user: None,
        },
        ClientMessage::CreateRoom {
            room_code: None,
            user: user(7, "alice"),
        },
        create_room_msg("ABC", 0, "alice"),
        create_room_msg("ABC", 7, "   "),
    ] {
        ws_send_client(&mut ws, &msg).await;
        let reply = ws_expect_message(&mut ws, RECV_TIMEOUT, |m| {
            matches!(m, ServerMessage::CreateRoomError { .. })
        })
        .await;
        assert_eq!(
            reply,
            ServerMessage::CreateRoomError {
                message: "Incomplete data to create the room.".to_string()
            }
        );
    }

    assert_eq!(app.rooms.room_count().await, 0);

    server.abort();
}

#[tokio::test]
async fn when_joining_room_then_joiner_is_confirmed_and_room_is_updated() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut joiner_ws = ws_connect(addr).await;

    create_room(&mut creator_ws, "ABC", 7, "alice").await;
    ws_send_client(&mut joiner_ws, &join_room_msg("ABC", user(8, "bob"))).await;

    let joined = ws_expect_message(&mut joiner_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::JoinedRoom { .. })
    })
    .await;
    let ServerMessage::JoinedRoom { room_code, users } = joined else {
        panic!("expected JoinedRoom");
    };
    assert_eq!(room_code, "ABC");
    assert_eq!(user_names(&users), vec!["alice", "bob"]);

    // The joiner receives the room-wide update too
    let joiner_update = expect_group_update(&mut joiner_ws).await;
    assert_eq!(joiner_update, users);

    let creator_update = expect_group_update(&mut creator_ws).await;
    assert_eq!(creator_update, users);

    server.abort();
}

#[tokio::test]
async fn when_joining_missing_room_then_join_error() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut ws = ws_connect(addr).await;

    ws_send_client(&mut ws, &join_room_msg("NOPE", user(8, "bob"))).await;

    let msg = ws_expect_message(&mut ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::JoinError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::JoinError {
            message: "The room does not exist.".to_string()
        }
    );

    server.abort();
}

#[tokio::test]
async fn when_join_payload_is_incomplete_then_join_error() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut ws = ws_connect(addr).await;

    ws_send_client(
        &mut ws,
        &ClientMessage::JoinRoom {
            room_code: Some("ABC".to_string()),
            user: None,
        },
    )
    .await;

    let msg = ws_expect_message(&mut ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::JoinError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::JoinError {
            message: "Incomplete data to join the room.".to_string()
        }
    );

    server.abort();
}

#[tokio::test]
async fn when_room_has_six_members_then_seventh_join_gets_room_full() {
    let (app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 1, "p1").await;

    let mut members = Vec::new();
    for id in 2..=6 {
        let mut ws = ws_connect(addr).await;
        join_room(&mut ws, "ABC", user(id, &format!("p{}", id))).await;
        members.push(ws);
    }

    let mut late_ws = ws_connect(addr).await;
    ws_send_client(&mut late_ws, &join_room_msg("ABC", user(7, "p7"))).await;

    let msg = ws_expect_message(&mut late_ws, RECV_TIMEOUT, |m| {
        matches!(
            m,
            ServerMessage::RoomFull { .. } | ServerMessage::JoinError { .. }
        )
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::RoomFull {
            message: "The room is full.".to_string()
        }
    );
    assert_eq!(app.rooms.snapshot(&code("ABC")).await.unwrap().len(), 6);

    server.abort();
}

#[tokio::test]
async fn when_guests_join_then_they_get_sequential_guest_identities() {
    let (_app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;

    let mut guests = Vec::new();
    let mut users = Vec::new();
    for _ in 0..3 {
        let mut ws = ws_connect(addr).await;
        users = join_room(&mut ws, "ABC", Some(UserData::guest())).await;
        guests.push(ws);
    }

    let guest_ids: Vec<i64> = users[1..].iter().map(|u| u.db_user_id).collect();
    assert_eq!(guest_ids, vec![-1, -2, -3]);
    assert_eq!(
        user_names(&users[1..]),
        vec!["guest-1", "guest-2", "guest-3"]
    );

    server.abort();
}

#[tokio::test]
async fn when_identity_is_already_in_room_then_join_fails() {
    let (app, addr, server) = spawn_test_server().await;
    let mut creator_ws = ws_connect(addr).await;
    let mut twin_ws = ws_connect(addr).await;
    create_room(&mut creator_ws, "ABC", 7, "alice").await;

    ws_send_client(&mut twin_ws, &join_room_msg("ABC", user(7, "alice again"))).await;

    let msg = ws_expect_message(&mut twin_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::JoinError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::JoinError {
            message: "You are already in this room.".to_string()
        }
    );
    assert_eq!(app.rooms.snapshot(&code("ABC")).await.unwrap().len(), 1);

    // No membership change means no group update for the creator
    ws_expect_no_message_matching(&mut creator_ws, QUIET_TIMEOUT, |m| {
        matches!(m, ServerMessage::GroupUpdate { .. })
    })
    .await;

    server.abort();
}

#[tokio::test]
async fn when_connection_is_in_a_room_then_it_cannot_enter_another() {
    let (app, addr, server) = spawn_test_server().await;
    let mut alice_ws = ws_connect(addr).await;
    let mut bob_ws = ws_connect(addr).await;

    create_room(&mut alice_ws, "ABC", 7, "alice").await;
    create_room(&mut bob_ws, "XYZ", 8, "bob").await;

    ws_send_client(&mut alice_ws, &join_room_msg("XYZ", user(7, "alice"))).await;
    let msg = ws_expect_message(&mut alice_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::JoinError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::JoinError {
            message: "You are already in another room.".to_string()
        }
    );

    ws_send_client(&mut alice_ws, &create_room_msg("NEW", 7, "alice")).await;
    let msg = ws_expect_message(&mut alice_ws, RECV_TIMEOUT, |m| {
        matches!(m, ServerMessage::CreateRoomError { .. })
    })
    .await;
    assert_eq!(
        msg,
        ServerMessage::CreateRoomError {
            message: "You are already in another room.".to_string()
        }
    );

    assert_eq!(app.rooms.room_count().await, 2);
    assert_eq!(app.rooms.snapshot(&code("XYZ")).await.unwrap().len(), 1);

    server.abort();
}
