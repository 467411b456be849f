use crate::helpers::{connect_ws, make_test_app, seed, send, spawn_server};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use serial_test::serial;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Error, tungstenite::Message};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Next text frame as JSON, skipping transport pings.
async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a frame");
        match frame {
            Some(Ok(Message::Text(txt))) => return serde_json::from_str(&txt).unwrap(),
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Round-trips a presence query so the server side is known to be subscribed.
async fn ready(ws: &mut Ws) -> Value {
    ws.send(Message::Text(json!({ "type": "presence" }).to_string().into()))
        .await
        .unwrap();
    let reply = next_json(ws).await;
    assert_eq!(reply["type"], "presence");
    reply
}

#[tokio::test]
#[serial]
async fn unauthenticated_upgrade_is_rejected() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app).await;

    let path = format!("classrooms/{}/attendance", s.classroom.id);
    match connect_ws(&addr.to_string(), &path, "bogus").await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), 401),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("connection should have been rejected"),
    }
}

#[tokio::test]
#[serial]
async fn outsider_cannot_watch_classroom() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app).await;

    let path = format!("classrooms/{}/attendance", s.classroom.id);
    match connect_ws(&addr.to_string(), &path, &s.outsider_token).await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), 403),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("connection should have been rejected"),
    }
}

#[tokio::test]
#[serial]
async fn app_level_ping_gets_pong() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app).await;

    let path = format!("classrooms/{}/attendance", s.classroom.id);
    let (mut ws, _) = connect_ws(&addr.to_string(), &path, &s.student_token)
        .await
        .expect("connect");

    ws.send(Message::Text(json!({ "type": "ping" }).to_string().into()))
        .await
        .unwrap();
    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["topic"], format!("attendance:classroom:{}", s.classroom.id));

    ws.close(None).await.unwrap();
}

#[tokio::test]
#[serial]
async fn presence_lists_connected_users() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app).await;
    let path = format!("classrooms/{}/attendance", s.classroom.id);

    let (mut teacher_ws, _) = connect_ws(&addr.to_string(), &path, &s.teacher_token)
        .await
        .unwrap();
    ready(&mut teacher_ws).await;
    let (mut student_ws, _) = connect_ws(&addr.to_string(), &path, &s.student_token)
        .await
        .unwrap();

    let reply = ready(&mut student_ws).await;
    let mut ids: Vec<i64> = reply["payload"]["user_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    let mut expected = vec![s.teacher.id, s.student.id];
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[tokio::test]
#[serial]
async fn classroom_topic_sees_start_and_close() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app.clone()).await;

    let path = format!("classrooms/{}/attendance", s.classroom.id);
    let (mut ws, _) = connect_ws(&addr.to_string(), &path, &s.student_token)
        .await
        .unwrap();
    ready(&mut ws).await;

    let base = format!("/api/classrooms/{}/attendance/sessions", s.classroom.id);
    let (_, started) = send(
        &app,
        "POST",
        &base,
        Some(&s.teacher_token),
        Some(json!({ "lat": 12.97, "lng": 77.59 })),
    )
    .await;
    let sid = started["data"]["session"]["id"].as_i64().unwrap();

    let event = next_json(&mut ws).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["event"], "attendance.session_started");
    assert_eq!(event["payload"]["session_id"], sid);
    assert_eq!(event["payload"]["classroom_id"], s.classroom.id);

    send(
        &app,
        "POST",
        &format!("{base}/{sid}/close"),
        Some(&s.teacher_token),
        None,
    )
    .await;

    let event = next_json(&mut ws).await;
    assert_eq!(event["event"], "attendance.session_closed");
    assert_eq!(event["payload"]["session_id"], sid);
    assert_eq!(event["payload"]["reason"], "MANUAL");
}

#[tokio::test]
#[serial]
async fn session_topic_streams_marks_to_teacher() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app.clone()).await;

    let base = format!("/api/classrooms/{}/attendance/sessions", s.classroom.id);
    let (_, started) = send(
        &app,
        "POST",
        &base,
        Some(&s.teacher_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    let sid = started["data"]["session"]["id"].as_i64().unwrap();

    let path = format!("attendance/sessions/{sid}");
    match connect_ws(&addr.to_string(), &path, &s.student_token).await {
        Err(Error::Http(resp)) => assert_eq!(resp.status(), 403),
        other => panic!("student should not watch marks: {:?}", other.map(|_| ())),
    }

    let (mut ws, _) = connect_ws(&addr.to_string(), &path, &s.teacher_token)
        .await
        .unwrap();
    ready(&mut ws).await;

    send(
        &app,
        "POST",
        &format!("{base}/{sid}/mark"),
        Some(&s.student_token),
        Some(json!({ "lat": 0.0, "lng": 0.0002 })),
    )
    .await;

    let event = next_json(&mut ws).await;
    assert_eq!(event["event"], "attendance.marked");
    assert_eq!(event["payload"]["student_id"], s.student.id);
    assert_eq!(event["payload"]["student_name"], "Arjun");
    assert_eq!(event["payload"]["status"], "PRESENT");
}

#[tokio::test]
#[serial]
async fn session_topic_is_released_after_teacher_disconnects() {
    let (app, state) = make_test_app().await;
    let s = seed(&state).await;
    let addr = spawn_server(app.clone()).await;

    let base = format!("/api/classrooms/{}/attendance/sessions", s.classroom.id);
    let (_, started) = send(
        &app,
        "POST",
        &base,
        Some(&s.teacher_token),
        Some(json!({ "lat": 0.0, "lng": 0.0 })),
    )
    .await;
    let sid = started["data"]["session"]["id"].as_i64().unwrap();
    let topic = format!("attendance:session:{sid}");

    let (mut ws, _) = connect_ws(&addr.to_string(), &format!("attendance/sessions/{sid}"), &s.teacher_token)
        .await
        .unwrap();
    ready(&mut ws).await;
    assert!(state.ws_clone().has_topic(&topic).await);

    ws.close(None).await.unwrap();

    let manager = state.ws_clone();
    let released = timeout(Duration::from_secs(2), async {
        while manager.has_topic(&topic).await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "topic {topic} still registered");
    assert!(manager.present_users(&topic).await.is_empty());
}
