mod common;

use common::{document, wait_for_commands, RecordingSink};
use lightbrush_control::{
    LedCommand, LedDispatcher, LedSink, MultiplierState, PlaybackService, PlaybackSession,
    SessionHandle,
};
use lightbrush_core::{beacon, PlaybackSettings};
use lightbrush_io::TrajectoryDocument;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn session(colors: &[[f64; 3]], gradients: &[f64]) -> PlaybackSession {
    let text = document(colors, gradients).to_string();
    let doc = TrajectoryDocument::from_json_str(&text).unwrap();
    PlaybackSession::from_document(&doc, None, "test.json")
}

fn settings() -> PlaybackSettings {
    PlaybackSettings {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..Default::default()
    }
}

struct Running {
    addr: SocketAddr,
    session: SessionHandle,
    multiplier: Arc<MultiplierState>,
    sink: Arc<RecordingSink>,
}

async fn start(initial: PlaybackSession) -> Running {
    let sink = RecordingSink::new();
    let session = SessionHandle::new(initial);
    let multiplier = Arc::new(MultiplierState::new(1.0));
    let service = PlaybackService::bind(
        &settings(),
        session.clone(),
        multiplier.clone(),
        sink.clone() as Arc<dyn LedSink>,
    )
    .await
    .unwrap();
    let addr = service.local_addr().unwrap();
    tokio::spawn(service.run());
    Running {
        addr,
        session,
        multiplier,
        sink,
    }
}

async fn send(stream: &mut TcpStream, index: u32) {
    stream.write_all(&beacon::encode(index)).await.unwrap();
}

#[tokio::test]
async fn test_beacons_dispatch_in_order() {
    let colors: Vec<[f64; 3]> = (0..10).map(|i| [i as f64 * 20.0, 0.0, 255.0]).collect();
    let gradients: Vec<f64> = (0..10).map(|i| i as f64 / 9.0).collect();
    let expected_session = session(&colors, &gradients);
    let running = start(session(&colors, &gradients)).await;

    let mut stream = TcpStream::connect(running.addr).await.unwrap();
    for i in 0..10 {
        send(&mut stream, i).await;
    }

    assert!(wait_for_commands(&running.sink, 10).await);

    let curve = Default::default();
    let expected: Vec<LedCommand> = (0..10)
        .map(|i| expected_session.command(i, 1.0, &curve).unwrap())
        .collect();
    assert_eq!(running.sink.commands().await, expected);
    assert_eq!(running.sink.commands().await[3].rgb, [60, 0, 255]);
}

#[tokio::test]
async fn test_initial_brightness_is_set() {
    let running = start(session(&[[0.0, 0.0, 0.0]], &[0.0])).await;
    assert_eq!(*running.sink.brightness.lock().await, vec![255]);
}

#[tokio::test]
async fn test_out_of_range_beacon_closes_connection() {
    let running = start(session(&[[255.0, 0.0, 0.0], [0.0, 255.0, 0.0]], &[1.0, 1.0])).await;

    let mut stream = TcpStream::connect(running.addr).await.unwrap();
    send(&mut stream, 0).await;
    send(&mut stream, 999).await;

    // Service hangs up without answering
    let mut rest = Vec::new();
    let _ = stream.read_to_end(&mut rest).await;
    assert!(rest.is_empty());

    assert!(wait_for_commands(&running.sink, 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(running.sink.commands().await.len(), 1);

    // The listener keeps accepting
    let mut stream = TcpStream::connect(running.addr).await.unwrap();
    send(&mut stream, 1).await;
    assert!(wait_for_commands(&running.sink, 2).await);
}

#[tokio::test]
async fn test_second_connection_waits_for_the_first() {
    let running = start(session(&[[255.0, 0.0, 0.0], [0.0, 255.0, 0.0]], &[1.0, 1.0])).await;

    let mut first = TcpStream::connect(running.addr).await.unwrap();
    send(&mut first, 0).await;
    assert!(wait_for_commands(&running.sink, 1).await);

    // Accepted by the kernel, but not read while the first is open
    let mut second = TcpStream::connect(running.addr).await.unwrap();
    send(&mut second, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(running.sink.commands().await.len(), 1);

    send(&mut first, 0).await;
    first.shutdown().await.unwrap();
    drop(first);

    assert!(wait_for_commands(&running.sink, 3).await);
    let rgb: Vec<[u8; 3]> = running
        .sink
        .commands()
        .await
        .iter()
        .map(|c| c.rgb)
        .collect();
    assert_eq!(rgb, vec![[255, 0, 0], [255, 0, 0], [0, 255, 0]]);
}

#[tokio::test]
async fn test_truncated_frame_is_not_dispatched() {
    let running = start(session(&[[255.0, 0.0, 0.0]], &[1.0])).await;

    let mut stream = TcpStream::connect(running.addr).await.unwrap();
    stream.write_all(&[0, 0]).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut rest = Vec::new();
    let _ = stream.read_to_end(&mut rest).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(running.sink.commands().await.is_empty());
}

#[tokio::test]
async fn test_multiplier_change_applies_to_next_beacon() {
    let running = start(session(&[[255.0, 255.0, 255.0]], &[1.0])).await;
    let mut stream = TcpStream::connect(running.addr).await.unwrap();

    send(&mut stream, 0).await;
    assert!(wait_for_commands(&running.sink, 1).await);

    running.multiplier.set(0.5);
    send(&mut stream, 0).await;
    assert!(wait_for_commands(&running.sink, 2).await);

    let commands = running.sink.commands().await;
    assert_eq!(commands[0].brightness, 255);
    assert_eq!(commands[1].brightness, 128);
}

#[tokio::test]
async fn test_session_swap_applies_to_next_beacon() {
    let running = start(session(&[[255.0, 0.0, 0.0]], &[1.0])).await;
    let mut stream = TcpStream::connect(running.addr).await.unwrap();

    send(&mut stream, 0).await;
    assert!(wait_for_commands(&running.sink, 1).await);

    running.session.swap(session(
        &[[0.0, 0.0, 255.0], [0.0, 0.0, 255.0], [0.0, 255.0, 0.0]],
        &[1.0, 1.0, 1.0],
    ));
    send(&mut stream, 2).await;
    assert!(wait_for_commands(&running.sink, 2).await);
    assert_eq!(running.sink.commands().await[1].rgb, [0, 255, 0]);
}

#[tokio::test]
async fn test_full_queue_drops_new_commands() {
    let sink = RecordingSink::slow(Duration::from_millis(100));
    let (dispatcher, _task) = LedDispatcher::spawn(sink.clone() as Arc<dyn LedSink>, 1);

    // Nothing drains the queue until this task yields
    let command = LedCommand {
        rgb: [1, 2, 3],
        brightness: 4,
    };
    let accepted = (0..5).filter(|_| dispatcher.dispatch(command)).count();
    assert_eq!(accepted, 1);

    assert!(wait_for_commands(&sink, 1).await);
    assert_eq!(sink.commands().await, vec![command]);
}
