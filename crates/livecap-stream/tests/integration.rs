use livecap_core::{
    PumpPolicy, RecognitionResult, RecognitionSettings, ResultFrame, SessionIdentity, StreamError,
    TranscriptAlternative,
};
use livecap_stream::{NullTransport, TranscribeSession};
use std::io::Cursor;

fn make_session(project_id: &str) -> TranscribeSession {
    TranscribeSession::new(
        SessionIdentity::new(project_id),
        RecognitionSettings::default(),
        PumpPolicy::default(),
    )
}

fn single_result_frame(alternatives: &[&str], is_final: bool) -> ResultFrame {
    ResultFrame {
        results: vec![RecognitionResult {
            alternatives: alternatives
                .iter()
                .map(|t| TranscriptAlternative {
                    transcript: t.to_string(),
                    confidence: 0.8,
                })
                .collect(),
            is_final,
        }],
    }
}

#[tokio::test]
async fn test_full_session_streams_file_and_prints_finals() {
    let transport = NullTransport::new();
    transport.push_frame(single_result_frame(&["hello world", "hallo world"], false));
    transport.push_frame(single_result_frame(&["hello world", "hallo world"], true));

    let mut session = make_session("demo-project");
    let mut rx = session.take_result_receiver().unwrap();

    let audio: Vec<u8> = (0..2048u32).map(|i| (i % 256) as u8).collect();
    let summary = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        session.run(&transport, Cursor::new(audio.clone())),
    )
    .await
    .expect("session timed out")
    .expect("session failed");

    // 2048 bytes => exactly two 1024-byte frames, then one half-close.
    assert_eq!(summary.frames_sent, 2);
    assert_eq!(summary.bytes_sent, 2048);
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], audio[..1024]);
    assert_eq!(frames[1], audio[1024..]);
    assert_eq!(transport.close_count(), 1);

    // Only the final frame produced output, and only its top alternative.
    assert_eq!(summary.finals_emitted, 1);
    let transcript = rx.recv().await.unwrap();
    assert_eq!(transcript.text, "hello world");
    assert!(transcript.is_final);
    drop(session);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_config_only_session_half_closes_once() {
    let transport = NullTransport::new();
    let mut session = make_session("demo-project");

    let summary = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        session.run(&transport, Cursor::new(Vec::new())),
    )
    .await
    .expect("session timed out")
    .expect("session failed");

    assert_eq!(summary.frames_sent, 0);
    assert!(transport.sent_frames().is_empty());
    assert_eq!(transport.close_count(), 1);
    assert_eq!(
        transport.opened_recognizers(),
        vec!["projects/demo-project/locations/global/recognizers/_"],
    );
}

#[tokio::test]
async fn test_receive_error_terminates_session() {
    let transport = NullTransport::new();
    transport.push_frame(single_result_frame(&["partial"], true));
    transport.push_error(StreamError::Receive("connection reset".to_string()));

    let mut session = make_session("demo-project");
    let mut rx = session.take_result_receiver().unwrap();

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(2),
        session.run(&transport, Cursor::new(vec![0u8; 512])),
    )
    .await
    .expect("session timed out");

    match result {
        Err(StreamError::Receive(_)) => {}
        other => panic!("expected Receive error, got {other:?}"),
    }

    // The result delivered before the failure was still surfaced.
    assert_eq!(rx.recv().await.unwrap().text, "partial");
}

#[tokio::test]
async fn test_session_identity_tags_every_open() {
    let transport = NullTransport::new();
    let mut session = make_session("proj-a");
    session
        .run(&transport, Cursor::new(Vec::new()))
        .await
        .unwrap();

    let mut other = make_session("proj-b");
    other
        .run(&transport, Cursor::new(Vec::new()))
        .await
        .unwrap();

    assert_eq!(
        transport.opened_recognizers(),
        vec![
            "projects/proj-a/locations/global/recognizers/_",
            "projects/proj-b/locations/global/recognizers/_",
        ],
    );
}
