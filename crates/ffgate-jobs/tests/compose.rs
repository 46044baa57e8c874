//! Compose and single-transcode strategies.

mod common;

use common::{duration_info, Call, FakeEngine, Harness};
use ffgate_jobs::{JobError, JobOutcome};

fn only_transcode_args(harness: &Harness) -> Vec<String> {
    let transcodes = harness.engine.transcodes();
    assert_eq!(transcodes.len(), 1);
    match &transcodes[0] {
        Call::Transcode { args, .. } => args.clone(),
        Call::Probe(_) => unreachable!(),
    }
}

#[tokio::test]
async fn test_audio_image_loops_image_first() {
    let harness = Harness::new(FakeEngine::new());
    let job = harness
        .job("audio-image-mp4", &[("song.mp3", "audio/mpeg"), ("cover.png", "image/png")])
        .await;

    let outcome = harness.coordinator.run(job).await.unwrap();
    assert!(matches!(outcome, JobOutcome::Artifact(_)));

    let args = only_transcode_args(&harness);
    let loop_at = args.iter().position(|a| a == "-loop").unwrap();
    assert_eq!(args[loop_at + 1], "1");
    assert_eq!(args[loop_at + 2], "-i");
    assert!(args[loop_at + 3].ends_with("cover.png"));
    assert_eq!(args[loop_at + 4], "-i");
    assert!(args[loop_at + 5].ends_with("song.mp3"));
    assert_eq!(args.iter().filter(|a| *a == "-shortest").count(), 1);
}

#[tokio::test]
async fn test_vocals_mix_schedule() {
    let engine = FakeEngine::new().with_probe("take_vocals.wav", duration_info(12.5, 0.0));
    let harness = Harness::new(engine);
    let job = harness
        .job(
            "vocals-mix-mp3",
            &[("take_vocals.wav", "audio/wav"), ("instrumental.mp3", "audio/mpeg")],
        )
        .await;

    harness.coordinator.run(job).await.unwrap();

    let calls = harness.engine.calls();
    assert!(matches!(&calls[0], Call::Probe(name) if name == "take_vocals.wav"));

    let args = only_transcode_args(&harness);
    let inputs: Vec<&String> = args
        .windows(2)
        .filter(|w| w[0] == "-i")
        .map(|w| &w[1])
        .collect();
    assert!(inputs[0].ends_with("instrumental.mp3"));
    assert!(inputs[1].ends_with("take_vocals.wav"));

    let graph = args
        .iter()
        .position(|a| a == "-filter_complex")
        .map(|i| args[i + 1].clone())
        .unwrap();
    assert!(graph.contains("afade=t=in:st=0:d=5"));
    assert!(graph.contains("adelay=10000:all=1"));
    assert!(graph.contains("amix=inputs=2:duration=longest"));
    assert!(graph.contains("afade=t=out:st=22.5:d=15"));
    assert!(graph.contains("atrim=0:37.5"));
    assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "[out]"));
    assert!(args.windows(2).any(|w| w[0] == "-t" && w[1] == "37.500"));
}

#[tokio::test]
async fn test_missing_role_lists_received_files() {
    let harness = Harness::new(FakeEngine::new());
    let job = harness
        .job("audio-image-mp4", &[("a.mp3", "audio/mpeg"), ("b.mp3", "audio/mpeg")])
        .await;

    let err = harness.coordinator.run(job).await.unwrap_err();

    assert!(err.is_client_error());
    let JobError::RoleResolution { received, .. } = &err else {
        panic!("expected a role resolution error, got {err:?}");
    };
    let names: Vec<&str> = received.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a.mp3", "b.mp3"]);
    assert!(received.iter().all(|r| r.mime_type == "audio/mpeg"));
    assert!(harness.engine.calls().is_empty());
    assert!(harness.remaining().is_empty());
}

#[tokio::test]
async fn test_transcode_releases_input_and_keeps_artifact() {
    let harness = Harness::new(FakeEngine::new());
    let job = harness.job("mp3", &[("voice-memo.m4a", "audio/mp4")]).await;

    let outcome = harness.coordinator.run(job).await.unwrap();
    let JobOutcome::Artifact(artifact) = outcome else {
        panic!("expected an artifact");
    };

    assert!(artifact.path().extension().is_some_and(|e| e == "mp3"));
    assert!(artifact.path().exists());
    assert_eq!(harness.remaining().len(), 1);

    let args = only_transcode_args(&harness);
    assert!(args.windows(2).any(|w| w[0] == "-codec:a" && w[1] == "libmp3lame"));

    // Dropping without completing still removes the artifact
    drop(artifact);
    assert!(harness.remaining().is_empty());
}

#[tokio::test]
async fn test_transcode_engine_failure_cleans_up() {
    let harness = Harness::new(FakeEngine::new().failing("clip.mov"));
    let job = harness.job("mp4", &[("clip.mov", "video/quicktime")]).await;

    let err = harness.coordinator.run(job).await.unwrap_err();

    assert_eq!(err.code(), "engine_failure");
    assert!(harness.remaining().is_empty());
}

#[tokio::test]
async fn test_image_named_like_a_backing_track_is_still_the_image() {
    let harness = Harness::new(FakeEngine::new());
    let job = harness
        .job("audio-image-mp4", &[("song.mp3", "audio/mpeg"), ("bg.jpg", "image/jpeg")])
        .await;

    let outcome = harness.coordinator.run(job).await.unwrap();
    assert!(matches!(outcome, JobOutcome::Artifact(_)));

    let args = only_transcode_args(&harness);
    let loop_at = args.iter().position(|a| a == "-loop").unwrap();
    assert!(args[loop_at + 3].ends_with("bg.jpg"));
}

#[tokio::test]
async fn test_audio_image_engine_failure_cleans_up() {
    let harness = Harness::new(FakeEngine::new().failing("cover.png"));
    let job = harness
        .job("audio-image-mp4", &[("song.mp3", "audio/mpeg"), ("cover.png", "image/png")])
        .await;

    let err = harness.coordinator.run(job).await.unwrap_err();

    assert_eq!(err.code(), "engine_failure");
    assert_eq!(harness.engine.transcodes().len(), 1);
    assert!(harness.remaining().is_empty());
}

#[tokio::test]
async fn test_vocals_mix_engine_failure_cleans_up() {
    let engine = FakeEngine::new()
        .with_probe("take_vocals.wav", duration_info(12.5, 0.0))
        .failing("instrumental.mp3");
    let harness = Harness::new(engine);
    let job = harness
        .job(
            "vocals-mix-mp3",
            &[("take_vocals.wav", "audio/wav"), ("instrumental.mp3", "audio/mpeg")],
        )
        .await;

    let err = harness.coordinator.run(job).await.unwrap_err();

    assert_eq!(err.code(), "engine_failure");
    assert!(harness.remaining().is_empty());
}

#[tokio::test]
async fn test_unreadable_vocals_skip_the_mix() {
    let harness = Harness::new(FakeEngine::new().failing("take_vocals.wav"));
    let job = harness
        .job(
            "vocals-mix-mp3",
            &[("take_vocals.wav", "audio/wav"), ("instrumental.mp3", "audio/mpeg")],
        )
        .await;

    let err = harness.coordinator.run(job).await.unwrap_err();

    assert!(matches!(err, JobError::ProbeFailure(_)));
    assert!(harness.engine.transcodes().is_empty());
    assert!(harness.remaining().is_empty());
}
