use std::sync::Arc;
use std::time::Duration;

use attention_session::config::Config;
use attention_session::logging::init_tracing;
use attention_session::{
    AttentionEvent, AttentionPipeline, NoDetector, Scene, SceneHandle, SyntheticSource,
};

/// Scene rotation for the demo camera: (scene, seconds)
const DEMO_SCRIPT: &[(Scene, u64)] = &[
    (Scene::Lit, 5),
    (Scene::Dark, 15),
    (Scene::Lit, 5),
    (Scene::Flicker, 15),
    (Scene::Failing, 3),
];

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, config.file_logs.as_ref());

    for rejected in &config.rejected {
        tracing::warn!(error = %rejected, "ignoring environment override");
    }

    let pipeline = match AttentionPipeline::new(config.attention.clone(), Arc::new(NoDetector)) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!(error = %e, "invalid attention configuration");
            std::process::exit(1);
        }
    };
    pipeline.set_enabled(config.enabled);

    let mut events = pipeline.subscribe();
    let scene = SceneHandle::new(Scene::Lit);
    let source = SyntheticSource::new(
        scene.clone(),
        config.attention.sampler.frame_width * 2,
        config.attention.sampler.frame_height * 2,
    );

    if let Err(e) = pipeline.start(Some(Box::new(source))) {
        tracing::warn!(error = %e, "attention session not started");
    }

    let director = tokio::spawn(async move {
        for (next, seconds) in DEMO_SCRIPT.iter().cycle() {
            tracing::info!(scene = ?next, seconds, "demo scene");
            scene.set(*next);
            tokio::time::sleep(Duration::from_secs(*seconds)).await;
        }
    });

    let printer = tokio::spawn(async move {
        while let Ok(envelope) = events.recv().await {
            if let AttentionEvent::StatusChanged(p) = &envelope.event {
                tracing::info!(
                    status = %p.state.status,
                    confidence = p.state.confidence,
                    face_detection_rate = p.score.face_detection_rate,
                    avg_motion = p.score.avg_motion,
                    "status event"
                );
            }
        }
    });

    shutdown_signal().await;

    tracing::info!("shutdown requested, stopping attention session");
    director.abort();
    let stats = pipeline.stats();
    pipeline.stop();
    tracing::info!(
        samples = stats.samples,
        transitions = stats.transitions,
        "attention session closed"
    );
    drop(pipeline);
    printer.abort();

    tracing::info!("Graceful shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
