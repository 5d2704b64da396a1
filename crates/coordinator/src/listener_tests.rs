// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use renderq_core::{FakeClock, Payload};
use renderq_plugins::reference_registry;
use renderq_wire::Response;
use tokio::io::split;

fn test_ctx() -> CoordinatorCtx<FakeClock> {
    CoordinatorCtx { store: Store::in_memory(), registry: Arc::new(reference_registry()), events: EventBus::new(), clock: FakeClock::new() }
}

fn ffmpeg_payload() -> Payload {
    let mut p = Payload::new();
    p.insert("input_pattern", "render_%04d.exr");
    p.insert("output_path", "out.mp4");
    p
}

#[tokio::test]
async fn ping_gets_a_pong() {
    let ctx = test_ctx();
    assert_eq!(dispatch(Request::Ping, &ctx).await, Response::Pong);
}

#[tokio::test]
async fn hello_echoes_the_protocol_version() {
    let ctx = test_ctx();
    let response = dispatch(Request::Hello { version: "0.1".into() }, &ctx).await;
    assert_eq!(response, Response::Hello { version: PROTOCOL_VERSION.to_string() });
}

#[tokio::test]
async fn submit_then_get_job_round_trips_through_the_wire_dto() {
    let ctx = test_ctx();
    let submit = Request::SubmitJob {
        name: "shot_010".into(),
        plugin: "ffmpeg".into(),
        priority: None,
        pool: None,
        plugin_data: ffmpeg_payload(),
        metadata: Payload::new(),
        dependent_on: Vec::new(),
    };
    let job = match dispatch(submit, &ctx).await {
        Response::Job { job } => *job,
        other => panic!("unexpected response: {other:?}"),
    };
    assert_eq!(job.name, "shot_010");
    assert_eq!(job.tasks.len(), 1);

    let fetched = match dispatch(Request::GetJob { id: job.id }, &ctx).await {
        Response::Job { job } => *job,
        other => panic!("unexpected response: {other:?}"),
    };
    assert_eq!(fetched.id, job.id);
}

#[tokio::test]
async fn submit_job_with_an_unknown_plugin_is_an_error_response() {
    let ctx = test_ctx();
    let submit = Request::SubmitJob {
        name: "shot_010".into(),
        plugin: "no-such-plugin".into(),
        priority: None,
        pool: None,
        plugin_data: Payload::new(),
        metadata: Payload::new(),
        dependent_on: Vec::new(),
    };
    match dispatch(submit, &ctx).await {
        Response::Error { message } => assert!(message.contains("unknown plugin")),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn list_jobs_filters_by_plugin() {
    let ctx = test_ctx();
    dispatch(
        Request::SubmitJob {
            name: "ffmpeg-job".into(),
            plugin: "ffmpeg".into(),
            priority: None,
            pool: None,
            plugin_data: ffmpeg_payload(),
            metadata: Payload::new(),
            dependent_on: Vec::new(),
        },
        &ctx,
    )
    .await;

    let jobs = match dispatch(Request::ListJobs { pool: None, status: None, plugin: Some("aftereffects".into()) }, &ctx).await {
        Response::Jobs { jobs } => jobs,
        other => panic!("unexpected response: {other:?}"),
    };
    assert!(jobs.is_empty());

    let jobs = match dispatch(Request::ListJobs { pool: None, status: None, plugin: Some("ffmpeg".into()) }, &ctx).await {
        Response::Jobs { jobs } => jobs,
        other => panic!("unexpected response: {other:?}"),
    };
    assert_eq!(jobs.len(), 1);
}

#[tokio::test]
async fn cancel_a_pending_job_succeeds() {
    let ctx = test_ctx();
    let job = match dispatch(
        Request::SubmitJob {
            name: "shot".into(),
            plugin: "ffmpeg".into(),
            priority: None,
            pool: None,
            plugin_data: ffmpeg_payload(),
            metadata: Payload::new(),
            dependent_on: Vec::new(),
        },
        &ctx,
    )
    .await
    {
        Response::Job { job } => *job,
        other => panic!("unexpected response: {other:?}"),
    };

    match dispatch(Request::CancelJob { id: job.id }, &ctx).await {
        Response::Job { job } => assert_eq!(job.status, renderq_core::JobStatus::Cancelled),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn full_worker_lifecycle_through_dispatch() {
    let ctx = test_ctx();
    let worker = match dispatch(
        Request::RegisterWorker {
            hostname: "render-01".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            ip_address: "10.0.0.5".into(),
            pools: vec!["default".into()],
            capabilities: Vec::new(),
            cpu_cores: 8,
            memory_total_mb: 16_000,
            version: "1.0.0".into(),
        },
        &ctx,
    )
    .await
    {
        Response::Worker { worker } => *worker,
        other => panic!("unexpected response: {other:?}"),
    };

    dispatch(
        Request::SubmitJob {
            name: "shot".into(),
            plugin: "ffmpeg".into(),
            priority: None,
            pool: None,
            plugin_data: ffmpeg_payload(),
            metadata: Payload::new(),
            dependent_on: Vec::new(),
        },
        &ctx,
    )
    .await;

    let task = match dispatch(Request::PullTask { worker_id: worker.id }, &ctx).await {
        Response::Task { task } => *task,
        other => panic!("unexpected response: {other:?}"),
    };

    match dispatch(Request::StartTask { task_id: task.id }, &ctx).await {
        Response::Task { task } => assert_eq!(task.status, renderq_core::TaskStatus::Running),
        other => panic!("unexpected response: {other:?}"),
    }

    match dispatch(Request::CompleteTask { task_id: task.id, exit_code: 0 }, &ctx).await {
        Response::Task { task } => assert_eq!(task.status, renderq_core::TaskStatus::Completed),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn pull_task_with_nothing_eligible_returns_no_task() {
    let ctx = test_ctx();
    let worker = match dispatch(
        Request::RegisterWorker {
            hostname: "render-01".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            ip_address: "10.0.0.5".into(),
            pools: vec!["default".into()],
            capabilities: Vec::new(),
            cpu_cores: 8,
            memory_total_mb: 16_000,
            version: "1.0.0".into(),
        },
        &ctx,
    )
    .await
    {
        Response::Worker { worker } => *worker,
        other => panic!("unexpected response: {other:?}"),
    };

    let response = dispatch(Request::PullTask { worker_id: worker.id }, &ctx).await;
    assert_eq!(response, Response::NoTask);
}

#[tokio::test]
async fn list_plugins_reports_both_reference_plugins_with_their_schema() {
    let ctx = test_ctx();
    let plugins = match dispatch(Request::ListPlugins, &ctx).await {
        Response::Plugins { plugins } => plugins,
        other => panic!("unexpected response: {other:?}"),
    };
    let aftereffects = plugins.iter().find(|p| p.name == "aftereffects").expect("aftereffects plugin");
    assert!(aftereffects.parameters.contains_key("mode"));
}

#[tokio::test]
async fn get_stats_reflects_a_submitted_job() {
    let ctx = test_ctx();
    dispatch(
        Request::SubmitJob {
            name: "shot".into(),
            plugin: "ffmpeg".into(),
            priority: None,
            pool: None,
            plugin_data: ffmpeg_payload(),
            metadata: Payload::new(),
            dependent_on: Vec::new(),
        },
        &ctx,
    )
    .await;

    match dispatch(Request::GetStats, &ctx).await {
        Response::Stats { stats } => assert_eq!(stats.jobs_queued, 1),
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn a_connection_that_subscribes_gets_upgraded_to_an_event_stream() {
    let ctx = test_ctx();
    let (mut client, server) = tokio::io::duplex(4096);
    let ctx_for_task = ctx.clone();
    let handle = tokio::spawn(async move {
        let (reader, writer) = split(server);
        handle_connection(reader, writer, ctx_for_task).await;
    });

    renderq_wire::write_request(&mut client, &Request::SubscribeEvents).await.expect("write subscribe");
    let response = renderq_wire::read_response(&mut client).await.expect("read subscribed");
    assert_eq!(response, Response::Subscribed);

    ctx.events.publish(renderq_core::Event::JobSubmitted { job_id: renderq_core::JobId::new(), timestamp: 1 });
    let envelope = renderq_wire::read_event(&mut client).await.expect("read event");
    assert_eq!(envelope.event_type, "job.submitted");

    drop(client);
    let _ = tokio::time::timeout(std::time::Duration::from_secs(1), handle).await;
}
