// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket listener (SPEC_FULL §4): a `TcpListener` plus an optional
//! same-host `UnixListener`, both speaking the same framed-JSON
//! request/response protocol and sharing one dispatch path. No auth
//! (out of scope, SPEC_FULL §6) and no disconnect-detection race, since
//! RenderQ's handlers are all fast, non-blocking Store calls rather than
//! subprocess invocations that can run long enough to outlive an
//! impatient client.

use std::sync::Arc;

use renderq_core::{Clock, Task};
use renderq_plugins::PluginRegistry;
use renderq_store::Store;
use renderq_wire::{Request, Response};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tracing::{debug, error, info, warn};

use crate::broadcaster;
use crate::error::CoordinatorError;
use crate::events::EventBus;
use crate::{lifecycle, submission, worker_protocol};

const PROTOCOL_VERSION: &str = "1.0";

/// Shared handle every connection handler dispatches against. Cheap to
/// clone — every field is itself a shared handle ([`Store`], [`EventBus`])
/// or reference-counted ([`PluginRegistry`]).
pub struct CoordinatorCtx<C: Clock> {
    pub store: Store,
    pub registry: Arc<PluginRegistry>,
    pub events: EventBus,
    pub clock: C,
}

impl<C: Clock> Clone for CoordinatorCtx<C> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), registry: Arc::clone(&self.registry), events: self.events.clone(), clock: self.clock.clone() }
    }
}

/// Accepts connections on a `TcpListener` and, optionally, a same-host
/// `UnixListener`, spawning one handler task per connection.
pub struct Listener<C: Clock + 'static> {
    tcp: TcpListener,
    unix: Option<UnixListener>,
    ctx: CoordinatorCtx<C>,
}

impl<C: Clock + 'static> Listener<C> {
    pub fn new(tcp: TcpListener, unix: Option<UnixListener>, ctx: CoordinatorCtx<C>) -> Self {
        Self { tcp, unix, ctx }
    }

    pub async fn run(self) {
        match self.unix {
            Some(unix) => self.run_dual(unix).await,
            None => self.run_tcp_only().await,
        }
    }

    async fn run_tcp_only(self) {
        loop {
            match self.tcp.accept().await {
                Ok((stream, addr)) => {
                    debug!(%addr, "tcp connection accepted");
                    let ctx = self.ctx.clone();
                    tokio::spawn(async move {
                        let (reader, writer) = stream.into_split();
                        handle_connection(reader, writer, ctx).await;
                    });
                }
                Err(e) => error!(error = %e, "tcp accept error"),
            }
        }
    }

    async fn run_dual(self, unix: UnixListener) {
        loop {
            tokio::select! {
                result = self.tcp.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!(%addr, "tcp connection accepted");
                            let ctx = self.ctx.clone();
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                handle_connection(reader, writer, ctx).await;
                            });
                        }
                        Err(e) => error!(error = %e, "tcp accept error"),
                    }
                }
                result = unix.accept() => {
                    match result {
                        Ok((stream, _)) => {
                            debug!("unix connection accepted");
                            let ctx = self.ctx.clone();
                            tokio::spawn(async move {
                                let (reader, writer) = stream.into_split();
                                handle_connection(reader, writer, ctx).await;
                            });
                        }
                        Err(e) => error!(error = %e, "unix accept error"),
                    }
                }
            }
        }
    }
}

/// Handle one connection end to end. `SubscribeEvents` upgrades the
/// connection before the ordinary reply is ever written; every other
/// request gets exactly one reply and the connection then closes, matching
/// a client that opens fresh per call.
async fn handle_connection<R, W, C>(mut reader: R, mut writer: W, ctx: CoordinatorCtx<C>)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    C: Clock,
{
    let request = match renderq_wire::read_request(&mut reader).await {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "connection closed before a request arrived");
            return;
        }
    };

    debug!(?request, "received request");

    if matches!(request, Request::SubscribeEvents) {
        if renderq_wire::write_response(&mut writer, &Response::Subscribed).await.is_err() {
            return;
        }
        broadcaster::stream_events(&ctx.events, reader, writer).await;
        return;
    }

    let response = dispatch(request, &ctx).await;
    if let Err(e) = renderq_wire::write_response(&mut writer, &response).await {
        warn!(error = %e, "failed to write response");
    }
}

async fn dispatch<C: Clock>(request: Request, ctx: &CoordinatorCtx<C>) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version: _ } => Response::Hello { version: PROTOCOL_VERSION.to_string() },

        Request::SubmitJob { name, plugin, priority, pool, plugin_data, metadata, dependent_on } => {
            let params = submission::SubmitJobParams { name, plugin, priority, pool, plugin_data, metadata, dependent_on };
            match submission::submit_job(&ctx.store, &ctx.registry, &ctx.events, &ctx.clock, params) {
                Ok(job) => respond_job(ctx, &job),
                Err(e) => error_response(e),
            }
        }

        Request::ListJobs { pool, status, plugin } => {
            let jobs = lifecycle::list_jobs(&ctx.store, status, usize::MAX, 0);
            let filtered = jobs
                .into_iter()
                .filter(|j| pool.as_deref().map_or(true, |p| j.pool == p))
                .filter(|j| plugin.as_deref().map_or(true, |p| j.plugin == p))
                .map(|j| renderq_wire::JobSummary::from(&j))
                .collect();
            Response::Jobs { jobs: filtered }
        }

        Request::GetJob { id } => match lifecycle::get_job(&ctx.store, &id) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::CancelJob { id } => match lifecycle::cancel_job(&ctx.store, &ctx.events, &ctx.clock, &id) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::SuspendJob { id } => match lifecycle::suspend_job(&ctx.store, &ctx.events, &ctx.clock, &id) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::ResumeJob { id } => match lifecycle::resume_job(&ctx.store, &ctx.events, &ctx.clock, &id) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::RetryJob { id } => match lifecycle::retry_job(&ctx.store, &ctx.clock, &id) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::DeleteJob { id } => match lifecycle::delete_job(&ctx.store, &id) {
            Ok(()) => Response::JobDeleted { id },
            Err(e) => error_response(e),
        },

        Request::SetJobPriority { id, priority } => match lifecycle::set_job_priority(&ctx.store, &id, priority) {
            Ok(job) => respond_job(ctx, &job),
            Err(e) => error_response(e),
        },

        Request::ListWorkers => {
            let workers = lifecycle::list_workers(&ctx.store).iter().map(renderq_wire::WorkerSummary::from).collect();
            Response::Workers { workers }
        }

        Request::GetWorker { id } => match lifecycle::get_worker(&ctx.store, &id) {
            Ok(worker) => Response::Worker { worker: Box::new(renderq_wire::WorkerSummary::from(&worker)) },
            Err(e) => error_response(e),
        },

        Request::DisableWorker { id } => match lifecycle::disable_worker(&ctx.store, &id) {
            Ok(worker) => Response::Worker { worker: Box::new(renderq_wire::WorkerSummary::from(&worker)) },
            Err(e) => error_response(e),
        },

        Request::EnableWorker { id } => match lifecycle::enable_worker(&ctx.store, &id) {
            Ok(worker) => Response::Worker { worker: Box::new(renderq_wire::WorkerSummary::from(&worker)) },
            Err(e) => error_response(e),
        },

        Request::DeleteWorker { id } => match lifecycle::delete_worker(&ctx.store, &id) {
            Ok(()) => Response::WorkerDeleted { id },
            Err(e) => error_response(e),
        },

        Request::ListPlugins => Response::Plugins { plugins: plugin_summaries(&ctx.registry) },

        Request::GetStats => Response::Stats { stats: stats_wire(&ctx.store) },

        Request::SubscribeEvents => {
            // handled in `handle_connection` before dispatch is ever reached.
            Response::Subscribed
        }

        Request::RegisterWorker { hostname, mac_address, ip_address, pools, capabilities, cpu_cores, memory_total_mb, version } => {
            let params =
                worker_protocol::RegisterParams { hostname, mac_address, ip_address, pools, capabilities, cpu_cores, memory_total_mb, version };
            match worker_protocol::register_worker(&ctx.store, &ctx.events, &ctx.clock, params) {
                Ok(worker) => Response::Worker { worker: Box::new(renderq_wire::WorkerSummary::from(&worker)) },
                Err(e) => error_response(e),
            }
        }

        Request::Heartbeat { worker_id, cpu_usage_pct, memory_used_mb } => {
            match worker_protocol::heartbeat(&ctx.store, &ctx.events, &ctx.clock, &worker_id, cpu_usage_pct, memory_used_mb) {
                Ok(worker) => Response::Worker { worker: Box::new(renderq_wire::WorkerSummary::from(&worker)) },
                Err(e) => error_response(e),
            }
        }

        Request::PullTask { worker_id } => match worker_protocol::pull_task(&ctx.store, &ctx.events, &ctx.clock, &worker_id) {
            Ok(Some(task)) => Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) },
            Ok(None) => Response::NoTask,
            Err(e) => error_response(e),
        },

        Request::StartTask { task_id } => match worker_protocol::start_task(&ctx.store, &ctx.events, &ctx.clock, &task_id) {
            Ok(task) => {
                invoke_task_hook(ctx, &task, TaskHook::Start);
                Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) }
            }
            Err(e) => error_response(e),
        },

        Request::ReportProgress { task_id, progress } => match worker_protocol::report_progress(&ctx.store, &ctx.events, &ctx.clock, &task_id, progress) {
            Ok(task) => Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) },
            Err(e) => error_response(e),
        },

        Request::CompleteTask { task_id, exit_code } => match worker_protocol::complete_task(&ctx.store, &ctx.events, &ctx.clock, &task_id, exit_code) {
            Ok(task) => {
                invoke_task_hook(ctx, &task, TaskHook::Complete);
                Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) }
            }
            Err(e) => error_response(e),
        },

        Request::FailTask { task_id, exit_code, error_message } => {
            match worker_protocol::fail_task(&ctx.store, &ctx.events, &ctx.clock, &task_id, exit_code, error_message) {
                Ok(task) => {
                    invoke_task_hook(ctx, &task, TaskHook::Fail);
                    Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) }
                }
                Err(e) => error_response(e),
            }
        }

        Request::UploadTaskLog { task_id, log_path } => match worker_protocol::upload_task_log(&ctx.store, &task_id, log_path) {
            Ok(task) => Response::Task { task: Box::new(renderq_wire::TaskDetail::from(&task)) },
            Err(e) => error_response(e),
        },
    }
}

enum TaskHook {
    Start,
    Complete,
    Fail,
}

/// Fire a plugin lifecycle hook for `task`'s job (spec §4.6). Plugin hooks
/// are side-effecting callbacks with no return value, so a missing job or
/// plugin (should never happen for a task the store just handed back) is
/// simply logged and skipped rather than surfaced as an error.
fn invoke_task_hook<C: Clock>(ctx: &CoordinatorCtx<C>, task: &Task, hook: TaskHook) {
    let Some(job) = ctx.store.get_job(&task.job_id) else {
        warn!(task_id = %task.id, "task hook skipped: job not found");
        return;
    };
    let Some(plugin) = ctx.registry.get(&job.plugin) else {
        warn!(task_id = %task.id, plugin = %job.plugin, "task hook skipped: plugin not found");
        return;
    };
    match hook {
        TaskHook::Start => plugin.on_task_start(task),
        TaskHook::Complete => plugin.on_task_complete(task),
        TaskHook::Fail => plugin.on_task_fail(task),
    }
}

fn respond_job<C: Clock>(ctx: &CoordinatorCtx<C>, job: &renderq_core::Job) -> Response {
    let tasks = ctx.store.list_tasks_by_job(&job.id).iter().map(renderq_wire::TaskDetail::from).collect();
    Response::Job { job: Box::new(renderq_wire::JobDetail::new(job, tasks)) }
}

fn error_response(e: CoordinatorError) -> Response {
    info!(kind = ?e.kind(), error = %e, "request failed");
    Response::Error { message: e.to_string() }
}

fn plugin_summaries(registry: &PluginRegistry) -> Vec<renderq_wire::PluginSummary> {
    registry
        .list_info()
        .into_iter()
        .map(|info| renderq_wire::PluginSummary {
            name: info.name,
            display_name: info.display_name,
            version: info.version,
            description: info.description,
            parameters: info.parameters.into_iter().map(|(name, spec)| (name, parameter_spec_wire(spec))).collect(),
        })
        .collect()
}

fn parameter_spec_wire(spec: renderq_plugins::ParameterSpec) -> renderq_wire::ParameterSpecWire {
    renderq_wire::ParameterSpecWire {
        kind: match spec.kind {
            renderq_plugins::ParameterKind::String => renderq_wire::ParameterKindWire::String,
            renderq_plugins::ParameterKind::Int => renderq_wire::ParameterKindWire::Int,
            renderq_plugins::ParameterKind::Float => renderq_wire::ParameterKindWire::Float,
            renderq_plugins::ParameterKind::Bool => renderq_wire::ParameterKindWire::Bool,
            renderq_plugins::ParameterKind::Path => renderq_wire::ParameterKindWire::Path,
            renderq_plugins::ParameterKind::Choice => renderq_wire::ParameterKindWire::Choice,
        },
        label: spec.label,
        required: spec.required,
        default: spec.default,
        choices: spec.choices,
        description: spec.description,
    }
}

fn stats_wire(store: &Store) -> renderq_wire::StatsSnapshot {
    let snapshot = store.stats();
    let job = |s: &str| snapshot.jobs_by_status.get(s).copied().unwrap_or(0);
    let task = |s: &str| snapshot.tasks_by_status.get(s).copied().unwrap_or(0);
    let worker = |s: &str| snapshot.workers_by_status.get(s).copied().unwrap_or(0);
    renderq_wire::StatsSnapshot {
        jobs_pending: job("pending"),
        jobs_queued: job("queued"),
        jobs_active: job("active"),
        jobs_suspended: job("suspended"),
        jobs_completed: job("completed"),
        jobs_failed: job("failed"),
        jobs_cancelled: job("cancelled"),
        tasks_pending: task("pending"),
        tasks_assigned: task("assigned"),
        tasks_running: task("running"),
        tasks_completed: task("completed"),
        tasks_failed: task("failed"),
        workers_idle: worker("idle"),
        workers_busy: worker("busy"),
        workers_offline: worker("offline"),
        workers_disabled: worker("disabled"),
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
