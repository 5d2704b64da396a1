// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dual text/JSON rendering for everything the CLI prints.

use clap::ValueEnum;
use renderq_wire::{JobDetail, JobSummary, PluginSummary, StatsSnapshot, TaskDetail, WorkerSummary};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to serialize output: {e}"),
    }
}

pub fn print_job_summaries(format: OutputFormat, jobs: &[JobSummary]) {
    if format == OutputFormat::Json {
        return print_json(jobs);
    }
    if jobs.is_empty() {
        println!("no jobs");
        return;
    }
    println!("{:<24}{:<20}{:<14}{:<10}{:>8}  {:>6}  PROGRESS", "ID", "NAME", "PLUGIN", "STATUS", "PRI", "POOL");
    for job in jobs {
        println!(
            "{:<24}{:<20}{:<14}{:<10}{:>8}  {:>6}  {:>5.1}%",
            job.id.to_string(),
            truncate(&job.name, 19),
            job.plugin,
            job.status.to_string(),
            job.priority,
            job.pool,
            job.progress,
        );
    }
}

pub fn print_job_detail(format: OutputFormat, job: &JobDetail) {
    if format == OutputFormat::Json {
        return print_json(job);
    }
    println!("id:          {}", job.id);
    println!("name:        {}", job.name);
    println!("plugin:      {}", job.plugin);
    println!("pool:        {}", job.pool);
    println!("priority:    {}", job.priority);
    println!("status:      {}", job.status);
    println!("progress:    {:.1}%", job.progress);
    println!("tasks:       {} total, {} completed, {} failed", job.counts.task_total, job.counts.task_completed, job.counts.task_failed);
    if !job.dependent_on.is_empty() {
        let deps: Vec<String> = job.dependent_on.iter().map(|id| id.to_string()).collect();
        println!("depends on:  {}", deps.join(", "));
    }
    if let Some(error) = &job.error_message {
        println!("error:       {error}");
    }
    println!();
    print_task_details(OutputFormat::Text, &job.tasks);
}

pub fn print_task_details(format: OutputFormat, tasks: &[TaskDetail]) {
    if format == OutputFormat::Json {
        return print_json(tasks);
    }
    if tasks.is_empty() {
        println!("no tasks");
        return;
    }
    println!("{:<6}{:<24}{:<10}{:>8}  {:<24}WORKER", "IDX", "ID", "STATUS", "PROGRESS", "");
    for task in tasks {
        let worker = task.assigned_worker.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string());
        println!("{:<6}{:<24}{:<10}{:>7.1}%  {:<24}{}", task.index, task.id.to_string(), task.status.to_string(), task.progress, "", worker);
    }
}

pub fn print_workers(format: OutputFormat, workers: &[WorkerSummary]) {
    if format == OutputFormat::Json {
        return print_json(workers);
    }
    if workers.is_empty() {
        println!("no workers");
        return;
    }
    println!("{:<24}{:<20}{:<10}{:>8}  {:>8}  POOLS", "ID", "HOSTNAME", "STATUS", "CPU%", "MEM MB");
    for worker in workers {
        println!(
            "{:<24}{:<20}{:<10}{:>7.1}%  {:>8}  {}",
            worker.id.to_string(),
            truncate(&worker.hostname, 19),
            worker.status.to_string(),
            worker.cpu_usage_pct,
            worker.memory_used_mb,
            worker.pools.join(","),
        );
    }
}

pub fn print_worker(format: OutputFormat, worker: &WorkerSummary) {
    if format == OutputFormat::Json {
        return print_json(worker);
    }
    println!("id:         {}", worker.id);
    println!("hostname:   {}", worker.hostname);
    println!("status:     {}", worker.status);
    println!("pools:      {}", worker.pools.join(", "));
    println!("caps:       {}", worker.capabilities.join(", "));
    println!("cpu:        {:.1}% of {} cores", worker.cpu_usage_pct, worker.cpu_cores);
    println!("memory:     {} / {} MB", worker.memory_used_mb, worker.memory_total_mb);
    if let Some(task) = worker.current_task {
        println!("task:       {task}");
    }
}

pub fn print_plugins(format: OutputFormat, plugins: &[PluginSummary]) {
    if format == OutputFormat::Json {
        return print_json(plugins);
    }
    if plugins.is_empty() {
        println!("no plugins registered");
        return;
    }
    for plugin in plugins {
        println!("{} ({}) v{}", plugin.display_name, plugin.name, plugin.version);
        println!("  {}", plugin.description);
        for (key, spec) in plugin.parameters.iter() {
            let required = if spec.required { "required" } else { "optional" };
            println!("  - {key} [{:?}, {required}]: {}", spec.kind, spec.label);
        }
    }
}

pub fn print_stats(format: OutputFormat, stats: &StatsSnapshot) {
    if format == OutputFormat::Json {
        return print_json(stats);
    }
    println!(
        "jobs:    pending={} queued={} active={} suspended={} completed={} failed={} cancelled={}",
        stats.jobs_pending, stats.jobs_queued, stats.jobs_active, stats.jobs_suspended, stats.jobs_completed, stats.jobs_failed, stats.jobs_cancelled
    );
    println!(
        "tasks:   pending={} assigned={} running={} completed={} failed={}",
        stats.tasks_pending, stats.tasks_assigned, stats.tasks_running, stats.tasks_completed, stats.tasks_failed
    );
    println!(
        "workers: idle={} busy={} offline={} disabled={}",
        stats.workers_idle, stats.workers_busy, stats.workers_offline, stats.workers_disabled
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!("{}…", s.chars().take(max.saturating_sub(1)).collect::<String>())
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
