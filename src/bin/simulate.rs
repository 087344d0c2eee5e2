use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pacman_duo_engine::config::EngineConfig;
use pacman_duo_engine::engine::GameEngine;
use pacman_duo_engine::types::{Direction, InputCommand, RuntimeEvent, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with engine tunables; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    #[arg(long, default_value_t = 60)]
    fps: u32,
    /// Comma separated `time:command` pairs, e.g. `0:left,1.5:up,3:p2-down`.
    #[arg(long, default_value = "0:left")]
    moves: String,
    #[arg(long, default_value_t = 0)]
    random_moves: usize,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 1)]
    players: u8,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ScheduledInput {
    at_secs: f32,
    command: InputCommand,
}

#[derive(Clone, Debug, Default, Serialize)]
struct EventCounts {
    #[serde(rename = "dotEaten")]
    dot_eaten: u32,
    #[serde(rename = "powerupEaten")]
    powerup_eaten: u32,
    #[serde(rename = "ghostEaten")]
    ghost_eaten: u32,
    #[serde(rename = "pacmanKilled")]
    pacman_killed: u32,
    #[serde(rename = "phaseChanged")]
    phase_changed: u32,
    #[serde(rename = "levelCleared")]
    level_cleared: u32,
    #[serde(rename = "ghostLeftPrison")]
    ghost_left_prison: u32,
    #[serde(rename = "ghostStuck")]
    ghost_stuck: u32,
}

impl EventCounts {
    fn record(&mut self, event: &RuntimeEvent) {
        match event {
            RuntimeEvent::DotEaten { .. } => self.dot_eaten += 1,
            RuntimeEvent::PowerupEaten { .. } => self.powerup_eaten += 1,
            RuntimeEvent::GhostEaten { .. } => self.ghost_eaten += 1,
            RuntimeEvent::PacmanKilled { .. } => self.pacman_killed += 1,
            RuntimeEvent::PhaseChanged { .. } => self.phase_changed += 1,
            RuntimeEvent::LevelCleared { .. } => self.level_cleared += 1,
            RuntimeEvent::GhostLeftPrison { .. } => self.ghost_left_prison += 1,
            RuntimeEvent::GhostStuck { .. } => self.ghost_stuck += 1,
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct PlayerResult {
    color: String,
    points: i32,
    lives: i32,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    #[serde(rename = "runId")]
    run_id: String,
    seed: u64,
    frames: u64,
    #[serde(rename = "elapsedSecs")]
    elapsed_secs: f64,
    level: u32,
    phase: String,
    ended: bool,
    #[serde(rename = "dotsLeft")]
    dots_left: i32,
    players: Vec<PlayerResult>,
    events: EventCounts,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    config: EngineConfig,
    #[serde(rename = "inputCount")]
    input_count: usize,
    result: RunResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: i64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let started_at = now_iso();
    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs());
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, Utc::now().timestamp_millis()));

    let config = match cli.config.as_deref() {
        Some(path) => match EngineConfig::load(path) {
            Ok(config) => config,
            Err(error) => {
                emit_log(
                    "error",
                    "config_load_failed",
                    &run_id,
                    None,
                    json!({
                        "path": path.to_string_lossy(),
                        "error": error.to_string(),
                    }),
                );
                std::process::exit(2);
            }
        },
        None => EngineConfig::default(),
    };

    let mut plan = match parse_move_plan(&cli.moves) {
        Ok(plan) => plan,
        Err(message) => {
            emit_log(
                "error",
                "move_plan_invalid",
                &run_id,
                None,
                json!({ "moves": cli.moves, "error": message }),
            );
            std::process::exit(2);
        }
    };
    plan.extend(random_moves(
        seed,
        cli.random_moves,
        cli.seconds,
        cli.players.clamp(1, 2) as usize,
    ));
    plan.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));

    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        json!({
            "seed": seed,
            "seconds": cli.seconds,
            "fps": cli.fps,
            "players": cli.players,
            "inputCount": plan.len(),
        }),
    );

    let run = run_simulation(config.clone(), &plan, &cli, seed, &run_id);

    for anomaly in &run.anomaly_records {
        emit_log(
            "warn",
            "anomaly_detected",
            &run_id,
            Some(anomaly.tick),
            json!({ "message": anomaly.message }),
        );
    }

    println!(
        "{}",
        serde_json::to_string(&run.result).expect("run result should serialize")
    );

    let has_anomaly = !run.result.anomalies.is_empty();
    let summary = RunSummary {
        started_at,
        finished_at: now_iso(),
        config,
        input_count: plan.len(),
        result: run.result,
        anomaly_records: run.anomaly_records,
    };

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        Some(summary.result.frames),
        json!({
            "level": summary.result.level,
            "ended": summary.result.ended,
            "events": summary.result.events,
            "anomalyCount": summary.anomaly_records.len(),
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

struct SimulationRun {
    result: RunResultLine,
    anomaly_records: Vec<AnomalyRecord>,
}

fn run_simulation(
    config: EngineConfig,
    plan: &[ScheduledInput],
    cli: &Cli,
    seed: u64,
    run_id: &str,
) -> SimulationRun {
    let mut engine = GameEngine::new(config);
    if cli.players >= 2 {
        engine.apply_input(InputCommand::AddPlayer);
    }
    let board = engine.board();
    emit_log(
        "info",
        "board_loaded",
        run_id,
        None,
        json!({
            "origin": board.origin(),
            "width": board.width(),
            "height": board.height(),
            "dots": engine.dots_left(),
        }),
    );

    let fps = cli.fps.max(1);
    let dt = 1.0 / fps as f32;
    let total_frames = (cli.seconds.max(0.0) * fps as f32).round() as u64;
    let mut counts = EventCounts::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut next_input = 0usize;
    let mut frames = 0u64;
    let mut last_level = engine.level();

    for frame in 0..total_frames {
        let now = frame as f32 * dt;
        while let Some(input) = plan.get(next_input) {
            if input.at_secs > now {
                break;
            }
            engine.apply_input(input.command);
            next_input += 1;
        }

        engine.step(dt);
        frames += 1;
        let snapshot = engine.build_snapshot(true);
        for event in &snapshot.events {
            counts.record(event);
        }
        for message in collect_snapshot_anomalies(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        if snapshot.level != last_level {
            emit_log(
                "info",
                "level_started",
                run_id,
                Some(snapshot.tick),
                json!({ "level": snapshot.level }),
            );
            last_level = snapshot.level;
        }
        if engine.is_ended() {
            break;
        }
    }

    let snapshot = engine.build_snapshot(false);
    SimulationRun {
        result: RunResultLine {
            run_id: run_id.to_string(),
            seed,
            frames,
            elapsed_secs: snapshot.elapsed_secs,
            level: snapshot.level,
            phase: snapshot.phase.name().to_string(),
            ended: snapshot.ended,
            dots_left: snapshot.dots_left,
            players: snapshot
                .pacmen
                .iter()
                .map(|pacman| PlayerResult {
                    color: pacman.color.name().to_string(),
                    points: pacman.points,
                    lives: pacman.lives,
                })
                .collect(),
            events: counts,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.dots_left < 0 {
        anomalies.push(format!("negative dots left: {}", snapshot.dots_left));
    }
    for pacman in &snapshot.pacmen {
        if !pacman.x.is_finite() || !pacman.y.is_finite() {
            anomalies.push(format!("pacman position not finite: {}", pacman.color.name()));
        }
        if pacman.lives < 0 {
            anomalies.push(format!("negative lives: {}", pacman.color.name()));
        }
    }
    for ghost in &snapshot.ghosts {
        if !ghost.x.is_finite() || !ghost.y.is_finite() {
            anomalies.push(format!("ghost position not finite: {}", ghost.id.name()));
        }
    }
    for event in &snapshot.events {
        if let RuntimeEvent::GhostStuck { ghost, x, y } = event {
            anomalies.push(format!("ghost stuck: {} at ({x},{y})", ghost.name()));
        }
    }
    anomalies
}

fn parse_move_plan(text: &str) -> Result<Vec<ScheduledInput>, String> {
    let mut plan = Vec::new();
    for entry in text.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (at, command) = entry
            .split_once(':')
            .ok_or_else(|| format!("expected time:command, got {entry:?}"))?;
        let at_secs: f32 = at
            .trim()
            .parse()
            .map_err(|_| format!("invalid time {at:?}"))?;
        if !at_secs.is_finite() || at_secs < 0.0 {
            return Err(format!("time must be >= 0, got {at:?}"));
        }
        let command =
            InputCommand::parse(command).ok_or_else(|| format!("unknown command {command:?}"))?;
        plan.push(ScheduledInput { at_secs, command });
    }
    Ok(plan)
}

fn random_moves(seed: u64, count: usize, seconds: f32, players: usize) -> Vec<ScheduledInput> {
    if count == 0 || seconds <= 0.0 {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let at_secs = rng.random_range(0.0..seconds);
            let player = rng.random_range(0..players.max(1));
            let dir = Direction::CARDINAL[rng.random_range(0..Direction::CARDINAL.len())];
            ScheduledInput {
                at_secs,
                command: InputCommand::Move { player, dir },
            }
        })
        .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u64, timestamp_ms: i64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn emit_log(level: &str, event: &str, run_id: &str, tick: Option<u64>, details: Value) {
    let log_line = StructuredLogLine {
        timestamp_ms: Utc::now().timestamp_millis(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
