//! playback-runner: headless replay of a taxi-fleet simulation result.
//!
//! Usage:
//!   playback-runner --result sim.json [--config playback.json] [--geo]
//!   playback-runner --ipc-mode [--config playback.json]

mod scheduler;

use anyhow::{anyhow, Result};
use scheduler::TokioScheduler;
use serde_json::{json, Value};
use std::env;
use taxi_playback_core::{
    config::PlaybackConfig,
    controller::PlaybackController,
    event::PlaybackEvent,
    frame::{Frame, GeoFrame},
    mapper::CoordinateMapper,
    result::SimulationResult,
    summary::FleetSummary,
    types::{CycleId, Tick},
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tokio::sync::mpsc::{self, UnboundedReceiver};

type Controller = PlaybackController<TokioScheduler>;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Load { path: String },
    Start,
    Stop,
    GetFrame,
    GetGeoFrame,
    GetLogs,
    Summary,
    Quit,
}

#[derive(serde::Serialize)]
struct UiState {
    tick:     Tick,
    playing:  bool,
    max_tick: Option<Tick>,
    events:   Vec<PlaybackEvent>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let geo = args.iter().any(|a| a == "--geo");
    let config = match find_arg(&args, "--config") {
        Some(path) => PlaybackConfig::load(path)?,
        None => PlaybackConfig::default(),
    };

    let (tick_tx, tick_rx) = mpsc::unbounded_channel();
    let mapper = CoordinateMapper::new(config.mapper.clone());
    let mut controller = PlaybackController::new(config, TokioScheduler::new(tick_tx));

    if ipc_mode {
        run_ipc_loop(&mut controller, &mapper, tick_rx).await
    } else {
        let path = find_arg(&args, "--result")
            .ok_or_else(|| anyhow!("--result <file> is required outside --ipc-mode"))?;
        run_replay(&mut controller, &mapper, tick_rx, path, geo).await
    }
}

async fn run_replay(
    controller: &mut Controller,
    mapper: &CoordinateMapper,
    mut ticks: UnboundedReceiver<CycleId>,
    path: &str,
    geo: bool,
) -> Result<()> {
    let result = read_result(path)?;
    controller.load(result)?;

    println!("playback-runner: taxi fleet replay");
    println!("  result:    {path}");
    println!("  taxis:     {}", controller.result().map_or(0, |r| r.entity_count()));
    println!("  max_tick:  {}", controller.max_tick().unwrap_or(0));
    println!("  interval:  {}ms", controller.config().tick_interval_ms);
    println!();

    controller.start()?;
    print_tick(controller, mapper, geo)?;
    while controller.is_playing() {
        let Some(cycle) = ticks.recv().await else {
            break;
        };
        let events = controller.on_tick(cycle);
        for event in &events {
            log::debug!("replay: {}", event.type_name());
        }
        if !events.is_empty() {
            print_tick(controller, mapper, geo)?;
        }
    }

    print_summary(&controller.summary()?);
    Ok(())
}

async fn run_ipc_loop(
    controller: &mut Controller,
    mapper: &CoordinateMapper,
    mut ticks: UnboundedReceiver<CycleId>,
) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // EOF
                };
                if line.trim().is_empty() {
                    continue;
                }

                let cmd: IpcCommand = match serde_json::from_str(&line) {
                    Ok(c) => c,
                    Err(e) => {
                        log::warn!("ipc: unreadable request: {e}");
                        write_line(&mut stdout, &json!({ "error": e.to_string() })).await?;
                        continue;
                    }
                };

                match handle_command(controller, mapper, cmd) {
                    Ok(Some(reply)) => write_line(&mut stdout, &reply).await?,
                    Ok(None) => break,
                    Err(e) => write_line(&mut stdout, &json!({ "error": e.to_string() })).await?,
                }
            }
            Some(cycle) = ticks.recv() => {
                let events = controller.on_tick(cycle);
                if !events.is_empty() {
                    let frame = controller.current_frame()?;
                    write_line(&mut stdout, &json!({ "frame": frame, "events": events })).await?;
                }
            }
        }
    }
    controller.stop();
    Ok(())
}

/// Returns `Ok(None)` when the client asked to quit.
fn handle_command(
    controller: &mut Controller,
    mapper: &CoordinateMapper,
    cmd: IpcCommand,
) -> Result<Option<Value>> {
    let reply = match cmd {
        IpcCommand::Quit => return Ok(None),
        IpcCommand::Load { path } => {
            let events = controller.load(read_result(&path)?)?;
            ui_state(controller, events)?
        }
        IpcCommand::Start => {
            let events = controller.start()?;
            ui_state(controller, events)?
        }
        IpcCommand::Stop => {
            let events = controller.stop();
            ui_state(controller, events)?
        }
        IpcCommand::GetFrame => serde_json::to_value(controller.current_frame()?)?,
        IpcCommand::GetGeoFrame => serde_json::to_value(controller.current_geo_frame(mapper)?)?,
        IpcCommand::GetLogs => serde_json::to_value(controller.visible_logs()?)?,
        IpcCommand::Summary => serde_json::to_value(controller.summary()?)?,
    };
    Ok(Some(reply))
}

fn ui_state(controller: &Controller, events: Vec<PlaybackEvent>) -> Result<Value> {
    let state = UiState {
        tick: controller.current_tick(),
        playing: controller.is_playing(),
        max_tick: controller.max_tick(),
        events,
    };
    Ok(serde_json::to_value(state)?)
}

fn read_result(path: &str) -> Result<SimulationResult> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Cannot read {path}: {e}"))?;
    Ok(SimulationResult::from_json(&content)?)
}

async fn write_line(stdout: &mut Stdout, value: &Value) -> Result<()> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

fn print_tick(controller: &Controller, mapper: &CoordinateMapper, geo: bool) -> Result<()> {
    if geo {
        print_geo_frame(&controller.current_geo_frame(mapper)?);
    } else {
        print_frame(&controller.current_frame()?);
    }
    Ok(())
}

fn print_frame(frame: &Frame) {
    let cells: Vec<String> = frame
        .entities
        .iter()
        .map(|e| {
            let done = if e.exhausted { "*" } else { "" };
            let action = e.log.as_ref().map_or("", |l| l.action.as_str());
            format!("taxi {} ({},{}){done} {action}", e.id, e.position.row, e.position.col)
        })
        .collect();
    println!("tick {:>4} | {}", frame.tick, cells.join(" | "));
}

fn print_geo_frame(frame: &GeoFrame) {
    let cells: Vec<String> = frame
        .entities
        .iter()
        .map(|e| {
            let done = if e.exhausted { "*" } else { "" };
            format!("taxi {} {:.4},{:.4}{done}", e.id, e.position.lat, e.position.lng)
        })
        .collect();
    println!("tick {:>4} | {}", frame.tick, cells.join(" | "));
}

fn print_summary(summary: &FleetSummary) {
    println!();
    println!("=== FLEET SUMMARY ===");
    println!("  taxis:        {}", summary.active_taxis);
    println!("  rides:        {}", summary.total_rides);
    println!("  avg reward:   {:.2}", summary.avg_reward);
    println!("  avg eta:      {:.2} min", summary.avg_eta);
    println!("  revenue:      ₹{:.2}", summary.revenue);
    println!("  total steps:  {}", summary.total_steps);
    println!("  ticks played: {}", summary.max_tick);
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
