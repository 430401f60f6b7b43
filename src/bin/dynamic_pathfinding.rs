// Dynamic pathfinding demo
//
// Generates a random maze, searches it, then walks an agent along the path
// while obstacles appear. Blocked paths are replanned from the agent's cell.

use std::thread::sleep;

use env_logger::Env;
use gnuplot::Figure;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dynamic_pathfinding::common::{Cell, PathfindingError, PathfindingResult};
use dynamic_pathfinding::mapping::DEFAULT_OBSTACLE_PROBABILITY;
use dynamic_pathfinding::mission_planning::{ControllerConfig, ControllerState, ReplanningController, Tick};
use dynamic_pathfinding::path_planning::{Algorithm, HeuristicKind};
use dynamic_pathfinding::utils::{GridConfig, GridMap, PathStyle, Visualizer};

const SHOW_ANIMATION: bool = false;
const SEED: u64 = 2024;
const MAX_TICKS: usize = 10_000;

fn frame(controller: &ReplanningController, revealed: &[Cell], title: &str) -> Visualizer {
    let mut vis = Visualizer::new();
    vis.set_title(title);
    vis.plot_walls(controller.grid()).plot_visited(revealed);
    if let (Some(path), Some(agent)) = (controller.path(), controller.agent()) {
        vis.plot_path(path, &PathStyle::default());
        vis.plot_trail(controller.trail()).plot_agent(agent.cell);
    }
    vis.plot_start(controller.grid().start()).plot_goal(controller.grid().goal());
    vis
}

fn run_demo(algorithm: Algorithm, heuristic: HeuristicKind) -> PathfindingResult<()> {
    let grid_config = GridConfig::default();
    let mut rng = StdRng::seed_from_u64(SEED);
    let grid = GridMap::with_random_walls(
        grid_config.rows,
        grid_config.cols,
        grid_config.default_start(),
        grid_config.default_goal(),
        grid_config.maze_density,
        &mut rng,
    )?;

    let config = ControllerConfig {
        algorithm,
        heuristic,
        ..ControllerConfig::default()
            .with_dynamic_obstacles(DEFAULT_OBSTACLE_PROBABILITY)
            .with_seed(SEED)
    };
    let pacing = config.pacing;
    let mut controller = ReplanningController::new(grid, config)?;

    let (start, goal) = (controller.grid().start(), controller.grid().goal());
    let result = controller.run(start, goal)?;
    if !result.is_found() {
        info!("{} found no path, nothing to animate", algorithm);
        return Ok(());
    }

    let title = format!("{} / {}", algorithm, heuristic);
    let token = controller.generation();
    let mut revealed = Vec::new();
    let mut figure = Figure::new();

    for _ in 0..MAX_TICKS {
        let mut delay = pacing.delay_for(controller.state());
        match controller.tick(token) {
            Some(Tick::Visited(batch)) => revealed.extend(batch),
            Some(Tick::PathRevealed(path)) => debug!("path revealed, {} cells", path.len()),
            Some(Tick::Step(report)) => {
                if !report.new_walls.is_empty() {
                    debug!("new walls: {:?}", report.new_walls);
                }
                if report.was_blocked() {
                    info!("step events: {:?}", report.events);
                    delay += pacing.replan_delay();
                }
            }
            Some(Tick::Finished(event)) => {
                info!("{} finished: {:?}", title, event);
                break;
            }
            Some(Tick::Idle) | None => break,
        }

        if SHOW_ANIMATION {
            frame(&controller, &revealed, &title).draw(&mut figure);
            figure
                .show_and_keep_running()
                .map_err(|e| PathfindingError::VisualizationError(e.to_string()))?;
            sleep(delay);
        }
    }

    let metrics = controller.metrics();
    info!(
        "{}: state {}, nodes expanded {}, replans {}, path cost {:?}, last search {:?}",
        title,
        controller.state(),
        metrics.nodes_expanded,
        metrics.replans,
        metrics.path_cost,
        metrics.last_search_time
    );
    if controller.state().is_animating() {
        warn!("{} stopped after {} ticks before the run finished", title, MAX_TICKS);
    }
    if controller.state() == ControllerState::Trapped {
        info!("agent trapped at {:?}", controller.agent().map(|a| a.cell));
    }

    let crate_dir = env!("CARGO_MANIFEST_DIR");
    std::fs::create_dir_all(format!("{}/img", crate_dir))?;
    let file = format!(
        "{}/img/dynamic_pathfinding_{}_{}.svg",
        crate_dir,
        if algorithm == Algorithm::AStar { "astar" } else { "gbfs" },
        heuristic.name().to_lowercase()
    );
    let mut vis = Visualizer::new();
    vis.set_title(&title).plot_run(&controller);
    vis.save_svg(&file)?;
    info!("saved {}", file);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let runs = [
        (Algorithm::AStar, HeuristicKind::Manhattan),
        (Algorithm::GreedyBestFirst, HeuristicKind::Euclidean),
    ];
    for (algorithm, heuristic) in runs.iter() {
        if let Err(e) = run_demo(*algorithm, *heuristic) {
            error!("{} run failed: {}", algorithm, e);
        }
    }
}
