//! Grid and run plotting with gnuplot.
//!
//! Cells are drawn at `x = col`, `y = -row` so row 0 is on top, matching
//! the ascii layout of a [`GridMap`].

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Cell, Path, PathfindingError, PathfindingResult};
use crate::mission_planning::ReplanningController;
use crate::utils::GridMap;

/// Color palette for consistent styling
pub mod colors {
    pub const WALL: &str = "#1E1E2E";
    pub const VISITED: &str = "#89B4FA";
    pub const PATH: &str = "#F9E2AF";
    pub const TRAIL: &str = "#FAB387";
    pub const AGENT: &str = "#F38BA8";
    pub const START: &str = "#A6E3A1";
    pub const GOAL: &str = "#CBA6F7";
}

#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::PATH, "Path")
    }
}

#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'S',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
}

fn to_xy<'a, I: IntoIterator<Item = &'a Cell>>(cells: I) -> (Vec<f64>, Vec<f64>) {
    cells
        .into_iter()
        .map(|c| (c.col as f64, -(c.row as f64)))
        .unzip()
}

/// Collects plot layers and renders them onto a single set of axes
pub struct Visualizer {
    title: String,
    layers: Vec<Layer>,
    bounds: Option<(usize, usize)>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            title: String::new(),
            layers: Vec::new(),
            bounds: None,
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Number of non-empty layers added so far
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn plot_cells(&mut self, cells: &[Cell], style: &PointStyle) -> &mut Self {
        if !cells.is_empty() {
            let (x, y) = to_xy(cells);
            self.layers.push(Layer::Points { x, y, style: style.clone() });
        }
        self
    }

    /// Walls of `grid`; also fixes the plot range to the grid size
    pub fn plot_walls(&mut self, grid: &GridMap) -> &mut Self {
        self.bounds = Some((grid.rows(), grid.cols()));
        let walls: Vec<Cell> = grid.wall_cells().collect();
        self.plot_cells(&walls, &PointStyle::new(colors::WALL, "Walls").with_size(1.2))
    }

    pub fn plot_visited(&mut self, visited: &[Cell]) -> &mut Self {
        self.plot_cells(visited, &PointStyle::new(colors::VISITED, "Visited").with_size(0.8))
    }

    pub fn plot_path(&mut self, path: &Path, style: &PathStyle) -> &mut Self {
        if !path.is_empty() {
            let (x, y) = to_xy(&path.cells);
            self.layers.push(Layer::Lines { x, y, style: style.clone() });
        }
        self
    }

    pub fn plot_trail(&mut self, trail: &[Cell]) -> &mut Self {
        if !trail.is_empty() {
            let (x, y) = to_xy(trail);
            let style = PathStyle::new(colors::TRAIL, "Agent trail").with_line_width(3.0);
            self.layers.push(Layer::Lines { x, y, style });
        }
        self
    }

    pub fn plot_start(&mut self, cell: Cell) -> &mut Self {
        self.plot_cells(&[cell], &PointStyle::new(colors::START, "Start").with_size(1.5))
    }

    pub fn plot_goal(&mut self, cell: Cell) -> &mut Self {
        self.plot_cells(&[cell], &PointStyle::new(colors::GOAL, "Goal").with_size(1.5))
    }

    pub fn plot_agent(&mut self, cell: Cell) -> &mut Self {
        let style = PointStyle::new(colors::AGENT, "Agent").with_size(1.5).with_symbol('O');
        self.plot_cells(&[cell], &style)
    }

    /// Everything the controller knows about the current run
    pub fn plot_run(&mut self, controller: &ReplanningController) -> &mut Self {
        let grid = controller.grid();
        self.plot_walls(grid);
        if let Some(result) = controller.last_search() {
            self.plot_visited(&result.visited_order);
        }
        if let Some(path) = controller.path() {
            self.plot_path(path, &PathStyle::default());
        }
        self.plot_trail(controller.trail());
        if let Some(agent) = controller.agent() {
            self.plot_agent(agent.cell);
        }
        self.plot_start(grid.start());
        self.plot_goal(grid.goal())
    }

    pub fn show(&mut self) -> PathfindingResult<()> {
        let mut figure = self.render();
        figure
            .show()
            .map(|_| ())
            .map_err(|e| PathfindingError::VisualizationError(e.to_string()))
    }

    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> PathfindingResult<()> {
        let mut figure = self.render();
        figure
            .save_to_png(path, width, height)
            .map_err(|e| PathfindingError::VisualizationError(e.to_string()))
    }

    pub fn save_svg(&mut self, path: &str) -> PathfindingResult<()> {
        let mut figure = self.render();
        figure
            .save_to_svg(path, 800, 600)
            .map_err(|e| PathfindingError::VisualizationError(e.to_string()))
    }

    /// Redraw all layers into `figure`, replacing its axes. Lets an
    /// animation reuse one gnuplot window.
    pub fn draw(&self, figure: &mut Figure) {
        figure.clear_axes();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Points { x, y, style } => {
                    axes.points(
                        x,
                        y,
                        &[
                            Caption(style.caption.as_str()),
                            Color(style.color.as_str()),
                            PointSymbol(style.symbol),
                            PointSize(style.size),
                        ],
                    );
                }
                Layer::Lines { x, y, style } => {
                    axes.lines(
                        x,
                        y,
                        &[
                            Caption(style.caption.as_str()),
                            Color(style.color.as_str()),
                            LineWidth(style.line_width),
                        ],
                    );
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(self.title.as_str(), &[]);
        }
        axes.set_x_label("col", &[]);
        axes.set_y_label("row", &[]);
        if let Some((rows, cols)) = self.bounds {
            axes.set_x_range(AutoOption::Fix(-1.0), AutoOption::Fix(cols as f64));
            axes.set_y_range(AutoOption::Fix(-(rows as f64)), AutoOption::Fix(1.0));
        }
        axes.set_aspect_ratio(AutoOption::Fix(1.0));
    }

    fn render(&self) -> Figure {
        let mut figure = Figure::new();
        self.draw(&mut figure);
        figure
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}
