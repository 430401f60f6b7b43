/*!
 * Controller states and the events a replanning run produces
 *
 * The replanning controller moves through a fixed set of states:
 *
 *   Idle -> Searching -> RevealingVisited -> RevealingPath -> Stepping
 *   Stepping -> Blocked -> Replanning -> Stepping | Trapped
 *   Stepping -> GoalReached
 *
 * Every transition is recorded so a run can be replayed or inspected.
 */

use std::fmt;
use std::time::Duration;

use crate::common::{Cell, Path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerState {
    Idle,
    Searching,
    RevealingVisited,
    RevealingPath,
    Stepping,
    Blocked,
    Replanning,
    GoalReached,
    Trapped,
}

impl ControllerState {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Searching => "searching",
            ControllerState::RevealingVisited => "revealing_visited",
            ControllerState::RevealingPath => "revealing_path",
            ControllerState::Stepping => "stepping",
            ControllerState::Blocked => "blocked",
            ControllerState::Replanning => "replanning",
            ControllerState::GoalReached => "goal_reached",
            ControllerState::Trapped => "trapped",
        }
    }

    /// Run is over; only a new run or a grid request leaves this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ControllerState::GoalReached | ControllerState::Trapped)
    }

    /// States in which external ticks make progress
    pub fn is_animating(&self) -> bool {
        matches!(
            self,
            ControllerState::RevealingVisited | ControllerState::RevealingPath | ControllerState::Stepping
        )
    }

    /// Transition table. Returning to Idle is always allowed.
    pub fn can_transition_to(&self, to: ControllerState) -> bool {
        use ControllerState::*;
        match (*self, to) {
            (_, Idle) => true,
            (Idle, Searching) => true,
            (Searching, RevealingVisited) => true,
            (RevealingVisited, RevealingPath) => true,
            (RevealingPath, Stepping) => true,
            (Stepping, Blocked) | (Stepping, GoalReached) => true,
            (Blocked, Replanning) => true,
            (Replanning, Stepping) | (Replanning, Trapped) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ControllerState,
    pub to: ControllerState,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.from, self.to)
    }
}

/// What happened during one agent step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepEvent {
    Continuing,
    Blocked,
    Replanned,
    GoalReached,
    Trapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub agent_cell: Cell,
    /// Index into the path that is active after the step
    pub path_index: usize,
    /// In order of occurrence, e.g. `[Blocked, Replanned]`
    pub events: Vec<StepEvent>,
    /// Walls injected during the step
    pub new_walls: Vec<Cell>,
}

impl StepReport {
    pub fn outcome(&self) -> StepEvent {
        self.events.last().copied().unwrap_or(StepEvent::Continuing)
    }

    pub fn was_blocked(&self) -> bool {
        self.events.contains(&StepEvent::Blocked)
    }
}

/// Result of one external tick
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Nothing to animate
    Idle,
    Visited(Vec<Cell>),
    PathRevealed(Path),
    Step(StepReport),
    Finished(StepEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentState {
    pub cell: Cell,
    pub path_index: usize,
    pub replans: usize,
    /// Summed over the initial search and every replan
    pub nodes_expanded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunMetrics {
    pub nodes_expanded: usize,
    pub path_cost: Option<usize>,
    pub replans: usize,
    pub last_search_time: Duration,
}

/// Token handed to a tick scheduler; ticks carrying an older token are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(ControllerState::GoalReached.is_terminal());
        assert!(ControllerState::Trapped.is_terminal());
        assert!(!ControllerState::Stepping.is_terminal());
        assert!(!ControllerState::Idle.is_terminal());
    }

    #[test]
    fn test_animating_states() {
        assert!(ControllerState::RevealingVisited.is_animating());
        assert!(ControllerState::RevealingPath.is_animating());
        assert!(ControllerState::Stepping.is_animating());
        assert!(!ControllerState::Idle.is_animating());
        assert!(!ControllerState::Replanning.is_animating());
        assert!(!ControllerState::GoalReached.is_animating());
    }

    #[test]
    fn test_transition_table() {
        use ControllerState::*;
        assert!(Stepping.can_transition_to(Blocked));
        assert!(Blocked.can_transition_to(Replanning));
        assert!(Replanning.can_transition_to(Trapped));
        assert!(GoalReached.can_transition_to(Idle));
        assert!(!Stepping.can_transition_to(Replanning));
        assert!(!Idle.can_transition_to(Stepping));
        assert!(!Trapped.can_transition_to(Stepping));
    }

    #[test]
    fn test_step_report_outcome() {
        let report = StepReport {
            agent_cell: Cell::new(1, 1),
            path_index: 0,
            events: vec![StepEvent::Blocked, StepEvent::Replanned],
            new_walls: vec![Cell::new(1, 2)],
        };
        assert_eq!(report.outcome(), StepEvent::Replanned);
        assert!(report.was_blocked());

        let empty = StepReport { events: Vec::new(), ..report };
        assert_eq!(empty.outcome(), StepEvent::Continuing);
    }

    #[test]
    fn test_generation_advances() {
        let g = Generation::default();
        assert_ne!(g, g.next());
        assert_eq!(g.next(), Generation::default().next());
        assert_eq!(format!("{}", g.next()), "#1");
    }
}
