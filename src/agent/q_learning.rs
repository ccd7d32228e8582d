//! Tabular Q-Learning agent for the grid world

use super::exploration::ExplorationSchedule;
use crate::error::{Error, Result};
use crate::gridworld::{Action, Cell, CellKind, GridLayout, NUM_ACTIONS};
use ndarray::{s, Array3, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Q-Learning agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// Learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Reward for entering the goal cell
    pub goal_reward: f64,
    /// Reward for entering an obstacle cell
    pub obstacle_reward: f64,
    /// Reward for any other move
    pub move_reward: f64,
    /// Epsilon schedule
    pub exploration: ExplorationSchedule,
    /// RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.9,
            goal_reward: 100.0,
            obstacle_reward: -100.0,
            move_reward: -1.0,
            exploration: ExplorationSchedule::default(),
            seed: None,
        }
    }
}

impl QLearningConfig {
    /// Check hyper-parameter ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::config(format!("alpha must be in (0, 1], got {}", self.alpha)));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::config(format!("gamma must be in [0, 1], got {}", self.gamma)));
        }
        self.exploration.validate()
    }
}

/// Where the current episode stands after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// Episode still running
    Exploring,
    /// Goal reached
    Succeeded,
    /// Obstacle entered
    Failed,
}

/// Result of a single learning step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Action taken
    pub action: Action,
    /// Cell the step started from
    pub from: Cell,
    /// Cell entered by the step
    pub to: Cell,
    /// Reward received
    pub reward: f64,
    /// Whether the step ended the episode
    pub terminal: bool,
    /// Episode phase after the step
    pub phase: EpisodePhase,
}

/// Summary of one episode run by [`GridPolicyLearner::run_episode`]
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeReport {
    /// Steps taken
    pub steps: usize,
    /// Sum of rewards
    pub total_reward: f64,
    /// `Exploring` when the step budget ran out before a terminal cell
    pub phase: EpisodePhase,
}

impl EpisodeReport {
    /// Whether the episode ended on the goal
    pub fn is_success(&self) -> bool {
        self.phase == EpisodePhase::Succeeded
    }

    /// Whether the step budget ran out first
    pub fn is_truncated(&self) -> bool {
        self.phase == EpisodePhase::Exploring
    }
}

/// Running training counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Learning steps taken
    pub steps: usize,
    /// Episodes that reached a terminal cell
    pub attempts: usize,
    /// Episodes that reached the goal
    pub successes: usize,
    /// Episodes that ended on an obstacle
    pub failures: usize,
    /// Episodes cut short by a step budget
    pub truncated: usize,
}

impl TrainingStats {
    /// Share of terminated episodes that reached the goal, in percent
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.successes as f64 / self.attempts as f64 * 100.0
    }
}

/// Tabular Q-Learning agent on a grid
///
/// Holds a `rows x cols x 4` Q-table, the agent position and the current
/// exploration rate. Every step is learned from immediately.
#[derive(Debug, Clone)]
pub struct GridPolicyLearner {
    layout: GridLayout,
    config: QLearningConfig,
    q_table: Array3<f64>,
    position: Cell,
    epsilon: f64,
    phase: EpisodePhase,
    stats: TrainingStats,
    rng: StdRng,
}

impl GridPolicyLearner {
    /// Create a learner, seeding the RNG from the config or from entropy
    pub fn new(layout: GridLayout, config: QLearningConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build(layout, config, rng)
    }

    /// Create a learner with a fixed RNG seed
    pub fn with_seed(layout: GridLayout, config: QLearningConfig, seed: u64) -> Result<Self> {
        Self::build(layout, config, StdRng::seed_from_u64(seed))
    }

    fn build(layout: GridLayout, config: QLearningConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            q_table: Array3::zeros((layout.rows(), layout.cols(), NUM_ACTIONS)),
            position: layout.start(),
            epsilon: config.exploration.initial,
            phase: EpisodePhase::Exploring,
            stats: TrainingStats::default(),
            layout,
            config,
            rng,
        })
    }

    /// Take one step with the current exploration rate
    pub fn step(&mut self) -> StepOutcome {
        self.step_with_rate(self.epsilon)
    }

    /// Take one epsilon-greedy step, learn from it and handle episode end
    ///
    /// On a terminal step the agent is moved back to the start cell and the
    /// exploration rate is decayed according to the schedule.
    pub fn step_with_rate(&mut self, exploration_rate: f64) -> StepOutcome {
        let from = self.position;
        let action = self.select_action(from, exploration_rate);
        let to = self.layout.neighbor(from, action);
        let kind = self.layout.kind(to);
        let reward = self.reward_for(kind);

        self.update(from, action, to, reward);
        self.stats.steps += 1;

        self.phase = match kind {
            CellKind::Open => {
                self.position = to;
                EpisodePhase::Exploring
            }
            CellKind::Goal => self.finish_episode(true),
            CellKind::Obstacle => self.finish_episode(false),
        };

        StepOutcome {
            action,
            from,
            to,
            reward,
            terminal: kind.is_terminal(),
            phase: self.phase,
        }
    }

    fn select_action(&mut self, cell: Cell, exploration_rate: f64) -> Action {
        if self.rng.gen::<f64>() < exploration_rate {
            Action::ALL[self.rng.gen_range(0..NUM_ACTIONS)]
        } else {
            self.greedy_action(cell)
        }
    }

    fn reward_for(&self, kind: CellKind) -> f64 {
        match kind {
            CellKind::Goal => self.config.goal_reward,
            CellKind::Obstacle => self.config.obstacle_reward,
            CellKind::Open => self.config.move_reward,
        }
    }

    fn finish_episode(&mut self, success: bool) -> EpisodePhase {
        self.stats.attempts += 1;
        let schedule = &self.config.exploration;

        let phase = if success {
            self.stats.successes += 1;
            self.epsilon = schedule.after_success(self.epsilon, self.stats.successes);
            EpisodePhase::Succeeded
        } else {
            self.stats.failures += 1;
            self.epsilon = schedule.after_failure(self.epsilon);
            EpisodePhase::Failed
        };

        debug!(
            ?phase,
            attempts = self.stats.attempts,
            epsilon = self.epsilon,
            "Episode finished"
        );

        self.position = self.layout.start();
        phase
    }

    /// Apply the temporal-difference update and return the new Q-value
    ///
    /// Q(s,a) <- Q(s,a) + α (r + γ max_a' Q(s',a') - Q(s,a)), where the max
    /// term is zero when `next_state` is terminal. Returns `None` and leaves
    /// the table untouched if either cell lies outside the grid.
    pub fn update(&mut self, state: Cell, action: Action, next_state: Cell, reward: f64) -> Option<f64> {
        if !self.layout.contains(state) || !self.layout.contains(next_state) {
            warn!(?state, ?next_state, "Skipping update for a cell outside the grid");
            return None;
        }

        let next_max = if self.layout.kind(next_state).is_terminal() {
            0.0
        } else {
            self.max_q(next_state)
        };

        let idx = [state.0, state.1, action.to_index()];
        let current_q = self.q_table[idx];
        let td_target = reward + self.config.gamma * next_max;
        let new_q = current_q + self.config.alpha * (td_target - current_q);
        self.q_table[idx] = new_q;
        Some(new_q)
    }

    /// Q-values of a cell in action order `[Up, Right, Down, Left]`
    pub fn q_values(&self, (row, col): Cell) -> ArrayView1<'_, f64> {
        self.q_table.slice(s![row, col, ..])
    }

    fn max_q(&self, cell: Cell) -> f64 {
        self.q_values(cell)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Best known action; ties go to the lowest action index
    pub fn greedy_action(&self, cell: Cell) -> Action {
        let q = self.q_values(cell);
        let mut best = 0;
        for a in 1..NUM_ACTIONS {
            if q[a] > q[best] {
                best = a;
            }
        }
        Action::ALL[best]
    }

    /// Follow greedy actions from `start` to `goal`
    ///
    /// Returns the cells entered after `start`, ending with `goal`. Returns
    /// `None` when an obstacle is entered, when more than `max_steps` moves
    /// would be needed, or when either endpoint lies outside the grid.
    pub fn compute_greedy_path(&self, start: Cell, goal: Cell, max_steps: usize) -> Option<Vec<Cell>> {
        if !self.layout.contains(start) || !self.layout.contains(goal) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = start;

        while current != goal {
            if path.len() >= max_steps {
                return None;
            }
            current = self.layout.neighbor(current, self.greedy_action(current));
            if self.layout.is_obstacle(current) {
                return None;
            }
            path.push(current);
        }

        Some(path)
    }

    /// Greedy path from the layout's start to its goal, bounded by the cell count
    pub fn best_path(&self) -> Option<Vec<Cell>> {
        self.compute_greedy_path(self.layout.start(), self.layout.goal(), self.layout.num_cells())
    }

    /// Step until the episode ends or `max_steps` steps were taken
    ///
    /// A truncated episode returns the agent to the start without touching
    /// the exploration rate.
    pub fn run_episode(&mut self, max_steps: usize) -> EpisodeReport {
        let mut total_reward = 0.0;

        for steps in 1..=max_steps {
            let outcome = self.step();
            total_reward += outcome.reward;
            if outcome.terminal {
                return EpisodeReport {
                    steps,
                    total_reward,
                    phase: outcome.phase,
                };
            }
        }

        self.stats.truncated += 1;
        self.position = self.layout.start();
        self.phase = EpisodePhase::Exploring;

        EpisodeReport {
            steps: max_steps,
            total_reward,
            phase: EpisodePhase::Exploring,
        }
    }

    /// Run `episodes` episodes and return the accumulated statistics
    pub fn train(&mut self, episodes: usize, max_steps_per_episode: usize) -> TrainingStats {
        let log_every = (episodes / 10).max(1);

        for episode in 1..=episodes {
            let report = self.run_episode(max_steps_per_episode);

            if episode % log_every == 0 {
                info!(
                    episode,
                    steps = report.steps,
                    reward = report.total_reward,
                    epsilon = self.epsilon,
                    success_rate = self.stats.success_rate(),
                    "Training progress"
                );
            }
        }

        self.stats.clone()
    }

    /// Forget everything learned while keeping the layout
    pub fn reset_learning(&mut self) {
        self.q_table.fill(0.0);
        self.epsilon = self.config.exploration.initial;
        self.stats = TrainingStats::default();
        self.position = self.layout.start();
        self.phase = EpisodePhase::Exploring;
    }

    pub fn q_table(&self) -> &Array3<f64> {
        &self.q_table
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    /// Current exploration rate
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn open_grid() -> GridLayout {
        GridLayout::new(3, 3, (0, 0), (2, 2), []).unwrap()
    }

    fn learner(layout: GridLayout) -> GridPolicyLearner {
        GridPolicyLearner::with_seed(layout, QLearningConfig::default(), 42).unwrap()
    }

    #[test]
    fn test_terminal_update_ignores_next_state() {
        let mut agent = learner(open_grid());

        let q = agent.update((2, 1), Action::Right, (2, 2), 100.0).unwrap();
        assert_abs_diff_eq!(q, 10.0, epsilon = 1e-12);

        let q = agent.update((2, 1), Action::Right, (2, 2), 100.0).unwrap();
        assert_abs_diff_eq!(q, 19.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_bootstraps_from_next_state() {
        let mut agent = learner(open_grid());
        agent.q_table[[1, 1, Action::Down.to_index()]] = 5.0;

        let q = agent.update((0, 1), Action::Down, (1, 1), -1.0).unwrap();
        assert_abs_diff_eq!(q, 0.1 * (-1.0 + 0.9 * 5.0), epsilon = 1e-12);
        assert_abs_diff_eq!(agent.q_values((0, 1))[2], q, epsilon = 1e-12);
    }

    #[test]
    fn test_update_outside_grid_is_skipped() {
        let mut agent = learner(open_grid());

        assert_eq!(agent.update((3, 0), Action::Up, (2, 0), -1.0), None);
        assert_eq!(agent.update((2, 0), Action::Down, (0, 7), -1.0), None);
        assert!(agent.q_table().iter().all(|&q| q == 0.0));
    }

    #[test]
    fn test_run_episode_reaches_goal() {
        let layout = GridLayout::new(1, 2, (0, 0), (0, 1), []).unwrap();
        let config = QLearningConfig {
            exploration: ExplorationSchedule {
                initial: 0.0,
                min: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut agent = GridPolicyLearner::with_seed(layout, config, 1).unwrap();
        agent.q_table[[0, 0, Action::Right.to_index()]] = 1.0;

        let report = agent.run_episode(10);
        assert!(report.is_success());
        assert!(!report.is_truncated());
        assert_eq!(report.steps, 1);
        assert_abs_diff_eq!(report.total_reward, 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_steps_stay_inside_grid() {
        let layout = GridLayout::new(4, 5, (0, 0), (3, 4), [(1, 2), (2, 2)]).unwrap();
        let mut agent = learner(layout.clone());

        for _ in 0..2000 {
            let outcome = agent.step_with_rate(1.0);
            assert!(layout.contains(outcome.from));
            assert!(layout.contains(outcome.to));
            assert!(layout.contains(agent.position()));
        }
        assert_eq!(agent.stats().steps, 2000);
    }

    #[test]
    fn test_obstacle_ends_episode_with_penalty() {
        let layout = GridLayout::new(1, 3, (0, 0), (0, 2), [(0, 1)]).unwrap();
        let mut agent = learner(layout);
        agent.q_table[[0, 0, Action::Right.to_index()]] = 1.0;

        let outcome = agent.step_with_rate(0.0);
        assert_eq!(outcome.action, Action::Right);
        assert_eq!(outcome.to, (0, 1));
        assert_eq!(outcome.reward, -100.0);
        assert!(outcome.terminal);
        assert_eq!(outcome.phase, EpisodePhase::Failed);

        assert_eq!(agent.position(), (0, 0));
        assert_eq!(agent.stats().failures, 1);
        assert_abs_diff_eq!(agent.epsilon(), 0.99, epsilon = 1e-12);
    }

    #[test]
    fn test_goal_ends_episode_and_phase_resets() {
        let layout = GridLayout::new(1, 2, (0, 0), (0, 1), []).unwrap();
        let mut agent = learner(layout);
        agent.q_table[[0, 0, Action::Right.to_index()]] = 1.0;

        let outcome = agent.step_with_rate(0.0);
        assert_eq!(outcome.reward, 100.0);
        assert_eq!(outcome.phase, EpisodePhase::Succeeded);
        assert_eq!(agent.position(), (0, 0));
        assert_eq!(agent.epsilon(), 1.0);
        assert_eq!(agent.stats().success_rate(), 100.0);

        agent.q_table[[0, 0, Action::Right.to_index()]] = -50.0;
        let outcome = agent.step_with_rate(0.0);
        assert_eq!(outcome.action, Action::Up);
        assert_eq!(outcome.reward, -1.0);
        assert!(!outcome.terminal);
        assert_eq!(outcome.phase, EpisodePhase::Exploring);
    }

    #[test]
    fn test_greedy_tie_breaks_to_lowest_index() {
        let agent = learner(open_grid());
        assert_eq!(agent.greedy_action((1, 1)), Action::Up);
    }

    #[test]
    fn test_greedy_path_follows_table() {
        let mut agent = learner(open_grid());
        for (cell, action) in [
            ((0, 0), Action::Right),
            ((0, 1), Action::Down),
            ((1, 1), Action::Down),
            ((2, 1), Action::Right),
        ] {
            agent.q_table[[cell.0, cell.1, action.to_index()]] = 1.0;
        }

        let path = agent.compute_greedy_path((0, 0), (2, 2), 9).unwrap();
        assert_eq!(path, vec![(0, 1), (1, 1), (2, 1), (2, 2)]);
        assert!(agent.compute_greedy_path((0, 0), (2, 2), 3).is_none());
        assert_eq!(agent.compute_greedy_path((2, 2), (2, 2), 0), Some(vec![]));
    }

    #[test]
    fn test_greedy_path_aborts() {
        // Untrained table bumps into the top wall forever
        let agent = learner(open_grid());
        assert!(agent.best_path().is_none());

        let layout = GridLayout::new(1, 3, (0, 0), (0, 2), [(0, 1)]).unwrap();
        let mut agent = learner(layout);
        agent.q_table[[0, 0, Action::Right.to_index()]] = 1.0;
        assert!(agent.best_path().is_none());

        assert!(agent.compute_greedy_path((5, 5), (0, 2), 10).is_none());
    }

    #[test]
    fn test_greedy_path_is_pure() {
        let mut agent = learner(open_grid());
        agent.train(20, 200);
        let before = agent.q_table().clone();
        let _ = agent.best_path();
        assert_eq!(agent.q_table(), &before);
    }

    #[test]
    fn test_run_episode_truncates() {
        let layout = GridLayout::new(5, 5, (0, 0), (4, 4), []).unwrap();
        let config = QLearningConfig {
            exploration: ExplorationSchedule {
                initial: 0.0,
                min: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut agent = GridPolicyLearner::with_seed(layout, config, 1).unwrap();

        let report = agent.run_episode(3);
        assert!(report.is_truncated());
        assert!(!report.is_success());
        assert_eq!(report.steps, 3);
        assert_abs_diff_eq!(report.total_reward, -3.0, epsilon = 1e-12);
        assert_eq!(agent.stats().truncated, 1);
        assert_eq!(agent.position(), (0, 0));
    }

    #[test]
    fn test_reset_learning() {
        let mut agent = learner(open_grid());
        agent.train(30, 200);
        assert!(agent.stats().steps > 0);

        agent.reset_learning();
        assert!(agent.q_table().iter().all(|&q| q == 0.0));
        assert_eq!(agent.epsilon(), 1.0);
        assert_eq!(agent.stats(), &TrainingStats::default());
        assert_eq!(agent.position(), (0, 0));
    }

    #[test]
    fn test_invalid_hyperparameters() {
        let bad_alpha = QLearningConfig {
            alpha: 0.0,
            ..Default::default()
        };
        assert!(GridPolicyLearner::new(open_grid(), bad_alpha).is_err());

        let bad_gamma = QLearningConfig {
            gamma: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            GridPolicyLearner::new(open_grid(), bad_gamma),
            Err(Error::Config(_))
        ));
    }
}
