//! Portfolio Sims headless driver
//!
//! Plays both simulations for a fixed wall-clock span: the runner under the
//! autopilot, the market with an alternating long/short strategy. Leaderboard
//! traffic runs alongside without ever holding up a frame.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use tokio::time::MissedTickBehavior;

use portfolio_sims::clock::IntervalGate;
use portfolio_sims::leaderboard::{
    HttpLeaderboard, Leaderboard, LeaderboardApi, LeaderboardEvent, Request,
};
use portfolio_sims::market::{MarketEngine, MarketEvent, Side, format_currency};
use portfolio_sims::rng::{RandomSource, SimRng};
use portfolio_sims::runner::autopilot::{self, AutopilotInput};
use portfolio_sims::runner::{RunOutcome, RunStatus, RunnerEngine};
use portfolio_sims::settings::LeaderboardConfig;
use portfolio_sims::{BestScore, Settings};

const FRAME: Duration = Duration::from_millis(16);
/// Pause between a game over and the next run
const RESTART_DELAY_MS: u64 = 1_000;
/// Market ticks a position is held before the strategy closes it
const HOLD_TICKS: u64 = 5;

/// Portfolio Sims - headless runner and market simulation
#[derive(Parser, Debug)]
#[command(name = "portfolio-sims")]
#[command(about = "Plays the runner and market simulations headless, logging events")]
#[command(version)]
struct Args {
    /// Wall-clock seconds to run
    #[arg(long, env = "PORTFOLIO_SIMS_SECONDS", default_value_t = 20)]
    seconds: u64,

    /// Settings JSON file (stock tuning when omitted)
    #[arg(long, env = "PORTFOLIO_SIMS_SETTINGS")]
    settings: Option<PathBuf>,
}

fn board(url: Option<&String>, config: &LeaderboardConfig) -> Option<Leaderboard<HttpLeaderboard>> {
    url.map(|url| {
        log::info!("Leaderboard at {}", url);
        let mut board = Leaderboard::http(url.clone(), config.top_n, config.timeout());
        board.request_top();
        board
    })
}

fn log_board_event<A: LeaderboardApi + 'static>(
    name: &str,
    board: &Leaderboard<A>,
    event: &LeaderboardEvent,
) {
    match event {
        LeaderboardEvent::Refreshed { count } | LeaderboardEvent::Submitted { count } => {
            match board.entries().first() {
                Some(top) => log::info!(
                    "[{}] {} entries, top: {} with {}",
                    name,
                    count,
                    top.name,
                    top.score
                ),
                None => log::info!("[{}] leaderboard is empty", name),
            }
        }
        LeaderboardEvent::Failed { status, .. } => log::info!("[{}] {}", name, status),
    }
}

/// Drain outstanding leaderboard replies, giving up after the request timeout
async fn settle<A: LeaderboardApi + 'static>(
    name: &str,
    board: &mut Option<Leaderboard<A>>,
    timeout: Duration,
) {
    let Some(board) = board else { return };
    while let Ok(Some(event)) = tokio::time::timeout(timeout, board.next_event()).await {
        log_board_event(name, board, &event);
    }
}

struct RunnerDriver<R: RandomSource = SimRng, A: LeaderboardApi + 'static = HttpLeaderboard> {
    engine: RunnerEngine<R>,
    held: AutopilotInput,
    best: BestScore,
    best_path: PathBuf,
    board: Option<Leaderboard<A>>,
    ended_at_ms: Option<u64>,
    /// Runs started so far; the current run's number
    runs: u32,
    /// Run whose score is being submitted
    in_flight_run: Option<u32>,
    /// `(run, score)` waiting for the in-flight submission to finish
    queued: Option<(u32, u32)>,
}

impl<R: RandomSource, A: LeaderboardApi + 'static> RunnerDriver<R, A> {
    fn new(engine: RunnerEngine<R>, best_path: PathBuf, board: Option<Leaderboard<A>>) -> Self {
        Self {
            engine,
            held: AutopilotInput::default(),
            best: BestScore::load(&best_path),
            best_path,
            board,
            ended_at_ms: None,
            runs: 0,
            in_flight_run: None,
            queued: None,
        }
    }

    fn frame(&mut self, now_ms: u64, delta_ms: f32) {
        if self.engine.status() == RunStatus::Running {
            let want = autopilot::decide(&self.engine.snapshot(), self.engine.config());
            self.apply_input(want);
            if let Some(outcome) = self.engine.advance(delta_ms) {
                self.game_over(outcome, now_ms);
            }
        } else if self
            .ended_at_ms
            .is_none_or(|ended| now_ms.saturating_sub(ended) >= RESTART_DELAY_MS)
        {
            self.start_run();
        }

        let events = self.board.as_mut().map(|b| b.poll()).unwrap_or_default();
        for event in events {
            self.on_board_event(event);
        }
    }

    fn start_run(&mut self) {
        self.held = AutopilotInput::default();
        self.runs += 1;
        self.engine.start();
    }

    /// Translate held autopilot inputs into press/release edges
    fn apply_input(&mut self, want: AutopilotInput) {
        match (self.held.jump, want.jump) {
            (false, true) => self.engine.press_jump(),
            (true, false) => self.engine.release_jump(),
            _ => {}
        }
        match (self.held.crouch, want.crouch) {
            (false, true) => self.engine.press_crouch(),
            (true, false) => self.engine.release_crouch(),
            _ => {}
        }
        self.held = want;
    }

    fn game_over(&mut self, outcome: RunOutcome, now_ms: u64) {
        self.ended_at_ms = Some(now_ms);
        if self.best.record(outcome.score) {
            log::info!("[runner] new best score {}", outcome.score);
            if let Err(err) = self.best.save(&self.best_path) {
                log::warn!("[runner] {}", err);
            }
        }
        if let Some(score) = self.engine.submission_score() {
            self.submit(self.runs, score);
        }
    }

    /// Send now, or hold the score until the board is free
    fn submit(&mut self, run: u32, score: u32) {
        let Some(board) = self.board.as_mut() else { return };
        if board.request_submit(score as f64) {
            self.in_flight_run = Some(run);
        } else {
            log::debug!(
                "[runner] run {} score {} queued behind run {:?}",
                run,
                score,
                self.in_flight_run
            );
            self.queued = Some((run, score));
        }
    }

    fn on_board_event(&mut self, event: LeaderboardEvent) {
        if let Some(board) = &self.board {
            log_board_event("runner", board, &event);
        }
        match event {
            LeaderboardEvent::Submitted { .. } => {
                let run = self.in_flight_run.take();
                if run == Some(self.runs) && self.engine.status() == RunStatus::GameOver {
                    self.engine.mark_submitted();
                }
            }
            LeaderboardEvent::Failed {
                request: Request::Submit,
                ..
            } => self.in_flight_run = None,
            _ => return,
        }
        if let Some((run, score)) = self.queued.take() {
            self.submit(run, score);
        }
    }
}

struct MarketDriver {
    engine: MarketEngine,
    poll: IntervalGate,
    board: Option<Leaderboard<HttpLeaderboard>>,
    next_side: Side,
    ticks: u64,
    opened_at: u64,
}

impl MarketDriver {
    fn frame(&mut self, now_ms: u64) {
        if self.poll.ready(now_ms) {
            if let Some(tick) = self.engine.advance(now_ms) {
                self.ticks += 1;
                if let Some(liq) = tick.liquidation {
                    self.status(&MarketEvent::Liquidated(liq));
                }
                self.trade(now_ms);
            }
        }

        let events = self.board.as_mut().map(|b| b.poll()).unwrap_or_default();
        if let Some(board) = &self.board {
            for event in &events {
                log_board_event("market", board, event);
            }
        }
    }

    fn trade(&mut self, now_ms: u64) {
        let event = if self.engine.position().is_none() {
            if self.engine.balance() < self.engine.config().min_trade {
                Some(self.engine.reset(now_ms))
            } else {
                let side = self.next_side;
                let amount = self.engine.config().default_trade;
                self.next_side = match side {
                    Side::Long => Side::Short,
                    Side::Short => Side::Long,
                };
                self.opened_at = self.ticks;
                self.engine.open(side, amount)
            }
        } else if self.ticks - self.opened_at >= HOLD_TICKS {
            self.engine.close()
        } else {
            None
        };

        if let Some(event) = event {
            self.status(&event);
        }
    }

    fn status(&self, event: &MarketEvent) {
        log::info!("[market] {}", event.describe());
    }

    fn finish(&mut self) {
        if self.engine.position().is_some() {
            if let Some(event) = self.engine.close() {
                self.status(&event);
            }
        }
        if let (Some(value), Some(board)) = (self.engine.submission_value(), self.board.as_mut()) {
            board.request_submit(value);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let settings = Settings::load(args.settings.as_deref());
    let timeout = settings.leaderboard.timeout();

    log::info!("Portfolio Sims: running for {}s", args.seconds);

    let mut runner = RunnerDriver::new(
        RunnerEngine::new(settings.runner.clone()),
        settings.best_score_path.clone(),
        board(settings.leaderboard.runner_url.as_ref(), &settings.leaderboard),
    );
    let mut market = MarketDriver {
        poll: IntervalGate::new(settings.market.poll_interval_ms),
        engine: MarketEngine::new(settings.market.clone()),
        board: board(settings.leaderboard.market_url.as_ref(), &settings.leaderboard),
        next_side: Side::Long,
        ticks: 0,
        opened_at: 0,
    };

    let mut frames = tokio::time::interval(FRAME);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let deadline = Duration::from_secs(args.seconds);
    let start = Instant::now();
    let mut last = start;
    loop {
        tokio::select! {
            _ = frames.tick() => {}
            _ = &mut ctrl_c => {
                log::info!("Interrupted");
                break;
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(start);
        if elapsed >= deadline {
            break;
        }
        let delta_ms = now.duration_since(last).as_secs_f32() * 1000.0;
        last = now;
        let now_ms = elapsed.as_millis() as u64;

        runner.frame(now_ms, delta_ms);
        market.frame(now_ms);
    }

    market.finish();
    settle("runner", &mut runner.board, timeout).await;
    settle("market", &mut market.board, timeout).await;

    log::info!("Runner: {} runs, best score {}", runner.runs, runner.best.best);
    log::info!(
        "Market: {} ticks, balance {}",
        market.ticks,
        format_currency(market.engine.balance())
    );
    Ok(())
}
