//! Boots the Strategos pipeline against a synthetic random-walk market
//! and the in-process paper gateway, then drives periodic decision
//! cycles. Useful for watching the whole pipeline behave without any
//! external services.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use clap::Parser;
use log::info;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use strategos_api::{
    MarketDataError, MarketDataSource, PricePoint, PriceSeries, Sentiment, Symbol,
};
use strategos_engine::config::{AllocationTable, BootConfig};
use strategos_engine::gateway::PaperGateway;
use strategos_engine::market::{LOOKBACK_POINTS, LOOKBACK_STEP_SECS};
use strategos_engine::Orchestrator;

#[derive(Parser, Debug)]
#[command(about = "Drive the Strategos trading pipeline against a synthetic market")]
struct Args {
    /// Starting cash balance (quote currency).
    #[arg(long, default_value_t = 10_000.0)]
    cash: f64,

    /// Symbols to track, in BASE/QUOTE notation.
    #[arg(long = "symbol", default_values_t = [
        "BTC/USD".to_string(),
        "ETH/USD".to_string(),
        "SOL/USD".to_string(),
    ])]
    symbols: Vec<String>,

    /// Seconds between decision cycles.
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Number of cycles to run.
    #[arg(long, default_value_t = 12)]
    cycles: u32,
}

struct SymbolState {
    price: f64,
    history: VecDeque<f64>,
    last_change: f64,
}

/// A simple random-walk market: prices drift +/- 2% per step and the
/// sentiment label follows the direction of the last move.
struct RandomWalkFeed {
    state: RwLock<HashMap<Symbol, SymbolState>>,
}

impl RandomWalkFeed {
    fn new(symbols: &[Symbol], start_price: f64) -> Self {
        let state = symbols
            .iter()
            .map(|symbol| {
                (
                    symbol.clone(),
                    SymbolState {
                        price: start_price,
                        history: VecDeque::from(vec![start_price]),
                        last_change: 0.0,
                    },
                )
            })
            .collect();
        Self {
            state: RwLock::new(state),
        }
    }

    /// Advances every symbol one step. Called from the main loop, outside
    /// the async trait methods, so the RNG never crosses an await.
    fn step(&self) {
        let mut rng = rand::thread_rng();
        let mut state = self.state.write().unwrap();
        for symbol_state in state.values_mut() {
            let change_pct = rng.gen_range(-0.02..0.02);
            symbol_state.price = (symbol_state.price * (1.0 + change_pct)).max(0.01);
            symbol_state.last_change = change_pct;
            symbol_state.history.push_back(symbol_state.price);
            while symbol_state.history.len() > LOOKBACK_POINTS {
                symbol_state.history.pop_front();
            }
        }
    }

    fn price(&self, symbol: &Symbol) -> Option<f64> {
        self.state.read().unwrap().get(symbol).map(|s| s.price)
    }
}

#[async_trait]
impl MarketDataSource for RandomWalkFeed {
    async fn sentiment(&self, symbol: &Symbol) -> Result<Sentiment, MarketDataError> {
        let state = self.state.read().unwrap();
        let symbol_state = state
            .get(symbol)
            .ok_or_else(|| MarketDataError::Unavailable {
                symbol: symbol.clone(),
                reason: "untracked symbol".to_string(),
            })?;

        let sentiment = if symbol_state.last_change > 0.005 {
            Sentiment::Bullish
        } else if symbol_state.last_change < -0.005 {
            Sentiment::Bearish
        } else {
            Sentiment::Neutral
        };
        Ok(sentiment)
    }

    async fn latest_prices(&self, symbol: &Symbol) -> Result<PriceSeries, MarketDataError> {
        let state = self.state.read().unwrap();
        let symbol_state = state
            .get(symbol)
            .ok_or_else(|| MarketDataError::Unavailable {
                symbol: symbol.clone(),
                reason: "untracked symbol".to_string(),
            })?;

        let end = Utc::now().timestamp();
        let len = symbol_state.history.len();
        let points = symbol_state
            .history
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let offset = (len as i64 - 1 - i as i64) * LOOKBACK_STEP_SECS;
                PricePoint::new(end - offset, *price)
            })
            .collect();
        Ok(PriceSeries::new(points))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let symbols = args
        .symbols
        .iter()
        .map(|raw| raw.parse::<Symbol>())
        .collect::<Result<Vec<_>, _>>()?;

    let feed = Arc::new(RandomWalkFeed::new(&symbols, 100.0));
    let gateway = Arc::new(PaperGateway::new());

    let mut config = BootConfig::new(args.cash, symbols.clone());
    config.allocations = AllocationTable::new()
        .with_entry("Momentum", 0.5)
        .with_entry("Carry", 0.3);

    let orchestrator = Orchestrator::boot(config, feed.clone(), gateway.clone())?;

    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval_secs));
    for cycle in 0..args.cycles {
        ticker.tick().await;

        feed.step();
        for symbol in &symbols {
            if let Some(price) = feed.price(symbol) {
                gateway.set_ticker(symbol.clone(), price);
            }
        }

        let report = orchestrator.run_cycle().await;
        info!(
            "cycle {}: {} executed, {} rejected, {} skipped",
            cycle,
            report.executed(),
            report.rejected(),
            report.skipped()
        );

        // Periodic reviews, a few cycles apart.
        if cycle % 4 == 3 {
            orchestrator.review_allocations().await;
            orchestrator.review_adaptation().await;
        }
    }

    let state = orchestrator.portfolio_state().await;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
