use super::*;
use crate::gateway::PaperGateway;
use crate::market::ReplayFeed;
use strategos_api::Sentiment;
use uuid::Uuid;

fn btc() -> Symbol {
    Symbol::new("BTC", "USD")
}

fn eth() -> Symbol {
    Symbol::new("ETH", "USD")
}

struct Harness {
    feed: Arc<ReplayFeed>,
    gateway: Arc<PaperGateway>,
    ledger: Arc<Mutex<PortfolioLedger>>,
    engine: StrategyEngine,
}

fn harness(symbols: Vec<Symbol>, cash: f64, feed: ReplayFeed) -> Harness {
    let feed = Arc::new(feed);
    let gateway = Arc::new(PaperGateway::new());
    let ledger = Arc::new(Mutex::new(PortfolioLedger::new(cash)));
    let engine = StrategyEngine::new(
        symbols,
        StrategyConfig::default(),
        RiskPolicy::default(),
        Arc::new(RiskGate::standard()),
        feed.clone(),
        gateway.clone(),
        ledger.clone(),
    );
    Harness {
        feed,
        gateway,
        ledger,
        engine,
    }
}

fn outcome_for<'a>(report: &'a CycleReport, symbol: &Symbol) -> &'a TradeOutcome {
    report
        .outcomes
        .iter()
        .find(|(s, _)| s == symbol)
        .map(|(_, o)| o)
        .expect("symbol should be in the report")
}

async fn seed_position(h: &Harness, symbol: Symbol, quantity: f64, value: f64) {
    let record = TradeRecord::from_fill(
        TradeIntent::new(symbol, Side::Buy, quantity, value),
        Uuid::new_v4(),
        0,
    );
    h.ledger.lock().await.record_trade(&record).unwrap();
}

#[tokio::test]
async fn bullish_sentiment_opens_a_position() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![49_000.0, 50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    h.gateway.set_ticker(btc(), 50_000.0);

    let report = h.engine.run_cycle().await;

    // min(1000 * 0.25, 1000 * 0.30) = 250.
    assert_eq!(
        outcome_for(&report, &btc()),
        &TradeOutcome::Executed {
            side: Side::Buy,
            value: 250.0
        }
    );
    let state = h.ledger.lock().await.state();
    assert!((state.cash - 750.0).abs() < 1e-9);
    let holding = state.holding(&btc()).unwrap();
    assert!((holding.quantity - 0.005).abs() < 1e-12);
}

#[tokio::test]
async fn neutral_sentiment_does_nothing() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Neutral)
        .with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    h.gateway.set_ticker(btc(), 50_000.0);

    let report = h.engine.run_cycle().await;
    assert_eq!(outcome_for(&report, &btc()), &TradeOutcome::NoAction);
    assert!(h.ledger.lock().await.history().is_empty());
}

#[tokio::test]
async fn sub_minimum_sizing_skips_the_symbol() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0]);
    // 1.50 cash: sized at 1.50 * 0.25 = 0.375, below the 0.50 minimum,
    // while cash stays above the 0.50 emergency stop.
    let h = harness(vec![btc()], 1.50, feed);
    h.gateway.set_ticker(btc(), 50_000.0);

    let report = h.engine.run_cycle().await;
    assert!(matches!(
        outcome_for(&report, &btc()),
        TradeOutcome::Skipped { .. }
    ));
    assert!(h.ledger.lock().await.history().is_empty());
}

#[tokio::test]
async fn unpriceable_symbol_is_skipped_for_the_cycle() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    // No ticker posted on the gateway.

    let report = h.engine.run_cycle().await;
    assert!(matches!(
        outcome_for(&report, &btc()),
        TradeOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn profit_take_liquidates_the_full_position() {
    let feed = ReplayFeed::new().with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    seed_position(&h, btc(), 0.005, 250.0).await;

    // 6% above the 50,000 entry: exit threshold (5%) is met.
    h.gateway.set_ticker(btc(), 53_000.0);
    let report = h.engine.run_cycle().await;

    let expected_value = 0.005 * 53_000.0;
    assert_eq!(
        outcome_for(&report, &btc()),
        &TradeOutcome::Executed {
            side: Side::Sell,
            value: expected_value
        }
    );
    let state = h.ledger.lock().await.state();
    assert!(!state.has_position(&btc()));
    assert!((state.cash - (750.0 + expected_value)).abs() < 1e-9);
}

#[tokio::test]
async fn below_threshold_gain_keeps_holding() {
    let feed = ReplayFeed::new().with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    seed_position(&h, btc(), 0.005, 250.0).await;

    // Up 2%, below the 5% profit take.
    h.gateway.set_ticker(btc(), 51_000.0);
    let report = h.engine.run_cycle().await;

    assert_eq!(outcome_for(&report, &btc()), &TradeOutcome::NoAction);
    assert!(h.ledger.lock().await.state().has_position(&btc()));
}

#[tokio::test]
async fn exchange_rejection_leaves_the_ledger_untouched() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    h.gateway.set_ticker(btc(), 50_000.0);
    h.gateway.set_rejecting(btc(), true);

    let before = h.ledger.lock().await.state();
    let report = h.engine.run_cycle().await;

    assert!(matches!(
        outcome_for(&report, &btc()),
        TradeOutcome::ExecutionFailed { .. }
    ));
    assert_eq!(h.ledger.lock().await.state(), before);
}

#[tokio::test]
async fn risk_rejection_never_reaches_the_gateway() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0]);
    // Cash below the emergency stop, but large enough allocation math:
    // 0.40 * 0.25 = 0.10 would already be sub-minimum, so pin sizing
    // above the floor with a custom config.
    let feed_arc = Arc::new(feed);
    let gateway = Arc::new(PaperGateway::new());
    gateway.set_ticker(btc(), 50_000.0);
    let ledger = Arc::new(Mutex::new(PortfolioLedger::new(0.40)));
    let config = StrategyConfig {
        allocation_fraction: 1.0,
        risk_ceiling: 1.0,
        ..StrategyConfig::default()
    };
    let policy = RiskPolicy {
        min_trade_size: 0.10,
        ..RiskPolicy::default()
    };
    let engine = StrategyEngine::new(
        vec![btc()],
        config,
        policy,
        Arc::new(RiskGate::standard()),
        feed_arc,
        gateway,
        ledger.clone(),
    );

    let report = engine.run_cycle().await;
    match outcome_for(&report, &btc()) {
        TradeOutcome::Rejected { reason } => assert!(reason.contains("EmergencyStop")),
        other => panic!("expected risk rejection, got {:?}", other),
    }
    assert!(ledger.lock().await.history().is_empty());
}

#[tokio::test]
async fn degraded_feed_produces_no_trade_but_no_crash() {
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    h.feed.set_failing(btc(), true);
    h.gateway.set_ticker(btc(), 50_000.0);

    let report = h.engine.run_cycle().await;
    assert!(matches!(
        outcome_for(&report, &btc()),
        TradeOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn concurrent_symbols_never_overdraw_cash() {
    let symbols: Vec<Symbol> = (0..6)
        .map(|i| Symbol::new(format!("COIN{}", i), "USD"))
        .collect();
    let mut feed = ReplayFeed::new();
    for symbol in &symbols {
        feed = feed
            .with_sentiment(symbol.clone(), Sentiment::Bullish)
            .with_tape(symbol.clone(), vec![100.0]);
    }
    let h = harness(symbols.clone(), 1_000.0, feed);
    for symbol in &symbols {
        h.gateway.set_ticker(symbol.clone(), 100.0);
    }

    // Each symbol sizes off the cycle-start snapshot (250 each); the
    // ledger's own checks must keep cash non-negative regardless of the
    // interleaving.
    let report = h.engine.run_cycle().await;
    assert_eq!(report.outcomes.len(), symbols.len());

    let state = h.ledger.lock().await.state();
    assert!(state.cash >= 0.0, "cash went negative: {}", state.cash);
    assert_eq!(
        report.executed(),
        state.open_positions(),
        "every executed trade must correspond to a recorded position"
    );
}

#[tokio::test]
async fn execute_intent_runs_the_full_path() {
    let feed = ReplayFeed::new().with_tape(btc(), vec![50_000.0]);
    let h = harness(vec![btc()], 1_000.0, feed);
    h.gateway.set_ticker(btc(), 50_000.0);

    let intent = TradeIntent::new(btc(), Side::Buy, 0.002, 100.0);
    let outcome = h.engine.execute_intent(intent).await;
    assert_eq!(
        outcome,
        TradeOutcome::Executed {
            side: Side::Buy,
            value: 100.0
        }
    );
    assert!(h.ledger.lock().await.state().has_position(&btc()));
}

#[tokio::test]
async fn one_symbol_per_cycle_is_independent_of_the_others() {
    // ETH has no tape and no ticker; BTC must still trade.
    let feed = ReplayFeed::new()
        .with_sentiment(btc(), Sentiment::Bullish)
        .with_tape(btc(), vec![50_000.0])
        .with_sentiment(eth(), Sentiment::Bullish);
    let h = harness(vec![btc(), eth()], 1_000.0, feed);
    h.gateway.set_ticker(btc(), 50_000.0);

    let report = h.engine.run_cycle().await;
    assert!(matches!(
        outcome_for(&report, &btc()),
        TradeOutcome::Executed { .. }
    ));
    assert!(matches!(
        outcome_for(&report, &eth()),
        TradeOutcome::Skipped { .. }
    ));
}
