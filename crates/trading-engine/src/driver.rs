//! The polling loop.
//!
//! One cycle: fetch both timeframes, skip decision logic when the latest entry
//! bar was already seen, otherwise roll the trading day, recompute indicators,
//! refresh the account, evaluate and act. Exit checks run on every cycle that
//! got data, new bar or not.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use trading_core::error::DataError;
use trading_core::traits::{Broker, MarketData};
use trading_core::types::{
    AccountSnapshot, BarSeries, Direction, OrderRequest, PositionSide, RiskLevels, Signal,
};
use trading_data::fetch_series;
use trading_indicators::IndicatorSnapshot;
use trading_monitor::{NotificationHub, StatusReport, TradeEvent};
use trading_risk::{risk_distance, ExitReason};
use trading_strategies::{SignalEvaluator, SignalInputs};

use crate::{EngineConfig, EngineState};

/// Why a cycle stopped before any decision was taken.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Bars could not be fetched or came back empty
    DataUnavailable(String),
    InsufficientHistory(String),
    /// Indicator values undefined or not finite at the current bar
    IndicatorsUnavailable(String),
}

/// Result of acting on a fired signal.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryOutcome {
    Opened {
        order_id: String,
        direction: Direction,
        entry_price: f64,
    },
    /// Quote fetch failed or returned a zero side; nothing was submitted
    QuoteUnavailable,
    OrderFailed(String),
}

/// Result of the per-cycle exit check.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitOutcome {
    /// Nothing tracked
    Flat,
    Holding,
    /// Exit check skipped because the quote was unusable
    NoQuote,
    Closed(ExitReason),
    /// Close request failed; tracking dropped anyway
    CloseFailed(ExitReason),
    /// Broker reports no position; tracking dropped
    PositionGone,
    /// Position query failed; tracking dropped
    PositionQueryFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Skipped(SkipReason),
    /// Latest bar already processed; only the exit check ran
    SameBar { exit: ExitOutcome },
    NewBar {
        signal: Signal,
        entry: Option<EntryOutcome>,
        exit: ExitOutcome,
    },
}

impl From<DataError> for SkipReason {
    fn from(e: DataError) -> Self {
        match e {
            DataError::InsufficientHistory { .. } => SkipReason::InsufficientHistory(e.to_string()),
            other => SkipReason::DataUnavailable(other.to_string()),
        }
    }
}

/// Owns the trading state and drives it against the collaborators.
pub struct CycleDriver {
    config: EngineConfig,
    broker: Arc<dyn Broker>,
    data: Arc<dyn MarketData>,
    hub: NotificationHub,
    evaluator: SignalEvaluator,
    state: EngineState,
}

impl CycleDriver {
    pub fn new(
        config: EngineConfig,
        broker: Arc<dyn Broker>,
        data: Arc<dyn MarketData>,
        hub: NotificationHub,
    ) -> Self {
        let evaluator = SignalEvaluator::new(config.signal.clone());
        let state = EngineState::new(config.throttle, config.signal.risk_reward);
        Self {
            config,
            broker,
            data,
            hub,
            evaluator,
            state,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Initial account read (with balance reset when needed) and the start notice.
    pub async fn startup(&mut self) -> AccountSnapshot {
        let account = self.refresh_account().await;
        info!(
            symbol = %self.config.symbol,
            broker = self.broker.name(),
            data = self.data.name(),
            equity = %account.equity,
            buying_power = %account.buying_power,
            crypto_status = %account.crypto_status,
            "Controller started"
        );
        self.state.account = account.clone();
        self.hub.notify(TradeEvent::Started {
            symbol: self.config.symbol.clone(),
            broker: self.broker.name().to_string(),
        });
        account
    }

    /// Loop until `shutdown` resolves. Cycle failures are logged and retried.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let pause = match self.run_cycle().await {
                CycleOutcome::Skipped(reason) => {
                    warn!(?reason, "Cycle skipped, backing off");
                    self.config.retry_backoff
                }
                outcome => {
                    debug!(?outcome, "Cycle complete");
                    self.config.poll_interval
                }
            };

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, leaving the trading loop");
                    break;
                }
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let (entry, higher) = match self.fetch_series().await {
            Ok(series) => series,
            Err(e) => return CycleOutcome::Skipped(e.into()),
        };

        let Some(current) = entry.current().copied() else {
            return CycleOutcome::Skipped(SkipReason::DataUnavailable("empty entry series".into()));
        };

        if !self.state.is_new_bar(current.timestamp) {
            let exit = self.check_exit().await;
            return CycleOutcome::SameBar { exit };
        }

        let params = self.config.signal.indicator_params(self.config.timezone);
        let snapshot = match IndicatorSnapshot::compute(&entry, &params) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                return CycleOutcome::Skipped(SkipReason::IndicatorsUnavailable(e.to_string()))
            }
        };

        self.state.last_bar_timestamp = Some(current.timestamp);
        self.state
            .throttle
            .on_new_bar(current.local_date(self.config.timezone));
        self.state.account = self.refresh_account().await;

        let entry_permitted = self.state.can_enter();
        let Some(inputs) = SignalInputs::from_series(&entry, &higher, &snapshot, entry_permitted)
        else {
            return CycleOutcome::Skipped(SkipReason::InsufficientHistory(
                "need a current and prior bar on both timeframes".into(),
            ));
        };
        let evaluation = self.evaluator.evaluate(&inputs);

        StatusReport {
            now: Utc::now(),
            timezone: self.config.timezone,
            bar_time: current.datetime(),
            bar_close: current.close,
            asset: self.config.asset().to_string(),
            account: self.state.account.clone(),
            htf_bullish: evaluation.conditions.htf_bullish,
            trend_up: evaluation.conditions.trend_up,
            can_enter: entry_permitted,
            trades_today: self.state.throttle.state().trades_opened_today,
            max_trades_per_day: self.state.throttle.limits().max_trades_per_day,
        }
        .log();

        let entry_outcome = match (evaluation.signal.direction(), evaluation.signal.levels()) {
            (Some(direction), Some(levels)) => {
                Some(self.open_position(direction, levels, current.close).await)
            }
            _ => None,
        };

        let exit = self.check_exit().await;
        CycleOutcome::NewBar {
            signal: evaluation.signal,
            entry: entry_outcome,
            exit,
        }
    }

    async fn fetch_series(&self) -> Result<(BarSeries, BarSeries), DataError> {
        let cfg = &self.config;
        let entry = fetch_series(
            self.data.as_ref(),
            &cfg.symbol,
            cfg.entry_timeframe,
            cfg.entry_bar_limit,
            cfg.min_entry_bars,
        )
        .await?;
        let higher = fetch_series(
            self.data.as_ref(),
            &cfg.symbol,
            cfg.higher_timeframe,
            cfg.higher_bar_limit,
            cfg.min_higher_bars,
        )
        .await?;
        Ok((entry, higher))
    }

    /// Read account and position into a snapshot, resetting a paper balance
    /// that has fallen below the floor.
    async fn refresh_account(&self) -> AccountSnapshot {
        let mut account = match self.broker.get_account().await {
            Ok(account) => account,
            Err(e) => {
                warn!("Account query failed: {}", e);
                return AccountSnapshot::unavailable();
            }
        };

        let buying_power = account.effective_buying_power();
        if buying_power < self.config.buying_power_floor {
            warn!(
                %buying_power,
                floor = %self.config.buying_power_floor,
                "Buying power below floor, resetting paper balance"
            );
            match self.broker.reset_paper_balance().await {
                Ok(()) => {
                    tokio::time::sleep(self.config.reset_wait).await;
                    match self.broker.get_account().await {
                        Ok(refreshed) => account = refreshed,
                        Err(e) => warn!("Account query after reset failed: {}", e),
                    }
                    info!(buying_power = %account.effective_buying_power(), "Paper balance reset");
                    self.hub.notify(TradeEvent::PaperReset {
                        buying_power: account.effective_buying_power(),
                    });
                }
                Err(e) => warn!("Paper balance reset failed: {}", e),
            }
        }

        match self.broker.get_position(&self.config.symbol).await {
            Ok(position) => AccountSnapshot::from_parts(&account, position.as_ref()),
            Err(e) => {
                warn!("Position query failed: {}", e);
                let mut snapshot = AccountSnapshot::from_parts(&account, None);
                snapshot.position_side = PositionSide::Unknown;
                snapshot
            }
        }
    }

    async fn open_position(
        &mut self,
        direction: Direction,
        levels: RiskLevels,
        signal_close: f64,
    ) -> EntryOutcome {
        let quote = match self.data.fetch_latest_quote(&self.config.symbol).await {
            Ok(quote) if quote.is_valid() => quote,
            Ok(quote) => {
                warn!(?quote, "Quote has a zero side, order not placed");
                return EntryOutcome::QuoteUnavailable;
            }
            Err(e) => {
                warn!("Quote fetch failed, order not placed: {}", e);
                return EntryOutcome::QuoteUnavailable;
            }
        };

        let side = direction.entry_side();
        let entry_price = quote.entry_price(direction);
        info!(%direction, price = entry_price, "Signal fired, submitting market order");

        let request = OrderRequest::market(&self.config.symbol, side, self.config.lot_size);
        match self.broker.submit_order(request).await {
            Ok(order) => {
                self.state.throttle.record_trade();
                let risk = risk_distance(direction, signal_close, levels.stop_loss);
                self.state.tracker.open(direction, entry_price, risk);

                info!(
                    order_id = %order.id,
                    %side,
                    qty = %self.config.lot_size,
                    stop_loss = levels.stop_loss,
                    take_profit = levels.take_profit,
                    "Order accepted"
                );
                self.hub.notify(TradeEvent::TradeOpened {
                    side,
                    entry: entry_price,
                    stop_loss: levels.stop_loss,
                    take_profit: levels.take_profit,
                });

                EntryOutcome::Opened {
                    order_id: order.id,
                    direction,
                    entry_price,
                }
            }
            Err(e) => {
                error!(%side, "Order failed: {}", e);
                self.hub.notify(TradeEvent::OrderFailed {
                    side,
                    reason: e.to_string(),
                });
                EntryOutcome::OrderFailed(e.to_string())
            }
        }
    }

    async fn check_exit(&mut self) -> ExitOutcome {
        let Some(direction) = self.state.tracker.position().map(|p| p.direction) else {
            return ExitOutcome::Flat;
        };
        let symbol = self.config.symbol.clone();

        match self.broker.get_position(&symbol).await {
            Ok(Some(position)) if position.side().is_open() => {
                if let Some(price) = position.entry_price_f64() {
                    self.state.tracker.refresh_entry(price);
                }
            }
            Ok(_) => {
                info!(%direction, "Broker reports no position, tracking dropped");
                self.state.tracker.mark_flat();
                return ExitOutcome::PositionGone;
            }
            Err(e) => {
                warn!("Position query failed, treating as flat: {}", e);
                self.state.tracker.mark_flat();
                return ExitOutcome::PositionQueryFailed;
            }
        }

        let quote = match self.data.fetch_latest_quote(&symbol).await {
            Ok(quote) if quote.is_valid() => quote,
            Ok(_) => {
                warn!("Zero quote, exit check skipped");
                return ExitOutcome::NoQuote;
            }
            Err(e) => {
                warn!("Quote fetch failed, exit check skipped: {}", e);
                return ExitOutcome::NoQuote;
            }
        };

        let exit_price = quote.exit_price(direction);
        let Some(reason) = self.state.tracker.check_exit(exit_price) else {
            return ExitOutcome::Holding;
        };

        info!(%direction, %reason, price = exit_price, "Exit triggered, closing position");
        let outcome = match self.broker.close_position(&symbol).await {
            Ok(order) => {
                info!(order_id = %order.id, "Position closed");
                self.hub.notify(TradeEvent::PositionClosed {
                    direction,
                    reason,
                    exit_price,
                });
                ExitOutcome::Closed(reason)
            }
            Err(e) => {
                error!(%reason, "Close request failed: {}", e);
                self.hub.notify(TradeEvent::CloseFailed {
                    reason,
                    error: e.to_string(),
                });
                ExitOutcome::CloseFailed(reason)
            }
        };

        self.state.tracker.mark_flat();
        outcome
    }
}
