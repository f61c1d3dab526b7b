//! Trade lifecycle events and their rendered notifications.

use rust_decimal::Decimal;
use trading_core::types::{Direction, Notification, Side};
use trading_risk::ExitReason;

/// Something worth telling a human about.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeEvent {
    Started {
        symbol: String,
        broker: String,
    },
    TradeOpened {
        side: Side,
        entry: f64,
        stop_loss: f64,
        take_profit: f64,
    },
    OrderFailed {
        side: Side,
        reason: String,
    },
    PositionClosed {
        direction: Direction,
        reason: ExitReason,
        exit_price: f64,
    },
    CloseFailed {
        reason: ExitReason,
        error: String,
    },
    PaperReset {
        buying_power: Decimal,
    },
}

impl TradeEvent {
    /// Email subject / HTML body / chat text for this event.
    pub fn render(&self) -> Notification {
        match self {
            TradeEvent::Started { symbol, broker } => Notification::new(
                "Bot Started",
                format!(
                    "<h2>{} bot started</h2><p>Broker: {}<br>Running 24/7</p>",
                    symbol, broker
                ),
                format!("{} bot started on {}", symbol, broker),
            ),
            TradeEvent::TradeOpened {
                side,
                entry,
                stop_loss,
                take_profit,
            } => Notification::new(
                format!("TRADE OPENED \u{2013} {}", side),
                format!(
                    "<h2>New {}</h2><p>Entry ~{}<br>SL {}<br>TP {}</p>",
                    side,
                    price(*entry),
                    price(*stop_loss),
                    price(*take_profit)
                ),
                format!(
                    "TRADE OPENED {} @ ~{} | SL {} | TP {}",
                    side,
                    price(*entry),
                    price(*stop_loss),
                    price(*take_profit)
                ),
            ),
            TradeEvent::OrderFailed { side, reason } => Notification::new(
                format!("ORDER FAILED \u{2013} {}", side),
                format!("<h2>{} order failed</h2><p>{}</p>", side, escape(reason)),
                format!("ORDER FAILED {}: {}", side, reason),
            ),
            TradeEvent::PositionClosed {
                direction,
                reason,
                exit_price,
            } => Notification::new(
                format!("{} HIT \u{2013} {}", reason, direction),
                format!(
                    "<h2>{} hit</h2><p>{} closed @ {}</p>",
                    reason,
                    direction,
                    price(*exit_price)
                ),
                format!("{} HIT @ {} ({} closed)", reason, price(*exit_price), direction),
            ),
            TradeEvent::CloseFailed { reason, error } => Notification::new(
                "CLOSE FAILED",
                format!(
                    "<h2>Close request failed</h2><p>Trigger: {}<br>{}</p><p>Position is no longer tracked locally; check the account.</p>",
                    reason,
                    escape(error)
                ),
                format!("CLOSE FAILED after {}: {}", reason, error),
            ),
            TradeEvent::PaperReset { buying_power } => Notification::new(
                "Paper Account Reset",
                format!(
                    "<h2>Balance Reset</h2><p>Buying power now ${}</p><p>Bot ready!</p>",
                    buying_power.round_dp(0)
                ),
                format!("Paper account reset, buying power ${}", buying_power.round_dp(0)),
            ),
        }
    }
}

/// `64250.5` -> `64,250.50`
pub fn price(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
