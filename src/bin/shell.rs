//! Interactive order book shell.
//!
//! Newline-delimited commands over stdin:
//!
//! ```text
//! A <side> <orderType> <price> <quantity> [orderId]
//! C <orderId>
//! M <orderId> <side> <price> <quantity>
//! S | H | Q
//! ```
//!
//! Order ids are auto-assigned from 1000 when omitted. Each mutating command
//! reports the core book latency in nanoseconds.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Instant;

use crossterm::style::Stylize;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

use matchbook::{OrderBook, OrderRequest, OrderType, Side, Trade, MARKET_BUY_PRICE, PRICE_SCALE};

#[derive(Debug, Error)]
enum ParseError {
    #[error("invalid command; type 'help' for available commands")]
    UnknownCommand,
    #[error("{0} command requires: {1}")]
    Usage(&'static str, &'static str),
    #[error("unknown side: {0} (use B/Buy or S/Sell)")]
    BadSide(String),
    #[error("unknown order type: {0} (GTC, GFD, FAK, FOK, MKT)")]
    BadType(String),
    #[error("invalid number: {0}")]
    BadNumber(String),
    #[error("invalid price: {0}")]
    BadPrice(String),
}

enum Action {
    Add {
        side: Side,
        order_type: OrderType,
        price: u64,
        qty: u32,
        id: Option<u64>,
    },
    Cancel {
        id: u64,
    },
    Modify {
        id: u64,
        side: Side,
        price: u64,
        qty: u32,
    },
    Show,
    Help,
    Quit,
}

fn parse_side(token: &str) -> Result<Side, ParseError> {
    match token {
        "B" | "Buy" | "buy" => Ok(Side::Buy),
        "S" | "Sell" | "sell" => Ok(Side::Sell),
        other => Err(ParseError::BadSide(other.to_string())),
    }
}

fn parse_order_type(token: &str) -> Result<OrderType, ParseError> {
    match token {
        "GTC" | "GoodTillCancel" => Ok(OrderType::GoodTillCancel),
        "GFD" | "GoodForDay" => Ok(OrderType::GoodForDay),
        "FAK" | "FillAndKill" => Ok(OrderType::FillAndKill),
        "FOK" | "FillOrKill" => Ok(OrderType::FillOrKill),
        "MKT" | "Market" => Ok(OrderType::Market),
        other => Err(ParseError::BadType(other.to_string())),
    }
}

fn parse_number<T: std::str::FromStr>(token: &str) -> Result<T, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::BadNumber(token.to_string()))
}

/// Parse a decimal price string into the fixed-point representation.
fn parse_price(token: &str) -> Result<u64, ParseError> {
    let value: Decimal = token
        .parse()
        .map_err(|_| ParseError::BadPrice(token.to_string()))?;
    if value.is_sign_negative() {
        return Err(ParseError::BadPrice(token.to_string()));
    }
    (value * Decimal::from(PRICE_SCALE))
        .to_u64()
        .ok_or_else(|| ParseError::BadPrice(token.to_string()))
}

fn fmt_price(price: u64) -> String {
    match price {
        MARKET_BUY_PRICE => "MKT".to_string(),
        _ => format!("{:.2}", price as f64 / PRICE_SCALE as f64),
    }
}

fn parse_command(input: &str) -> Result<Action, ParseError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ParseError::UnknownCommand);
    }

    match tokens[0].to_lowercase().as_str() {
        "a" | "add" => {
            if tokens.len() < 5 || tokens.len() > 6 {
                return Err(ParseError::Usage(
                    "Add",
                    "A <side> <orderType> <price> <quantity> [orderId]",
                ));
            }
            Ok(Action::Add {
                side: parse_side(tokens[1])?,
                order_type: parse_order_type(tokens[2])?,
                price: parse_price(tokens[3])?,
                qty: parse_number(tokens[4])?,
                id: tokens.get(5).copied().map(parse_number).transpose()?,
            })
        }
        "c" | "cancel" => {
            if tokens.len() != 2 {
                return Err(ParseError::Usage("Cancel", "C <orderId>"));
            }
            Ok(Action::Cancel {
                id: parse_number(tokens[1])?,
            })
        }
        "m" | "modify" => {
            if tokens.len() != 5 {
                return Err(ParseError::Usage(
                    "Modify",
                    "M <orderId> <side> <price> <quantity>",
                ));
            }
            Ok(Action::Modify {
                id: parse_number(tokens[1])?,
                side: parse_side(tokens[2])?,
                price: parse_price(tokens[3])?,
                qty: parse_number(tokens[4])?,
            })
        }
        "s" | "show" => Ok(Action::Show),
        "h" | "help" => Ok(Action::Help),
        "q" | "quit" | "exit" => Ok(Action::Quit),
        _ => Err(ParseError::UnknownCommand),
    }
}

struct ShellApp {
    book: OrderBook,
    next_order_id: u64,
}

impl ShellApp {
    fn new() -> Self {
        Self {
            book: OrderBook::default(),
            next_order_id: 1000,
        }
    }

    fn show_help(&self) {
        println!("\n{}", "=== Order Book Commands ===".cyan().bold());
        println!(
            "{} - Add order (orderId optional)",
            "A <side> <orderType> <price> <quantity> [orderId]".green()
        );
        println!("{}                                 - Cancel order", "C <orderId>".red());
        println!(
            "{}             - Modify order",
            "M <orderId> <side> <price> <quantity>".yellow()
        );
        println!("{}                                           - Show order book", "S".blue());
        println!("{}                                           - Show help", "H".magenta());
        println!("{}                                           - Quit\n", "Q".white());
        println!("{} {}/Buy, {}/Sell", "Sides:".bold(), "B".green(), "S".red());
        println!(
            "{} GTC/GoodTillCancel, GFD/GoodForDay, FAK/FillAndKill, FOK/FillOrKill, MKT/Market",
            "Order Types:".bold()
        );
        println!("{}", "Examples:".bold());
        println!(
            "  {}      - Add buy order at price 100.50, quantity 50 (auto ID)",
            "A B GTC 100.50 50".green()
        );
        println!(
            "  {}      - Add market sell order, quantity 25, ID 1002",
            "A S MKT 0 25 1002".green()
        );
        println!("  {}                 - Cancel order ID 1001", "C 1001".red());
        println!(
            "  {}     - Modify order 1001 to buy at 105.25 with quantity 60\n",
            "M 1001 B 105.25 60".yellow()
        );
        println!(
            "{} {}\n",
            "Next Available ID:".bold(),
            self.next_order_id.to_string().cyan()
        );
    }

    fn show_book(&self) {
        let snapshot = self.book.snapshot();

        println!("\n{}", "=== Order Book Status ===".cyan().bold());
        println!(
            "{} {}",
            "Total Orders:".bold(),
            self.book.size().to_string().yellow()
        );
        println!(
            "{} {}{} {}",
            "Bid Levels:".bold(),
            snapshot.bids.len().to_string().green(),
            ", Ask Levels:".bold(),
            snapshot.asks.len().to_string().red()
        );
        println!(
            "{} {}\n",
            "Next Available ID:".bold(),
            self.next_order_id.to_string().cyan()
        );

        println!(
            "{} | {}",
            format!("{:>14}", "BIDS").green().bold(),
            format!("{:<14}", "ASKS").red().bold()
        );
        println!(
            "{} | {}",
            format!("{:>8} {:>5}", "Price", "Qty").green(),
            format!("{:<8} {:<5}", "Price", "Qty").red()
        );
        println!("{}", "------------------------------".white());

        let rows = snapshot.bids.len().max(snapshot.asks.len());
        for i in 0..rows {
            let left = snapshot
                .bids
                .get(i)
                .map(|level| format!("{:>8} {:>5}", fmt_price(level.price), level.quantity))
                .unwrap_or_else(|| " ".repeat(14));
            let right = snapshot
                .asks
                .get(i)
                .map(|level| format!("{:<8} {:<5}", fmt_price(level.price), level.quantity))
                .unwrap_or_default();
            println!("{} | {}", left.green(), right.red());
        }
        println!();
    }

    fn show_trades(&self, trades: &[Trade]) {
        if trades.is_empty() {
            println!("{}", "No trades executed.".yellow());
            return;
        }

        println!(
            "{}",
            format!("Trades executed ({}):", trades.len()).magenta().bold()
        );
        for trade in trades {
            println!(
                "{}",
                format!(
                    "Trade: buy order #{} matched with sell order #{} at price {} and quantity {}",
                    trade.buy.id,
                    trade.sell.id,
                    fmt_price(trade.price),
                    trade.qty
                )
                .cyan()
            );
        }
    }

    fn show_timing(&self, elapsed_ns: u128) {
        let mut line = format!("Core book time: {elapsed_ns} ns");
        if elapsed_ns >= 1000 {
            line.push_str(&format!(" ({:.2} us)", elapsed_ns as f64 / 1000.0));
        }
        println!("{}", line.blue());
    }

    fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Add {
                side,
                order_type,
                price,
                qty,
                id,
            } => {
                let id = match id {
                    Some(id) => {
                        // Keep the auto counter ahead of manually chosen ids
                        if id >= self.next_order_id {
                            self.next_order_id = id + 1;
                        }
                        id
                    }
                    None => {
                        let id = self.next_order_id;
                        self.next_order_id += 1;
                        id
                    }
                };
                let request = OrderRequest {
                    id,
                    side,
                    order_type,
                    price,
                    qty,
                };

                let start = Instant::now();
                let trades = self.book.add_order(request);
                let elapsed = start.elapsed().as_nanos();

                println!("{}", format!("Order {id} added successfully.").green());
                self.show_trades(&trades);
                self.show_timing(elapsed);
            }
            Action::Cancel { id } => {
                let start = Instant::now();
                self.book.cancel_order(id);
                let elapsed = start.elapsed().as_nanos();

                println!("{}", format!("Order {id} cancelled successfully.").red());
                self.show_timing(elapsed);
            }
            Action::Modify {
                id,
                side,
                price,
                qty,
            } => {
                let start = Instant::now();
                let trades = self.book.modify_order(id, side, price, qty);
                let elapsed = start.elapsed().as_nanos();

                println!("{}", format!("Order {id} modified successfully.").yellow());
                self.show_trades(&trades);
                self.show_timing(elapsed);
            }
            Action::Show => self.show_book(),
            Action::Help => self.show_help(),
            Action::Quit => {
                println!("{}", "Goodbye!".cyan());
                return false;
            }
        }
        println!();
        true
    }

    fn run(&mut self) -> io::Result<()> {
        println!("{}", "=== Order Book Shell ===".cyan().bold());
        println!("{}", "Type 'help' or 'h' for commands.".yellow());
        println!(
            "{} {}\n",
            "Next Available ID:".bold(),
            self.next_order_id.to_string().cyan()
        );

        let stdin = io::stdin();
        let mut input = String::new();

        loop {
            print!(
                "{}{}{} ",
                "book[".bold(),
                self.next_order_id.to_string().cyan(),
                "]>".bold()
            );
            io::stdout().flush()?;

            input.clear();
            if stdin.lock().read_line(&mut input)? == 0 {
                // stdin closed; leave as if quit
                println!();
                return Ok(());
            }
            if input.trim().is_empty() {
                continue;
            }

            match parse_command(&input) {
                Ok(action) => {
                    if !self.dispatch(action) {
                        return Ok(());
                    }
                }
                Err(err) => println!("{}\n", format!("Error: {err}").red()),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut app = ShellApp::new();
    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Fatal error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_with_auto_id() {
        let action = parse_command("A B GTC 100.50 50").unwrap();
        match action {
            Action::Add {
                side,
                order_type,
                price,
                qty,
                id,
            } => {
                assert_eq!(side, Side::Buy);
                assert_eq!(order_type, OrderType::GoodTillCancel);
                assert_eq!(price, 1_005_000);
                assert_eq!(qty, 50);
                assert_eq!(id, None);
            }
            _ => panic!("expected Add"),
        }
    }

    #[test]
    fn test_parse_add_with_explicit_id() {
        let action = parse_command("add Sell FOK 99.9999 25 1002").unwrap();
        match action {
            Action::Add {
                side,
                order_type,
                price,
                id,
                ..
            } => {
                assert_eq!(side, Side::Sell);
                assert_eq!(order_type, OrderType::FillOrKill);
                assert_eq!(price, 999_999);
                assert_eq!(id, Some(1002));
            }
            _ => panic!("expected Add"),
        }
    }

    #[test]
    fn test_parse_cancel_and_modify() {
        assert!(matches!(
            parse_command("C 1001").unwrap(),
            Action::Cancel { id: 1001 }
        ));
        assert!(matches!(
            parse_command("M 1001 B 105.25 60").unwrap(),
            Action::Modify {
                id: 1001,
                side: Side::Buy,
                price: 1_052_500,
                qty: 60,
            }
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_command("X 1 2 3").is_err());
        assert!(parse_command("A B GTC").is_err());
        assert!(parse_command("A B GTC -5 50").is_err());
        assert!(parse_command("A Q GTC 100 50").is_err());
        assert!(parse_command("A B XXX 100 50").is_err());
        assert!(parse_command("C notanumber").is_err());
    }

    #[test]
    fn test_case_insensitive_verbs() {
        assert!(matches!(parse_command("s").unwrap(), Action::Show));
        assert!(matches!(parse_command("SHOW").unwrap(), Action::Show));
        assert!(matches!(parse_command("Quit").unwrap(), Action::Quit));
        assert!(matches!(parse_command("exit").unwrap(), Action::Quit));
    }
}
