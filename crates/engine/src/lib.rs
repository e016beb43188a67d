pub mod binance;
pub mod candidates;
pub mod cooldown;
pub mod dispatch;
pub mod lifecycle;
pub mod scanner;
pub mod store;

pub use binance::BinanceFuturesClient;
pub use candidates::CandidateSelector;
pub use cooldown::CooldownGate;
pub use dispatch::{format_alert, Dispatcher};
pub use lifecycle::{Engine, EngineHandle};
pub use scanner::{ScanReport, Scanner, SymbolOutcome};
pub use store::SqliteSignalStore;
