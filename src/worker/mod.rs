pub mod ticker_worker;

pub use ticker_worker::run as run_ticker_worker;
