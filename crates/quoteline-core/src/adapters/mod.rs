mod finnhub;

pub use finnhub::FinnhubAdapter;
