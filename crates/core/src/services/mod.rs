pub mod advice_service;
pub mod portfolio_service;
pub mod quote_service;
pub mod summary_service;
