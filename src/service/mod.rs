pub mod account;
pub mod aggregator;
pub mod amount;
pub mod customer;
pub mod entry;
pub mod export;
pub mod portal;
pub mod rate;
pub mod validation;

pub use account::AccountService;
pub use aggregator::SummaryService;
pub use customer::CustomerService;
pub use entry::EntryService;
pub use portal::PortalService;
pub use rate::RateService;
