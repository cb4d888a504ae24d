pub mod account;
pub mod customer;
pub mod entry;
pub mod rate;
pub mod summary;

pub use account::{Dairy, NewProfile, PortalIdentity, Role, UserProfile};
pub use customer::{Customer, CustomerFilter, CustomerStatus, NewCustomer, UpdateCustomer};
pub use entry::{
    EntryChanges, EntryFilter, EntryOrder, EntryWithCustomer, MilkEntry, NewMilkEntry, RecordEntryInput, Shift,
    UpdateEntryInput,
};
pub use rate::{Rate, ResolvedRate, SetRate};
pub use summary::{
    DailySummary, DateRangeSummary, MonthlySummary, Summary, SummaryScope, Totals, WeeklySummary,
};
