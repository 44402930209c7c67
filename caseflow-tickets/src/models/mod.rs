//! Data models for the ticket service

pub mod import;
pub mod ticket;

pub use import::{FileType, ImportResult, RowError};
pub use ticket::{
    Category, ClassificationData, DeviceType, NewTicket, Priority, Source, Status, Ticket,
    TicketFilters, TicketMetadata, TicketPatch, UnknownVariant,
};
