//! In-memory ticket store with secondary indexes
//!
//! Tickets live in a primary map keyed by id. Category, priority and status each have a
//! secondary index (value → set of ids) kept in step with the primary map by every write.
//!
//! The store is a plain `&mut self` structure. Callers that share it between requests wrap it
//! in a lock and hold the write guard for the whole of each write call, so an observer never
//! sees a ticket indexed under a mix of old and new values.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use caseflow_common::time::next_timestamp;

use crate::models::{Category, NewTicket, Priority, Status, Ticket, TicketFilters, TicketPatch};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Configured `max_tickets` reached
    #[error("Ticket store is full (limit {limit})")]
    CapacityExceeded { limit: usize },
}

/// Value → ids index for one ticket field
#[derive(Debug)]
struct FieldIndex<K> {
    ids: HashMap<K, HashSet<String>>,
}

impl<K: Copy + Eq + Hash> FieldIndex<K> {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
        }
    }

    fn insert(&mut self, key: K, id: &str) {
        self.ids.entry(key).or_default().insert(id.to_string());
    }

    fn remove(&mut self, key: K, id: &str) {
        if let Some(set) = self.ids.get_mut(&key) {
            set.remove(id);
            if set.is_empty() {
                self.ids.remove(&key);
            }
        }
    }

    /// Ids under `key`, `None` when nothing is indexed there
    fn get(&self, key: K) -> Option<&HashSet<String>> {
        self.ids.get(&key).filter(|set| !set.is_empty())
    }

    fn clear(&mut self) {
        self.ids.clear();
    }
}

#[derive(Debug)]
pub struct TicketStore {
    tickets: HashMap<String, Ticket>,
    by_category: FieldIndex<Category>,
    by_priority: FieldIndex<Priority>,
    by_status: FieldIndex<Status>,
    max_tickets: Option<usize>,
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketStore {
    /// Unbounded store
    pub fn new() -> Self {
        Self::with_capacity_limit(None)
    }

    /// Store that refuses new tickets once `max_tickets` are held
    pub fn with_capacity_limit(max_tickets: Option<usize>) -> Self {
        Self {
            tickets: HashMap::new(),
            by_category: FieldIndex::new(),
            by_priority: FieldIndex::new(),
            by_status: FieldIndex::new(),
            max_tickets,
        }
    }

    /// Store a new ticket under a fresh id, applying category/priority/status defaults
    pub fn create(&mut self, new: NewTicket) -> Result<Ticket, StoreError> {
        self.ensure_room()?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::new_v4().to_string(),
            customer_id: new.customer_id,
            customer_email: new.customer_email,
            customer_name: new.customer_name,
            subject: new.subject,
            description: new.description,
            category: new.category.unwrap_or_default(),
            priority: new.priority.unwrap_or_default(),
            status: new.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            assigned_to: new.assigned_to,
            tags: new.tags,
            metadata: new.metadata,
            classification: new.classification,
        };

        debug!(ticket_id = %ticket.id, category = %ticket.category, "Ticket created");
        self.insert(ticket.clone());
        Ok(ticket)
    }

    /// Store a fully formed ticket under its own id.
    ///
    /// There is no duplicate guard: an existing ticket with the same id is replaced, and its
    /// index entries are dropped first. Replacing never counts against the capacity limit.
    pub fn create_with_id(&mut self, ticket: Ticket) -> Result<Ticket, StoreError> {
        match self.tickets.remove(&ticket.id) {
            Some(previous) => {
                debug!(ticket_id = %previous.id, "Replacing ticket with duplicate id");
                self.unindex(&previous);
            }
            None => self.ensure_room()?,
        }

        self.insert(ticket.clone());
        Ok(ticket)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Ticket> {
        self.tickets.get(id)
    }

    /// Every stored ticket, in no particular order
    pub fn find_all(&self) -> Vec<Ticket> {
        self.tickets.values().cloned().collect()
    }

    /// Tickets matching every present filter.
    ///
    /// Indexed filters (category, priority, status) intersect their id sets, smallest first;
    /// customer_id and assigned_to are then checked on the surviving candidates.
    pub fn find_by_filters(&self, filters: &TicketFilters) -> Vec<Ticket> {
        let mut sets: Vec<&HashSet<String>> = Vec::with_capacity(3);

        if let Some(category) = filters.category {
            match self.by_category.get(category) {
                Some(ids) => sets.push(ids),
                None => return Vec::new(),
            }
        }
        if let Some(priority) = filters.priority {
            match self.by_priority.get(priority) {
                Some(ids) => sets.push(ids),
                None => return Vec::new(),
            }
        }
        if let Some(status) = filters.status {
            match self.by_status.get(status) {
                Some(ids) => sets.push(ids),
                None => return Vec::new(),
            }
        }

        let candidates: Vec<&Ticket> = if sets.is_empty() {
            self.tickets.values().collect()
        } else {
            sets.sort_by_key(|ids| ids.len());
            let (smallest, rest) = (sets[0], &sets[1..]);
            smallest
                .iter()
                .filter(|id| rest.iter().all(|other| other.contains(*id)))
                .filter_map(|id| self.tickets.get(id))
                .collect()
        };

        candidates
            .into_iter()
            .filter(|t| {
                filters
                    .customer_id
                    .as_deref()
                    .map_or(true, |customer_id| t.customer_id == customer_id)
            })
            .filter(|t| {
                filters
                    .assigned_to
                    .as_deref()
                    .map_or(true, |assignee| t.assigned_to.as_deref() == Some(assignee))
            })
            .cloned()
            .collect()
    }

    /// Apply `patch` to the ticket with `id`; `None` when absent.
    ///
    /// `TicketPatch` has no id, customer_id or created_at fields, so those never change.
    /// `updated_at` always moves forward.
    pub fn update(&mut self, id: &str, patch: TicketPatch) -> Option<Ticket> {
        let mut ticket = self.tickets.remove(id)?;
        self.unindex(&ticket);

        let previous_update = ticket.updated_at;
        patch.apply_to(&mut ticket);
        ticket.updated_at = next_timestamp(previous_update);

        debug!(
            ticket_id = %ticket.id,
            category = %ticket.category,
            priority = %ticket.priority,
            status = %ticket.status,
            "Ticket updated"
        );
        self.insert(ticket.clone());
        Some(ticket)
    }

    /// Remove the ticket with `id`; false when absent
    pub fn delete(&mut self, id: &str) -> bool {
        match self.tickets.remove(id) {
            Some(ticket) => {
                self.unindex(&ticket);
                debug!(ticket_id = %id, "Ticket deleted");
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.tickets.clear();
        self.by_category.clear();
        self.by_priority.clear();
        self.by_status.clear();
    }

    pub fn count(&self) -> usize {
        self.tickets.len()
    }

    fn ensure_room(&self) -> Result<(), StoreError> {
        match self.max_tickets {
            Some(limit) if self.tickets.len() >= limit => {
                Err(StoreError::CapacityExceeded { limit })
            }
            _ => Ok(()),
        }
    }

    fn insert(&mut self, ticket: Ticket) {
        self.index(&ticket);
        self.tickets.insert(ticket.id.clone(), ticket);
    }

    fn index(&mut self, ticket: &Ticket) {
        self.by_category.insert(ticket.category, &ticket.id);
        self.by_priority.insert(ticket.priority, &ticket.id);
        self.by_status.insert(ticket.status, &ticket.id);
    }

    fn unindex(&mut self, ticket: &Ticket) {
        self.by_category.remove(ticket.category, &ticket.id);
        self.by_priority.remove(ticket.priority, &ticket.id);
        self.by_status.remove(ticket.status, &ticket.id);
    }
}
