//! Types for the PostgrestClient

/// Count options for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountOption {
    /// Exact count
    Exact,
}

impl CountOption {
    /// Convert the option to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CountOption::Exact => "exact",
        }
    }
}

/// Options for returning data from writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOption {
    /// Return the written rows
    Representation,

    /// Return nothing
    Minimal,
}

impl ReturnOption {
    /// Value of the `Prefer` header
    pub fn prefer(&self) -> &'static str {
        match self {
            ReturnOption::Representation => "return=representation",
            ReturnOption::Minimal => "return=minimal",
        }
    }
}

/// One page of rows plus the total reported by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows of this page
    pub items: Vec<T>,

    /// Total number of matching rows, when a count was requested
    pub total: Option<u64>,

    /// Offset of the first row
    pub offset: u32,

    /// Requested page size
    pub limit: u32,
}

impl<T> Page<T> {
    /// Whether rows remain after this page
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => u64::from(self.offset) + (self.items.len() as u64) < total,
            None => self.items.len() as u32 >= self.limit,
        }
    }

    /// Offset of the next page
    pub fn next_offset(&self) -> u32 {
        self.offset + self.items.len() as u32
    }

    /// Whether the page holds no rows
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
