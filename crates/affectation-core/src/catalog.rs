//! Posting catalog and its capacity-column layout.
//!
//! The catalog keeps postings in input-table order. That order fixes the
//! column blocks of the cost matrix: posting `k` owns the contiguous columns
//! `column_range(k)`, one per unit of capacity, so column indices are
//! reproducible across runs.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tracing::info;

use crate::error::{ConfigError, Result};
use crate::posting::{Category, Posting, PostingRecord};

/// Immutable set of postings retained for a run.
#[derive(Debug, Clone)]
pub struct PostingCatalog {
    postings: Vec<Posting>,
    index: HashMap<String, usize>,
    members: HashMap<Category, HashSet<usize>>,
    // column_starts[k] is the first column of posting k; last entry is the total.
    column_starts: Vec<usize>,
}

impl PostingCatalog {
    /// Builds the catalog from the raw posting table.
    ///
    /// Rows with non-positive capacity are skipped and logged. Fails on a
    /// duplicated retained name or an unrecognized category tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use affectation_core::{PostingCatalog, PostingRecord};
    ///
    /// let catalog = PostingCatalog::build(&[
    ///     PostingRecord::new("Lyon", 2, "unrestricted"),
    ///     PostingRecord::new("Metz", 1, "unrestricted"),
    ///     PostingRecord::new("Albi", 0, "unrestricted"),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(catalog.len(), 2);
    /// assert_eq!(catalog.total_capacity(), 3);
    /// ```
    pub fn build(records: &[PostingRecord]) -> Result<Self> {
        let mut postings = Vec::with_capacity(records.len());
        let mut index = HashMap::with_capacity(records.len());

        for record in records {
            let Some(posting) = Posting::from_record(record)? else {
                info!(
                    event = "posting_skipped",
                    posting = %record.name,
                    capacity = record.capacity,
                );
                continue;
            };

            if index.contains_key(&posting.name) {
                return Err(ConfigError::DuplicatePosting { name: posting.name });
            }
            index.insert(posting.name.clone(), postings.len());
            postings.push(posting);
        }

        let mut members: HashMap<Category, HashSet<usize>> = HashMap::new();
        let mut column_starts = Vec::with_capacity(postings.len() + 1);
        let mut next_column = 0usize;
        for (k, posting) in postings.iter().enumerate() {
            members.entry(posting.category).or_default().insert(k);
            column_starts.push(next_column);
            next_column += posting.capacity as usize;
        }
        column_starts.push(next_column);

        Ok(Self {
            postings,
            index,
            members,
            column_starts,
        })
    }

    /// Postings in their stable run order.
    pub fn postings(&self) -> &[Posting] {
        &self.postings
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Position of a posting in the stable order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Posting> {
        self.index_of(name).map(|k| &self.postings[k])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn capacity(&self, name: &str) -> Option<u32> {
        self.get(name).map(|p| p.capacity)
    }

    /// Returns true if the named posting exists and carries `category`.
    pub fn is_member(&self, name: &str, category: Category) -> bool {
        match (self.index_of(name), self.members.get(&category)) {
            (Some(k), Some(set)) => set.contains(&k),
            _ => false,
        }
    }

    /// Postings tagged with `category`, in stable order.
    pub fn members(&self, category: Category) -> Vec<&Posting> {
        let Some(set) = self.members.get(&category) else {
            return Vec::new();
        };
        self.postings
            .iter()
            .enumerate()
            .filter(|(k, _)| set.contains(k))
            .map(|(_, p)| p)
            .collect()
    }

    /// Sum of all capacities, i.e. the number of matching columns.
    pub fn total_capacity(&self) -> usize {
        self.column_starts.last().copied().unwrap_or(0)
    }

    /// Columns owned by the posting at `index`.
    pub fn column_range(&self, index: usize) -> Range<usize> {
        self.column_starts[index]..self.column_starts[index + 1]
    }

    /// Columns owned by the named posting.
    pub fn columns_of(&self, name: &str) -> Option<Range<usize>> {
        self.index_of(name).map(|k| self.column_range(k))
    }

    /// Posting owning a matching column.
    pub fn column_owner(&self, column: usize) -> Option<&Posting> {
        if column >= self.total_capacity() {
            return None;
        }
        // Blocks are non-empty, so the owner is the last start <= column.
        let k = self.column_starts.partition_point(|&start| start <= column) - 1;
        self.postings.get(k)
    }
}
