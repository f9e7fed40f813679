use std::num::NonZeroU32;

/// Number of pages needed to cover `total_items` with pages of `page_size`.
#[must_use]
pub fn page_count(total_items: u64, page_size: NonZeroU32) -> u64 {
    total_items.div_ceil(u64::from(page_size.get()))
}

/// One window over a scope's execution collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub index: u64,
    /// Row offset of the first execution in this page.
    pub offset: u64,
    /// Maximum number of executions in this page.
    pub limit: NonZeroU32,
}

/// Forward-only sequence of pages for one scope.
///
/// The page count is fixed from the execution count taken when the scope
/// starts. The sequence yields `page_count + 1` pages: the trailing page
/// drains executions that appeared after the count was taken, and is usually
/// empty.
#[derive(Debug, Clone)]
pub struct PageSequence {
    next_index: Option<u64>,
    last_index: u64,
    page_size: NonZeroU32,
}

impl PageSequence {
    /// Creates the page sequence for a scope holding `total_items` executions.
    #[must_use]
    pub fn new(total_items: u64, page_size: NonZeroU32) -> Self {
        Self {
            next_index: Some(0),
            last_index: page_count(total_items, page_size),
            page_size,
        }
    }

    /// Returns the page count derived from the initial execution count.
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.last_index
    }
}

impl Iterator for PageSequence {
    type Item = PageRequest;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.next_index?;
        self.next_index = index
            .checked_add(1)
            .filter(|next| *next <= self.last_index);

        Some(PageRequest {
            index,
            offset: index.saturating_mul(u64::from(self.page_size.get())),
            limit: self.page_size,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.next_index.map_or(0, |next| {
            (self.last_index - next).saturating_add(1)
        });
        match usize::try_from(remaining) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}
