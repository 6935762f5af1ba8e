// This file is part of dbsync-reader.
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keyset pagination: a page is fetched by comparing the sort key against the last seen key
//! instead of skipping an offset. Compound keys compare lexicographically, hence a cursor which
//! no longer exists in the store still resumes correctly.

use dbsync_common::domain::Order;
use std::{cmp::Ordering, num::NonZeroU32};
use thiserror::Error;

/// Page size used if none is given.
pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(50) {
    Some(size) => size,
    None => unreachable!(),
};

/// The validated, positive size of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSize(NonZeroU32);

impl PageSize {
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(DEFAULT_PAGE_SIZE)
    }
}

impl From<NonZeroU32> for PageSize {
    fn from(size: NonZeroU32) -> Self {
        Self(size)
    }
}

impl TryFrom<i64> for PageSize {
    type Error = InvalidPageSizeError;

    /// Non-positive sizes are rejected, not clamped.
    fn try_from(size: i64) -> Result<Self, Self::Error> {
        u32::try_from(size)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(InvalidPageSizeError(size))
    }
}

#[derive(Debug, Error)]
#[error("invalid page size {0}, must be positive")]
pub struct InvalidPageSizeError(pub i64);

/// Paging parameters as given by a caller: the size is still unvalidated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<K> {
    pub size: Option<i64>,
    pub order: Order,
    pub cursor: Option<K>,
}

impl<K> Default for PageRequest<K> {
    fn default() -> Self {
        Self {
            size: None,
            order: Order::Asc,
            cursor: None,
        }
    }
}

impl<K> PageRequest<K> {
    pub fn new(size: i64, order: Order) -> Self {
        Self {
            size: Some(size),
            order,
            cursor: None,
        }
    }

    pub fn after(mut self, cursor: K) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Validated paging parameters for a list query sorted by keys of type `K`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<K> {
    pub size: PageSize,
    pub order: Order,
    pub cursor: Option<K>,
}

impl<K> TryFrom<PageRequest<K>> for Page<K> {
    type Error = InvalidPageSizeError;

    fn try_from(request: PageRequest<K>) -> Result<Self, Self::Error> {
        let PageRequest {
            size,
            order,
            cursor,
        } = request;

        let size = size.map(PageSize::try_from).transpose()?.unwrap_or_default();

        Ok(Self {
            size,
            order,
            cursor,
        })
    }
}

impl<K> Page<K>
where
    K: Ord,
{
    /// Whether an item with the given key belongs after the cursor of this page.
    pub fn admits(&self, key: &K) -> bool {
        self.cursor
            .as_ref()
            .is_none_or(|cursor| is_beyond(key, cursor, self.order))
    }

    /// The page following this one, given the last item of this one.
    pub fn next<T>(&self, last: &T) -> Self
    where
        T: Keyed<Key = K>,
    {
        Self {
            size: self.size,
            order: self.order,
            cursor: Some(last.key()),
        }
    }
}

/// Items of a list query, sorted by a unique key which also serves as cursor.
pub trait Keyed {
    type Key: Ord + Clone;

    fn key(&self) -> Self::Key;
}

impl Keyed for String {
    type Key = String;

    fn key(&self) -> Self::Key {
        self.clone()
    }
}

/// Whether `key` is strictly beyond `cursor` in the given order: `>` for ascending and `<` for
/// descending. Tuples compare lexicographically, i.e. the secondary field is only consulted if
/// the primary ones are equal.
pub fn is_beyond<K>(key: &K, cursor: &K, order: Order) -> bool
where
    K: Ord,
{
    match order {
        Order::Asc => key.cmp(cursor) == Ordering::Greater,
        Order::Desc => key.cmp(cursor) == Ordering::Less,
    }
}

/// Select the given page from the given items in memory, with the same semantics a store
/// applies: sort by key in the requested order, skip everything up to and including the cursor
/// and take at most the page size.
pub fn paginate<T>(items: impl IntoIterator<Item = T>, page: &Page<T::Key>) -> Vec<T>
where
    T: Keyed,
{
    let mut items = items
        .into_iter()
        .filter(|item| page.admits(&item.key()))
        .collect::<Vec<_>>();

    items.sort_by_key(|item| item.key());
    if page.order == Order::Desc {
        items.reverse();
    }
    items.truncate(page.size.get() as usize);

    items
}

#[cfg(test)]
mod tests {
    use crate::domain::{Keyed, Page, PageRequest, PageSize, is_beyond, paginate};
    use assert_matches::assert_matches;
    use dbsync_common::domain::Order;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Output {
        tx_id: u64,
        index: u32,
    }

    impl Keyed for Output {
        type Key = (u64, u32);

        fn key(&self) -> Self::Key {
            (self.tx_id, self.index)
        }
    }

    fn outputs() -> Vec<Output> {
        // Deliberately unsorted, with shared transaction IDs.
        [(351577, 0), (351576, 3), (12, 1), (351576, 2), (351576, 0), (12, 0), (99, 5)]
            .into_iter()
            .map(|(tx_id, index)| Output { tx_id, index })
            .collect()
    }

    #[test]
    fn test_page_size() {
        assert_eq!(PageSize::default().get(), 50);
        assert_matches!(PageSize::try_from(4), Ok(size) if size.get() == 4);
        assert!(PageSize::try_from(0).is_err());
        assert!(PageSize::try_from(-1).is_err());
        assert!(PageSize::try_from(i64::MAX).is_err());

        let page = Page::try_from(PageRequest::<u64>::default());
        assert_matches!(page, Ok(Page { size, order: Order::Asc, cursor: None }) if size.get() == 50);

        let page = Page::try_from(PageRequest::<u64>::new(0, Order::Desc));
        assert!(page.is_err());
    }

    #[test]
    fn test_desc_with_compound_cursor() {
        let request = PageRequest::new(4, Order::Desc).after((351576, 2));
        let page = Page::try_from(request).unwrap();

        let items = paginate(outputs(), &page);
        let keys = items.iter().map(Keyed::key).collect::<Vec<_>>();
        assert_eq!(keys, vec![(351576, 0), (99, 5), (12, 1), (12, 0)]);
        assert!(keys.iter().all(|key| *key < (351576, 2)));
    }

    #[test]
    fn test_vanished_cursor() {
        // The cursor does not exist (anymore), yet paging resumes by comparison.
        let page = Page::try_from(PageRequest::new(2, Order::Asc).after((351576, 1))).unwrap();

        let keys = paginate(outputs(), &page)
            .iter()
            .map(Keyed::key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![(351576, 2), (351576, 3)]);
    }

    #[test]
    fn test_exhaustiveness() {
        for order in [Order::Asc, Order::Desc] {
            for size in 1..=8 {
                let mut page = Page::try_from(PageRequest::new(size, order)).unwrap();
                let mut seen = vec![];

                loop {
                    let items = paginate(outputs(), &page);
                    let Some(last) = items.last() else {
                        break;
                    };
                    page = page.next(last);
                    seen.extend(items.iter().map(Keyed::key));
                }

                let mut expected = outputs().iter().map(Keyed::key).collect::<Vec<_>>();
                expected.sort();
                if order == Order::Desc {
                    expected.reverse();
                }
                assert_eq!(seen, expected, "order {order}, size {size}");
            }
        }
    }

    #[test]
    fn test_total_order() {
        let keys = outputs().iter().map(Keyed::key).collect::<Vec<_>>();
        assert_eq!(keys.iter().collect::<BTreeSet<_>>().len(), keys.len());

        for a in &keys {
            for b in &keys {
                let holds = [
                    is_beyond(a, b, Order::Asc),
                    is_beyond(a, b, Order::Desc),
                    a == b,
                ];
                assert_eq!(holds.iter().filter(|holds| **holds).count(), 1);
            }
        }
    }
}
