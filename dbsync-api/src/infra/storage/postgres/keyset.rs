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

//! Keyset pagination in SQL: the cursor is compared against the sort columns as a row value,
//! e.g. `(tx_id, index) < ($2, $3)` for descending order.

use crate::domain::Page;
use dbsync_common::domain::{ByteVec, Order};
use sqlx::{Postgres, QueryBuilder};

/// A sort key which can be bound as a row value.
pub trait SeekKey {
    /// Push the components of this key as comma separated binds.
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>);
}

impl SeekKey for u64 {
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push_bind(*self as i64);
    }
}

impl SeekKey for (u64, u32) {
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder
            .push_bind(self.0 as i64)
            .push(", ")
            .push_bind(self.1 as i64);
    }
}

impl SeekKey for String {
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push_bind(self.clone());
    }
}

impl SeekKey for (String, i128) {
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        // Quantities exceed BIGINT, hence are bound as text.
        builder
            .push_bind(self.0.clone())
            .push(", ")
            .push_bind(self.1.to_string())
            .push("::NUMERIC");
    }
}

impl SeekKey for ByteVec {
    fn push_binds(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        builder.push_bind(self.clone());
    }
}

/// Push `AND (columns) > (cursor)`, `<` for descending order, if the page has a cursor.
pub fn push_seek<K>(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], page: &Page<K>)
where
    K: SeekKey,
{
    if let Some(cursor) = &page.cursor {
        let operator = match page.order {
            Order::Asc => ">",
            Order::Desc => "<",
        };

        builder.push(format_args!(" AND ({}) {operator} (", columns.join(", ")));
        cursor.push_binds(builder);
        builder.push(")");
    }
}

/// Push `ORDER BY` with all given columns in the given order.
pub fn push_order_by(builder: &mut QueryBuilder<'_, Postgres>, columns: &[&str], order: Order) {
    let columns = columns
        .iter()
        .map(|column| format!("{column} {}", order.sql()))
        .collect::<Vec<_>>()
        .join(", ");

    builder.push(format_args!(" ORDER BY {columns}"));
}

pub fn push_limit<K>(builder: &mut QueryBuilder<'_, Postgres>, page: &Page<K>) {
    builder.push(" LIMIT ").push_bind(page.size.get() as i64);
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{Page, PageRequest},
        infra::storage::postgres::keyset::{push_limit, push_order_by, push_seek},
    };
    use dbsync_common::domain::Order;
    use sqlx::{Postgres, QueryBuilder};

    #[test]
    fn test_seek() {
        let page = Page::try_from(PageRequest::new(4, Order::Desc).after((351576_u64, 2_u32)))
            .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM tx_out WHERE address = ");
        builder.push_bind("addr1");
        push_seek(&mut builder, &["tx_out.tx_id", "tx_out.index"], &page);
        push_order_by(&mut builder, &["tx_out.tx_id", "tx_out.index"], page.order);
        push_limit(&mut builder, &page);

        assert_eq!(
            builder.sql(),
            "SELECT * FROM tx_out WHERE address = $1 AND (tx_out.tx_id, tx_out.index) < ($2, $3) \
             ORDER BY tx_out.tx_id DESC, tx_out.index DESC LIMIT $4"
        );
    }

    #[test]
    fn test_no_cursor() {
        let page = Page::<(String, i128)>::try_from(PageRequest::default()).unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM owner WHERE TRUE");
        push_seek(&mut builder, &["address", "quantity"], &page);
        push_limit(&mut builder, &page);
        assert_eq!(builder.sql(), "SELECT * FROM owner WHERE TRUE LIMIT $1");

        let page = Page::try_from(
            PageRequest::new(10, Order::Asc).after(("addr1".to_string(), 5_i128)),
        )
        .unwrap();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM owner WHERE TRUE");
        push_seek(&mut builder, &["address", "quantity"], &page);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM owner WHERE TRUE AND (address, quantity) > ($1, $2::NUMERIC)"
        );
    }
}
