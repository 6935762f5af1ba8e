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

use sqlx::{Database, Decode, Type, error::BoxDynError};
use std::num::ParseIntError;

/// A helper to use `Option<T>` where T does not implement `sqlx::Type` but a `TryFrom` into a
/// supported type with `sqlx::FromRow` like this:
/// ```ignore
/// #[sqlx(try_from = "SqlxOption<i64>")]
/// pub previous_block_no: Option<u64>,
/// ```
pub struct SqlxOption<T>(Option<T>);

impl<T> From<SqlxOption<T>> for Option<T> {
    fn from(value: SqlxOption<T>) -> Self {
        value.0
    }
}

impl<T, D> Type<D> for SqlxOption<T>
where
    T: Type<D>,
    D: Database,
{
    fn type_info() -> D::TypeInfo {
        Option::<T>::type_info()
    }

    fn compatible(ty: &D::TypeInfo) -> bool {
        T::compatible(ty)
    }
}

impl<'r, T, D> Decode<'r, D> for SqlxOption<T>
where
    T: Decode<'r, D>,
    D: Database,
{
    fn decode(value: D::ValueRef<'r>) -> Result<Self, BoxDynError> {
        let option = Option::<T>::decode(value)?;
        Ok(Self(option))
    }
}

impl TryFrom<SqlxOption<i64>> for Option<u64> {
    type Error = BoxDynError;

    fn try_from(value: SqlxOption<i64>) -> Result<Self, Self::Error> {
        let value = value.0.map(TryInto::try_into).transpose()?;
        Ok(value)
    }
}

/// A `NUMERIC` column selected as `TEXT`, e.g. `tx_out.value::TEXT`. The db-sync lovelace and
/// quantity domains exceed `BIGINT`, hence they are decoded from their decimal representation:
/// ```ignore
/// #[sqlx(try_from = "NumericText")]
/// pub quantity: i128,
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Type)]
#[sqlx(transparent)]
pub struct NumericText(pub String);

impl TryFrom<NumericText> for u64 {
    type Error = ParseIntError;

    fn try_from(value: NumericText) -> Result<Self, Self::Error> {
        value.0.parse()
    }
}

impl TryFrom<NumericText> for i128 {
    type Error = ParseIntError;

    fn try_from(value: NumericText) -> Result<Self, Self::Error> {
        value.0.parse()
    }
}

impl TryFrom<SqlxOption<NumericText>> for Option<u64> {
    type Error = ParseIntError;

    fn try_from(value: SqlxOption<NumericText>) -> Result<Self, Self::Error> {
        value.0.map(TryInto::try_into).transpose()
    }
}

impl TryFrom<SqlxOption<NumericText>> for Option<i128> {
    type Error = ParseIntError;

    fn try_from(value: SqlxOption<NumericText>) -> Result<Self, Self::Error> {
        value.0.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
mod tests {
    use crate::infra::sqlx::{NumericText, SqlxOption};
    use assert_matches::assert_matches;

    #[test]
    fn test_numeric_text() {
        let lovelace = u64::try_from(NumericText("45000000000000000".to_string()));
        assert_matches!(lovelace, Ok(45_000_000_000_000_000));

        let quantity = i128::try_from(NumericText("-18446744073709551615".to_string()));
        assert_matches!(quantity, Ok(-18_446_744_073_709_551_615));

        assert!(u64::try_from(NumericText("1.5".to_string())).is_err());
        assert!(u64::try_from(NumericText("-1".to_string())).is_err());
    }

    #[test]
    fn test_sqlx_option() {
        let deposit = Option::<u64>::try_from(SqlxOption(Some(NumericText("2000000".into()))));
        assert_matches!(deposit, Ok(Some(2_000_000)));

        let deposit = Option::<u64>::try_from(SqlxOption::<NumericText>(None));
        assert_matches!(deposit, Ok(None));

        let fees = Option::<u64>::try_from(SqlxOption(Some(-1_i64)));
        assert!(fees.is_err());
    }
}
