//! Row-to-object mapping.
//!
//! [`map_row`] populates a [`Reflect`] type from a row by matching column
//! names against the type's members, ignoring case. Columns are applied in
//! row order, so when a join produces two columns with the same name the
//! later one wins. Members with no matching column keep their default value.
//!
//! [`map_row_dynamic`] copies a row into a [`DynamicObject`] without any
//! type coercion.
//!
//! ## Scalars
//!
//! A single-column row mapped into a scalar type (`i64`, `String`,
//! `Option<Uuid>`...) is converted directly without a member lookup. A
//! single-column row that assigns no member falls back to the same direct
//! conversion, which is how newtype wrappers are read from scalar queries.

use std::marker::PhantomData;

use rowbind_types::SqlValue;
use tracing::trace;

use crate::dynamic::DynamicObject;
use crate::error::{Error, Result};
use crate::metadata_cache::TypeDescriptorCache;
use crate::reflect::Reflect;
use crate::row::RowSource;

static NULL: SqlValue = SqlValue::Null;

fn value_at<R: RowSource + ?Sized>(row: &R, index: usize) -> &SqlValue {
    row.value(index).unwrap_or(&NULL)
}

/// Map a row into a new instance of `T` using the process-wide descriptor cache.
///
/// # Errors
///
/// Returns [`Error::Conversion`] when a column value cannot be converted to
/// the matching member's declared type, [`Error::MemberAssignment`] when a
/// converted value cannot be written, and [`Error::Type`] when a direct
/// scalar conversion fails.
///
/// # Example
///
/// ```rust
/// use rowbind::{SqlValue, map_row};
///
/// let count: i64 = map_row(&[("COUNT(*)", SqlValue::Int(3))]).unwrap();
/// assert_eq!(count, 3);
/// ```
pub fn map_row<T, R>(row: &R) -> Result<T>
where
    T: Reflect,
    R: RowSource + ?Sized,
{
    map_row_with(TypeDescriptorCache::global(), row)
}

/// Map a row into a new instance of `T` using the given descriptor cache.
pub fn map_row_with<T, R>(cache: &TypeDescriptorCache, row: &R) -> Result<T>
where
    T: Reflect,
    R: RowSource + ?Sized,
{
    let columns = row.column_count();

    if columns == 1 && T::scalar_type().is_some() {
        return T::from_scalar(value_at(row, 0)).map_err(Error::from);
    }

    let mut obj = T::default();
    let descriptor = cache.descriptor::<T>();
    let mut assigned = false;

    for index in 0..columns {
        let Some(member) = row.column_name(index).and_then(|name| descriptor.member(name)) else {
            continue;
        };
        if !member.can_write() {
            continue;
        }

        member.set_value(&mut obj, value_at(row, index))?;
        assigned = true;
    }

    if !assigned && columns == 1 {
        let value = value_at(row, 0);
        if value.is_null() {
            return Ok(obj);
        }
        trace!(
            type_name = descriptor.type_name(),
            "no member matched the only column, converting the value directly"
        );
        return T::from_scalar(value).map_err(Error::from);
    }

    Ok(obj)
}

/// Copy a row into a [`DynamicObject`].
///
/// Values are stored as received. Duplicate column names keep the last value.
pub fn map_row_dynamic<R>(row: &R) -> DynamicObject
where
    R: RowSource + ?Sized,
{
    let columns = row.column_count();
    let mut obj = DynamicObject::with_capacity(columns);
    for index in 0..columns {
        if let Some(name) = row.column_name(index) {
            obj.insert(name, value_at(row, index).clone());
        }
    }
    obj
}

/// Extension trait for mapping an iterator of rows.
///
/// This trait is automatically implemented for any iterator of
/// `Result<R, Error>` where `R` is a row source.
pub trait RowIteratorExt<R: RowSource>: Iterator<Item = Result<R>> + Sized {
    /// Map each row to `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let customers: Vec<Customer> = rows
    ///     .map_rows::<Customer>()
    ///     .collect::<Result<Vec<_>, _>>()?;
    /// ```
    fn map_rows<T: Reflect>(self) -> MapRows<Self, T>;

    /// Map each row to a [`DynamicObject`].
    fn map_rows_dynamic(self) -> MapRowsDynamic<Self>;
}

impl<I, R> RowIteratorExt<R> for I
where
    I: Iterator<Item = Result<R>>,
    R: RowSource,
{
    fn map_rows<T: Reflect>(self) -> MapRows<Self, T> {
        MapRows {
            inner: self,
            _marker: PhantomData,
        }
    }

    fn map_rows_dynamic(self) -> MapRowsDynamic<Self> {
        MapRowsDynamic { inner: self }
    }
}

/// Iterator adapter that maps rows to typed objects.
pub struct MapRows<I, T> {
    inner: I,
    _marker: PhantomData<T>,
}

impl<I, R, T> Iterator for MapRows<I, T>
where
    I: Iterator<Item = Result<R>>,
    R: RowSource,
    T: Reflect,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|result| result.and_then(|row| map_row::<T, R>(&row)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterator adapter that maps rows to dynamic objects.
pub struct MapRowsDynamic<I> {
    inner: I,
}

impl<I, R> Iterator for MapRowsDynamic<I>
where
    I: Iterator<Item = Result<R>>,
    R: RowSource,
{
    type Item = Result<DynamicObject>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|result| result.map(|row| map_row_dynamic(&row)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
