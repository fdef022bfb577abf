//! Rows of a detected-feature table.
//!
//! Columns are typed keys: a [`PeakListColumn<T>`] can only store and read
//! values of type `T`, the row keeps them type-erased.
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// m/z keys are stored as integers with 4 decimals.
pub const MZ_KEY_SCALE: f64 = 10_000.0;
/// RT keys are stored in milliseconds.
pub const RT_KEY_SCALE: f32 = 1_000.0;

/// Untyped description of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnInfo {
    pub id: u32,
    pub name: String,
}

/// Typed column key.
pub struct PeakListColumn<T> {
    info: ColumnInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> PeakListColumn<T> {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            info: ColumnInfo {
                id,
                name: name.into(),
            },
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> u32 {
        self.info.id
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn info(&self) -> &ColumnInfo {
        &self.info
    }
}

impl<T> Clone for PeakListColumn<T> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for PeakListColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeakListColumn")
            .field("id", &self.info.id)
            .field("name", &self.info.name)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

struct Cell {
    column: ColumnInfo,
    value: Box<dyn Any + Send + Sync>,
}

/// One row of a peak list.
pub struct PeakListRow {
    id: u32,
    parent_id: Option<u32>,
    mz_key: i32,
    rt_key: i32,
    cells: Vec<Cell>,
}

impl PeakListRow {
    /// `mz` in Th, `rt_seconds` in seconds.
    pub fn new(id: u32, mz: f64, rt_seconds: f32) -> Self {
        Self {
            id,
            parent_id: None,
            mz_key: quantize_mz(mz),
            rt_key: quantize_rt(rt_seconds),
            cells: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: u32) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn parent_id(&self) -> Option<u32> {
        self.parent_id
    }

    pub fn mz_key(&self) -> i32 {
        self.mz_key
    }

    pub fn rt_key(&self) -> i32 {
        self.rt_key
    }

    pub fn mz(&self) -> f64 {
        self.mz_key as f64 / MZ_KEY_SCALE
    }

    pub fn rt_seconds(&self) -> f32 {
        self.rt_key as f32 / RT_KEY_SCALE
    }

    /// Stores `value` under `column`, returning the previous value if any.
    pub fn set_data<T: Any + Send + Sync>(
        &mut self,
        column: &PeakListColumn<T>,
        value: T,
    ) -> Option<T> {
        let previous = self.remove_data(column);
        self.cells.push(Cell {
            column: column.info.clone(),
            value: Box::new(value),
        });
        previous
    }

    pub fn data<T: Any + Send + Sync>(&self, column: &PeakListColumn<T>) -> Option<&T> {
        self.cells
            .iter()
            .find(|cell| cell.column.id == column.id())
            .and_then(|cell| cell.value.downcast_ref::<T>())
    }

    pub fn remove_data<T: Any + Send + Sync>(&mut self, column: &PeakListColumn<T>) -> Option<T> {
        let pos = self.cells.iter().position(|cell| cell.column.id == column.id())?;
        let cell = self.cells.remove(pos);
        cell.value.downcast::<T>().ok().map(|b| *b)
    }

    /// Columns holding a value, in insertion order.
    pub fn features(&self) -> impl Iterator<Item = &ColumnInfo> + '_ {
        self.cells.iter().map(|cell| &cell.column)
    }

    pub fn number_of_features(&self) -> usize {
        self.cells.len()
    }
}

impl fmt::Debug for PeakListRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeakListRow")
            .field("id", &self.id)
            .field("parent_id", &self.parent_id)
            .field("mz_key", &self.mz_key)
            .field("rt_key", &self.rt_key)
            .field("features", &self.features().collect::<Vec<_>>())
            .finish()
    }
}

fn quantize_mz(mz: f64) -> i32 {
    (mz * MZ_KEY_SCALE).round() as i32
}

fn quantize_rt(rt_seconds: f32) -> i32 {
    (rt_seconds * RT_KEY_SCALE).round() as i32
}
