//! In-memory user-item interaction matrix.
//!
//! Rows are users, columns are items. Each cell carries a rating value and an
//! explicit presence flag, so a genuine rating of `0.0` is distinguishable
//! from "not rated". Unrated cells hold `0.0` in the value array, which keeps
//! the cosine arithmetic identical to a zero-filled pivot table.

use itemcf_core::{EngineError, EngineResult, ItemId, RatingRecord, UserId};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone)]
pub struct InteractionMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    user_index: HashMap<UserId, usize>,
    item_index: HashMap<ItemId, usize>,
    ratings: Array2<f64>,
    observed: Array2<bool>,
}

impl InteractionMatrix {
    /// Build from cells with explicit presence: `None` is unrated.
    pub fn from_cells(
        users: Vec<UserId>,
        items: Vec<ItemId>,
        cells: Array2<Option<f64>>,
    ) -> EngineResult<Self> {
        let expected = (users.len(), items.len());
        if cells.dim() != expected {
            return Err(EngineError::ShapeMismatch {
                expected,
                actual: cells.dim(),
            });
        }

        let user_index = index_ids(&users).map_err(EngineError::DuplicateUser)?;
        let item_index = index_ids(&items).map_err(EngineError::DuplicateItem)?;

        let mut ratings = Array2::<f64>::zeros(expected);
        let mut observed = Array2::from_elem(expected, false);
        for ((row, col), cell) in cells.indexed_iter() {
            if let Some(value) = *cell {
                if !value.is_finite() {
                    return Err(EngineError::InvalidRating {
                        user_id: users[row],
                        item_id: items[col],
                        value,
                    });
                }
                ratings[[row, col]] = value;
                observed[[row, col]] = true;
            }
        }

        Ok(Self {
            users,
            items,
            user_index,
            item_index,
            ratings,
            observed,
        })
    }

    /// Build from a zero-filled dense table, where `0.0` means unrated.
    pub fn from_dense(
        users: Vec<UserId>,
        items: Vec<ItemId>,
        values: Array2<f64>,
    ) -> EngineResult<Self> {
        let cells = values.mapv(|v| if v == 0.0 { None } else { Some(v) });
        Self::from_cells(users, items, cells)
    }

    /// Pivot per-rating records into a matrix. Users and items are laid out
    /// in ascending id order. Repeated records with the same rating collapse
    /// into one cell; differing ratings for the same pair are rejected.
    pub fn from_records<I>(records: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = RatingRecord>,
    {
        let mut cells: BTreeMap<(UserId, ItemId), f64> = BTreeMap::new();
        let mut users = BTreeSet::new();
        let mut items = BTreeSet::new();

        for record in records {
            if !record.rating.is_finite() {
                return Err(EngineError::InvalidRating {
                    user_id: record.user_id,
                    item_id: record.item_id,
                    value: record.rating,
                });
            }
            match cells.get(&(record.user_id, record.item_id)) {
                Some(&existing) if existing != record.rating => {
                    return Err(EngineError::ConflictingRating {
                        user_id: record.user_id,
                        item_id: record.item_id,
                        first: existing,
                        second: record.rating,
                    });
                }
                Some(_) => continue,
                None => {
                    cells.insert((record.user_id, record.item_id), record.rating);
                    users.insert(record.user_id);
                    items.insert(record.item_id);
                }
            }
        }

        let users: Vec<UserId> = users.into_iter().collect();
        let items: Vec<ItemId> = items.into_iter().collect();
        let user_pos: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(i, &u)| (u, i)).collect();
        let item_pos: HashMap<ItemId, usize> =
            items.iter().enumerate().map(|(i, &it)| (it, i)).collect();

        let mut grid = Array2::from_elem((users.len(), items.len()), None);
        for ((user_id, item_id), rating) in cells {
            grid[[user_pos[&user_id], item_pos[&item_id]]] = Some(rating);
        }

        Self::from_cells(users, items, grid)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() || self.items.is_empty()
    }

    /// User ids in row order.
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Item ids in column order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn contains_item(&self, item_id: ItemId) -> bool {
        self.item_index.contains_key(&item_id)
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn item_position(&self, item_id: ItemId) -> Option<usize> {
        self.item_index.get(&item_id).copied()
    }

    /// Number of observed ratings.
    pub fn rating_count(&self) -> usize {
        self.observed.iter().filter(|&&seen| seen).count()
    }

    /// The user's rating for an item, `None` if unrated.
    pub fn rating(&self, user_id: UserId, item_id: ItemId) -> EngineResult<Option<f64>> {
        let row = self.require_user(user_id)?;
        let col = self
            .item_position(item_id)
            .ok_or(EngineError::UnknownItem(item_id))?;
        Ok(self.observed[[row, col]].then(|| self.ratings[[row, col]]))
    }

    /// Items the user has rated, with their ratings, in column order.
    pub fn rated_items(&self, user_id: UserId) -> EngineResult<Vec<(ItemId, f64)>> {
        let row = self.require_user(user_id)?;
        Ok(self
            .rated_in_row(row)
            .map(|(col, rating)| (self.items[col], rating))
            .collect())
    }

    pub(crate) fn require_user(&self, user_id: UserId) -> EngineResult<usize> {
        self.user_position(user_id)
            .ok_or(EngineError::UnknownUser(user_id))
    }

    /// `(column, rating)` for each observed cell of a row, in column order.
    pub(crate) fn rated_in_row(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.ratings
            .row(row)
            .into_iter()
            .zip(self.observed.row(row))
            .enumerate()
            .filter(|(_, (_, seen))| **seen)
            .map(|(col, (&rating, _))| (col, rating))
    }

    pub(crate) fn is_rated(&self, row: usize, col: usize) -> bool {
        self.observed[[row, col]]
    }

    /// Zero-filled rating values, users by items.
    pub fn values(&self) -> &Array2<f64> {
        &self.ratings
    }
}

/// Map each id to its position, reporting the first duplicate.
fn index_ids(ids: &[u64]) -> Result<HashMap<u64, usize>, u64> {
    let mut index = HashMap::with_capacity(ids.len());
    for (pos, &id) in ids.iter().enumerate() {
        if index.insert(id, pos).is_some() {
            return Err(id);
        }
    }
    Ok(index)
}
