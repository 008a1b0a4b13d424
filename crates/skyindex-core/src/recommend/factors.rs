//! Latent-factor matrices and regularized SGD

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ratings::Rating;

/// Which matrix a row belongs to; mixed into the per-row seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    User = 1,
    Item = 2,
}

/// Dense row-major `rows × cols` matrix of `f64`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactorMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl FactorMatrix {
    pub fn new(cols: usize) -> Self {
        Self {
            rows: 0,
            cols,
            data: Vec::new(),
        }
    }

    /// Build from raw row-major data; `None` if the length does not fit
    pub fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (rows.checked_mul(cols)? == data.len()).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        (row < self.rows).then(|| &self.data[row * self.cols..(row + 1) * self.cols])
    }

    fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Grow to at least `rows` rows, zero-filled. Never shrinks.
    pub fn grow_to(&mut self, rows: usize) {
        if rows > self.rows {
            self.data.resize(rows * self.cols, 0.0);
            self.rows = rows;
        }
    }

    /// Fill rows `from..` with seeded values in `[-range, range]`
    pub fn init_rows(&mut self, from: usize, seed: u64, side: Side, range: f64) {
        for row in from..self.rows {
            let values = self.row_mut(row);
            if range <= 0.0 {
                values.fill(0.0);
                continue;
            }
            let mut rng = StdRng::seed_from_u64(row_seed(seed, side, row));
            for v in values.iter_mut() {
                *v = rng.gen_range(-range..=range);
            }
        }
    }

    /// Keep only rows whose mapping is `Some`, placed at their new index
    pub fn remap(&mut self, mapping: &[Option<u32>], new_rows: usize) {
        let mut next = FactorMatrix::new(self.cols);
        next.grow_to(new_rows);
        for (old, new) in mapping.iter().enumerate() {
            if let (Some(new), Some(values)) = (new, self.row(old)) {
                next.row_mut(*new as usize).copy_from_slice(values);
            }
        }
        *self = next;
    }
}

/// Seed for one row, derived from the model seed, the matrix side and the row
fn row_seed(seed: u64, side: Side, row: usize) -> u64 {
    seed ^ ((side as u64) << 56) ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// SGD hyperparameters for one training call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingParams {
    pub learning_rate: f64,
    pub regularization: f64,
    pub iterations: usize,
    pub init_range: f64,
    pub seed: u64,
    pub warm_start: bool,
}

/// User and item factor matrices sharing the latent dimension K
#[derive(Debug, Clone, PartialEq)]
pub struct LatentFactorModel {
    pub users: FactorMatrix,
    pub items: FactorMatrix,
    global_mean: f64,
    trained: bool,
}

impl LatentFactorModel {
    pub fn new(latent_factors: usize) -> Self {
        Self {
            users: FactorMatrix::new(latent_factors),
            items: FactorMatrix::new(latent_factors),
            global_mean: 0.0,
            trained: false,
        }
    }

    /// Restore previously trained matrices
    pub fn from_matrices(users: FactorMatrix, items: FactorMatrix) -> Self {
        Self {
            users,
            items,
            global_mean: 0.0,
            trained: true,
        }
    }

    pub fn latent_factors(&self) -> usize {
        self.users.cols()
    }

    pub fn global_mean(&self) -> f64 {
        self.global_mean
    }

    pub fn set_global_mean(&mut self, mean: f64) {
        self.global_mean = mean;
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Make sure both matrices have a seeded row for every id
    pub fn ensure_rows(&mut self, users: usize, items: usize, params: &TrainingParams) {
        let (old_users, old_items) = (self.users.rows(), self.items.rows());
        self.users.grow_to(users);
        self.items.grow_to(items);
        self.users
            .init_rows(old_users, params.seed, Side::User, params.init_range);
        self.items
            .init_rows(old_items, params.seed, Side::Item, params.init_range);
    }

    /// Dot product of a user row and an item row, if both exist
    pub fn score(&self, user: u32, item: u32) -> Option<f64> {
        let u = self.users.row(user as usize)?;
        let i = self.items.row(item as usize)?;
        Some(dot(u, i))
    }

    /// Refit on `ratings` centered on their mean.
    ///
    /// Rows are re-seeded from scratch unless `warm_start` is set, so two calls
    /// over the same ratings produce identical factors.
    pub fn train(&mut self, ratings: &[Rating], users: usize, items: usize, params: &TrainingParams) {
        let mean = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.value).sum::<f64>() / ratings.len() as f64
        };

        if params.warm_start {
            self.ensure_rows(users, items, params);
        } else {
            self.users.grow_to(users);
            self.items.grow_to(items);
            self.users.init_rows(0, params.seed, Side::User, params.init_range);
            self.items.init_rows(0, params.seed, Side::Item, params.init_range);
        }

        let (lr, reg) = (params.learning_rate, params.regularization);
        let mut user_before = vec![0.0; self.latent_factors()];

        for iteration in 0..params.iterations {
            let mut squared_error = 0.0;
            for rating in ratings {
                let (u, i) = (rating.user as usize, rating.item as usize);
                if u >= self.users.rows() || i >= self.items.rows() {
                    continue;
                }

                user_before.copy_from_slice(self.users.row_mut(u));
                let item_row = self.items.row_mut(i);
                let err = (rating.value - mean) - dot(&user_before, item_row);
                squared_error += err * err;

                let user_row = self.users.row_mut(u);
                for k in 0..user_row.len() {
                    user_row[k] += lr * (err * item_row[k] - reg * user_row[k]);
                }
                for k in 0..item_row.len() {
                    item_row[k] += lr * (err * user_before[k] - reg * item_row[k]);
                }
            }
            tracing::trace!(iteration, squared_error, "sgd pass");
        }

        self.global_mean = mean;
        self.trained = true;
    }
}
