use serde::{Deserialize, Serialize};

/// b-values at or below this are treated as unweighted (b=0) volumes.
pub const BZERO_THRESHOLD: f32 = 10.0;
/// Maximum distance of a b-value from its shell mean.
pub const SHELL_EPSILON: f32 = 80.0;

/// Diffusion gradient table, one `[x, y, z, b]` row per volume.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradientScheme {
    pub rows: Vec<[f32; 4]>,
}

/// Volumes sharing a common b-value.
#[derive(Clone, Debug, PartialEq)]
pub struct Shell {
    pub mean_b: f32,
    pub volumes: Vec<usize>,
}

impl Shell {
    pub fn is_bzero(&self) -> bool {
        self.mean_b <= BZERO_THRESHOLD
    }
}

impl GradientScheme {
    pub fn new(rows: Vec<[f32; 4]>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Group volumes into shells ordered by ascending b-value.
    ///
    /// All b=0 volumes form a single shell; the remaining b-values are
    /// clustered greedily in sorted order, starting a new shell whenever a
    /// value lies further than [`SHELL_EPSILON`] from the running shell mean.
    pub fn shells(&self) -> Vec<Shell> {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| self.rows[a][3].total_cmp(&self.rows[b][3]).then(a.cmp(&b)));

        let mut shells: Vec<Shell> = Vec::new();
        let mut sum_b = 0.0f32;
        for idx in order {
            let b = self.rows[idx][3].max(0.0);
            let joins_current = match shells.last() {
                Some(shell) if shell.is_bzero() => b <= BZERO_THRESHOLD,
                Some(shell) => (b - shell.mean_b).abs() <= SHELL_EPSILON,
                None => false,
            };
            if joins_current {
                if let Some(shell) = shells.last_mut() {
                    shell.volumes.push(idx);
                    sum_b += b;
                    shell.mean_b = sum_b / shell.volumes.len() as f32;
                }
            } else {
                sum_b = b;
                shells.push(Shell {
                    mean_b: b,
                    volumes: vec![idx],
                });
            }
        }
        for shell in &mut shells {
            shell.volumes.sort_unstable();
        }
        shells
    }
}
