//! 最小二乗法による線形回帰（説明変数3つ）
//!
//! 切片は内部で推定するが、外部に出すのは各チャネルの係数のみ。
//! 中心化した設計行列を片側Jacobi法で特異値分解し、擬似逆行列で解く。
//! ランク落ちした設計行列では最小ノルム解を返す（一般的な
//! 最小二乗ライブラリと同じ係数になる）。

/// 説明変数の数（search / social / email）
pub const FEATURES: usize = 3;

/// 特異値をゼロとみなす相対許容誤差（最大特異値比）
const RANK_TOLERANCE: f64 = 1e-12;

/// Jacobi法の最大反復回数
const MAX_SWEEPS: usize = 64;

type Matrix = [[f64; FEATURES]; FEATURES];

/// 学習済みモデル
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OlsModel {
    coefficients: [f64; FEATURES],
    intercept: f64,
}

impl OlsModel {
    /// 中心化したデータで最小二乗解を求める
    ///
    /// `x` と `y` の長さが異なる場合は短い方に合わせる。空なら全係数0。
    pub fn fit(x: &[[f64; FEATURES]], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        if n == 0 {
            return Self::default();
        }
        let (x, y) = (&x[..n], &y[..n]);

        let x_mean = column_means(x);
        let y_mean = y.iter().sum::<f64>() / n as f64;

        let mut centered: Vec<[f64; FEATURES]> = x
            .iter()
            .map(|row| {
                let mut c = [0.0; FEATURES];
                for ((out, v), m) in c.iter_mut().zip(row).zip(&x_mean) {
                    *out = v - m;
                }
                c
            })
            .collect();
        let y_centered: Vec<f64> = y.iter().map(|v| v - y_mean).collect();

        // 回転後の列は U·Σ、V は右特異ベクトル
        let v = orthogonalize_columns(&mut centered);

        let norms: Vec<f64> = (0..FEATURES)
            .map(|j| centered.iter().map(|row| row[j] * row[j]).sum::<f64>().sqrt())
            .collect();
        let max_norm = norms.iter().fold(0.0_f64, |acc, s| acc.max(*s));
        let cutoff = max_norm * RANK_TOLERANCE;

        let mut coefficients = [0.0; FEATURES];
        for (j, &sigma) in norms.iter().enumerate() {
            if sigma <= cutoff || sigma == 0.0 {
                continue;
            }
            let projection: f64 = centered
                .iter()
                .zip(&y_centered)
                .map(|(row, yc)| row[j] * yc)
                .sum();
            let weight = projection / (sigma * sigma);
            for (coef, v_row) in coefficients.iter_mut().zip(&v) {
                *coef += v_row[j] * weight;
            }
        }
        let intercept = y_mean - dot(&coefficients, &x_mean);

        Self {
            coefficients,
            intercept,
        }
    }

    /// 予測値
    pub fn predict(&self, features: &[f64; FEATURES]) -> f64 {
        self.intercept + dot(&self.coefficients, features)
    }

    pub fn coefficients(&self) -> [f64; FEATURES] {
        self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

/// 各列の平均
pub fn column_means(x: &[[f64; FEATURES]]) -> [f64; FEATURES] {
    let mut means = [0.0; FEATURES];
    if x.is_empty() {
        return means;
    }
    for row in x {
        for (m, v) in means.iter_mut().zip(row) {
            *m += v;
        }
    }
    for m in means.iter_mut() {
        *m /= x.len() as f64;
    }
    means
}

fn dot(a: &[f64; FEATURES], b: &[f64; FEATURES]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// 片側Jacobi法で列を互いに直交化する
///
/// `a` は A·V に置き換わり、累積した回転 V を返す。列ごとのスケール差に
/// 影響されず、小さな特異値も相対精度を保つ。
fn orthogonalize_columns(a: &mut [[f64; FEATURES]]) -> Matrix {
    let mut v: Matrix = [[0.0; FEATURES]; FEATURES];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _ in 0..MAX_SWEEPS {
        let mut rotated = false;
        for p in 0..FEATURES {
            for q in (p + 1)..FEATURES {
                let (mut alpha, mut beta, mut gamma) = (0.0, 0.0, 0.0);
                for row in a.iter() {
                    alpha += row[p] * row[p];
                    beta += row[q] * row[q];
                    gamma += row[p] * row[q];
                }
                if gamma == 0.0 || gamma.abs() <= f64::EPSILON * (alpha * beta).sqrt() {
                    continue;
                }
                rotated = true;

                let zeta = (beta - alpha) / (2.0 * gamma);
                let t = zeta.signum() / (zeta.abs() + (zeta * zeta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = c * t;

                for row in a.iter_mut().chain(v.iter_mut()) {
                    let (xp, xq) = (row[p], row[q]);
                    row[p] = c * xp - s * xq;
                    row[q] = s * xp + c * xq;
                }
            }
        }
        if !rotated {
            break;
        }
    }
    v
}
