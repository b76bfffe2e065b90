use serde_json::Value;

/// Lenient numeric read: numbers and numeric strings pass, anything else is 0.
pub fn to_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn to_count(value: Option<&Value>) -> u32 {
    let n = to_number(value);
    if n <= 0.0 {
        0
    } else {
        n.round().min(u32::MAX as f64) as u32
    }
}

pub fn safe_div(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        return 0.0;
    }
    let out = num / den;
    if out.is_finite() { out } else { 0.0 }
}

pub fn per90(value: f64, minutes: f64) -> f64 {
    safe_div(value * 90.0, minutes)
}

pub fn mean(values: &[f64]) -> f64 {
    safe_div(values.iter().sum::<f64>(), values.len() as f64)
}

/// Share of `population` at or below `value`, in [0, 1].
pub fn percentile_rank(value: f64, population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    let at_or_below = population.iter().filter(|v| **v <= value).count();
    at_or_below as f64 / population.len() as f64
}

/// Pearson correlation over the paired prefix of `xs` and `ys`.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    if vx == 0.0 || vy == 0.0 {
        return 0.0;
    }
    let r = cov / (vx.sqrt() * vy.sqrt());
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
}

impl Regression {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn linear_regression(points: &[(f64, f64)]) -> Regression {
    if points.len() < 2 {
        return Regression::default();
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let my = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, y) in points {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
    }
    if sxx == 0.0 {
        return Regression::default();
    }
    let slope = sxy / sxx;
    Regression {
        slope,
        intercept: my - slope * mx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_number_coerces_missing_and_malformed_to_zero() {
        assert_eq!(to_number(None), 0.0);
        assert_eq!(to_number(Some(&json!("abc"))), 0.0);
        assert_eq!(to_number(Some(&json!("3.5"))), 3.5);
        assert_eq!(to_number(Some(&json!(null))), 0.0);
        assert_eq!(to_number(Some(&json!([1, 2]))), 0.0);
        assert_eq!(to_number(Some(&json!(12))), 12.0);
        assert_eq!(to_count(Some(&json!("7.0"))), 7);
        assert_eq!(to_count(Some(&json!(-2))), 0);
    }

    #[test]
    fn safe_div_never_returns_nan() {
        assert_eq!(safe_div(5.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(6.0, 3.0), 2.0);
        assert_eq!(per90(2.0, 180.0), 1.0);
        assert_eq!(per90(2.0, 0.0), 0.0);
    }

    #[test]
    fn percentile_is_inclusive() {
        assert_eq!(percentile_rank(3.0, &[]), 0.0);
        assert_eq!(percentile_rank(5.0, &[1.0, 2.0, 3.0, 4.0, 5.0]), 1.0);
        assert_eq!(percentile_rank(0.0, &[1.0, 2.0, 3.0]), 0.0);
        assert!((percentile_rank(2.0, &[1.0, 2.0, 3.0, 4.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn pearson_edge_cases() {
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]);
        assert!((r - 1.0).abs() < 1e-9);
        let r = pearson(&[1.0, 2.0, 3.0, 4.0], &[8.0, 6.0, 4.0, 2.0]);
        assert!((r + 1.0).abs() < 1e-9);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[2.0, 4.0]), 0.0);
    }

    #[test]
    fn regression_recovers_line() {
        let points: Vec<(f64, f64)> = (0..6).map(|x| (x as f64, 2.0 * x as f64 + 1.0)).collect();
        let fit = linear_regression(&points);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        assert!((fit.predict(10.0) - 21.0).abs() < 1e-9);
        assert_eq!(linear_regression(&[(1.0, 1.0)]), Regression::default());
        assert_eq!(
            linear_regression(&[(2.0, 1.0), (2.0, 3.0)]),
            Regression::default()
        );
    }
}
