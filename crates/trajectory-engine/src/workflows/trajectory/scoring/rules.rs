use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::super::domain::{ContributingFactor, Momentum, Signal, SignalType, TrendDirection};
use super::config::ScoringConfig;

/// Everything derived directly from the signal window before classification.
pub(crate) struct SignalSummary {
    pub trajectory_score: f64,
    pub momentum: Momentum,
    pub trend_direction: TrendDirection,
    pub contributing_factors: Vec<ContributingFactor>,
    pub data_freshness_days: Option<i64>,
    pub signal_count: usize,
}

pub(crate) fn summarize(
    signals: &[Signal],
    config: &ScoringConfig,
    now: DateTime<Utc>,
) -> SignalSummary {
    SignalSummary {
        trajectory_score: trajectory_score(signals, config, now),
        momentum: momentum(signals, config, now),
        trend_direction: trend_direction(signals, config),
        contributing_factors: contributing_factors(signals, config),
        data_freshness_days: data_freshness_days(signals, now),
        signal_count: signals.len(),
    }
}

fn value_of(signal: &Signal, config: &ScoringConfig) -> f64 {
    signal.signal_value.unwrap_or(config.neutral_score)
}

/// Linear decay from 1.0 at age zero to the floor at the end of the window.
pub fn recency_weight(age: Duration, config: &ScoringConfig) -> f64 {
    let window_ms = config.window().num_milliseconds() as f64;
    if window_ms <= 0.0 {
        return config.recency_floor;
    }
    let age_ms = age.num_milliseconds().max(0) as f64;
    (1.0 - (age_ms / window_ms) * config.recency_decay).max(config.recency_floor)
}

/// Type- and recency-weighted mean of signal values, neutral when nothing carries a finite
/// weight.
pub fn trajectory_score(signals: &[Signal], config: &ScoringConfig, now: DateTime<Utc>) -> f64 {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for signal in signals {
        let weight = config.type_weight(signal.signal_type)
            * recency_weight(now - signal.captured_at, config)
            * signal.signal_weight;
        weighted_sum += value_of(signal, config) * weight;
        total_weight += weight;
    }

    // Extreme weights can overflow either sum; such a window carries no usable score.
    if !weighted_sum.is_finite() || !total_weight.is_finite() || total_weight <= 0.0 {
        return config.neutral_score;
    }

    (weighted_sum / total_weight).clamp(0.0, 100.0)
}

/// Compares the last-30-day mean against the 30-90 day mean.
pub fn momentum(signals: &[Signal], config: &ScoringConfig, now: DateTime<Utc>) -> Momentum {
    if signals.len() < config.minimum_signals {
        return Momentum::Stable;
    }

    let recent_cutoff = config.recent_window();
    let window = config.window();
    let mut recent = Vec::new();
    let mut older = Vec::new();

    for signal in signals {
        let age = now - signal.captured_at;
        if age <= recent_cutoff {
            recent.push(value_of(signal, config));
        } else if age <= window {
            older.push(value_of(signal, config));
        }
    }

    if recent.len() < config.momentum_min_per_bucket || older.len() < config.momentum_min_per_bucket
    {
        return Momentum::Stable;
    }

    let delta = mean(&recent) - mean(&older);
    if delta > config.momentum_delta_threshold {
        Momentum::Accelerating
    } else if delta < -config.momentum_delta_threshold {
        Momentum::Decelerating
    } else {
        Momentum::Stable
    }
}

/// Regression over the newest signals. Index 0 is the newest sample, so a negative slope
/// means values rise going forward in time.
pub fn trend_direction(signals: &[Signal], config: &ScoringConfig) -> TrendDirection {
    if signals.len() < config.trend_min_signals {
        return TrendDirection::Stable;
    }

    let mut newest_first: Vec<&Signal> = signals.iter().collect();
    newest_first.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
    let values: Vec<f64> = newest_first
        .into_iter()
        .take(config.trend_sample_size)
        .map(|signal| value_of(signal, config))
        .collect();

    let slope = regression_slope(&values);
    if slope < -config.trend_slope_threshold {
        TrendDirection::Improving
    } else if slope > config.trend_slope_threshold {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

/// Ordinary least-squares slope of `values` against their index.
pub fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 2 {
        return 0.0;
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (index, value) in values.iter().enumerate() {
        let x = index as f64;
        sum_x += x;
        sum_y += value;
        sum_xy += x * value;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Per-type mean and count, most frequent type first.
pub fn contributing_factors(signals: &[Signal], config: &ScoringConfig) -> Vec<ContributingFactor> {
    let mut grouped: BTreeMap<SignalType, (f64, usize)> = BTreeMap::new();
    for signal in signals {
        let entry = grouped.entry(signal.signal_type).or_insert((0.0, 0));
        entry.0 += value_of(signal, config);
        entry.1 += 1;
    }

    let mut factors: Vec<ContributingFactor> = grouped
        .into_iter()
        .map(|(signal_type, (total, count))| ContributingFactor {
            signal_type,
            average_value: total / count as f64,
            event_count: count,
        })
        .collect();

    factors.sort_by(|a, b| b.event_count.cmp(&a.event_count));
    factors
}

fn data_freshness_days(signals: &[Signal], now: DateTime<Utc>) -> Option<i64> {
    signals
        .iter()
        .map(|signal| signal.captured_at)
        .max()
        .map(|newest| (now - newest).num_days().max(0))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
