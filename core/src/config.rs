//! Insight thresholds.
//!
//! RULE: No threshold is hard-coded inside the engine. Every rule and
//! the trend band read their numbers from InsightConfig, which the
//! caller builds from defaults, a JSON file, or named overrides.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Margin below which the margin rule warns. Fraction, not percent.
    pub margin_low: f64,
    /// Margin above which the margin rule congratulates.
    pub margin_high: f64,
    /// Recent average must exceed daily average × this to count as up.
    pub trend_up_factor: f64,
    /// Recent average must fall below daily average × this to count as down.
    pub trend_down_factor: f64,
    /// Pending receivables above revenue × this raise the debt alert.
    pub debt_ratio: f64,
    /// Low-stock items named individually before the message aggregates.
    pub low_stock_cap: usize,
    /// Fewer distinct products than this triggers the diversity hint.
    pub diversity_min: usize,
    /// The diversity hint needs at least this many days of window.
    pub diversity_window_days: u32,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            margin_low:            0.10,
            margin_high:           0.50,
            trend_up_factor:       1.10,
            trend_down_factor:     0.90,
            debt_ratio:            0.50,
            low_stock_cap:         5,
            diversity_min:         3,
            diversity_window_days: 30,
        }
    }
}

impl InsightConfig {
    /// Names accepted by with_override(), in field order.
    pub const OVERRIDE_NAMES: [&'static str; 8] = [
        "margin_low",
        "margin_high",
        "trend_up_factor",
        "trend_down_factor",
        "debt_ratio",
        "low_stock_cap",
        "diversity_min",
        "diversity_window_days",
    ];

    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        Ok(Self::from_json(&content)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply one named threshold override.
    pub fn with_override(mut self, name: &str, value: f64) -> EngineResult<Self> {
        self.set(name, value)?;
        self.validate()?;
        Ok(self)
    }

    /// Apply several overrides, validating once after all are set so
    /// that moving both margin bounds in one call works.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        for (name, value) in overrides {
            self.set(name, value)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn set(&mut self, name: &str, value: f64) -> EngineResult<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(EngineError::invalid(
                name,
                format!("threshold must be finite and non-negative, got {value}"),
            ));
        }
        match name {
            "margin_low"            => self.margin_low = value,
            "margin_high"           => self.margin_high = value,
            "trend_up_factor"       => self.trend_up_factor = value,
            "trend_down_factor"     => self.trend_down_factor = value,
            "debt_ratio"            => self.debt_ratio = value,
            "low_stock_cap"         => self.low_stock_cap = whole(name, value)? as usize,
            "diversity_min"         => self.diversity_min = whole(name, value)? as usize,
            "diversity_window_days" => self.diversity_window_days = whole(name, value)? as u32,
            _ => {
                return Err(EngineError::invalid(
                    name,
                    format!("unknown threshold; expected one of {:?}", Self::OVERRIDE_NAMES),
                ))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        let ratios = [
            ("margin_low", self.margin_low),
            ("margin_high", self.margin_high),
            ("trend_up_factor", self.trend_up_factor),
            ("trend_down_factor", self.trend_down_factor),
            ("debt_ratio", self.debt_ratio),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::invalid(
                    name,
                    format!("must be finite and non-negative, got {value}"),
                ));
            }
        }
        if self.margin_low > self.margin_high {
            return Err(EngineError::invalid(
                "margin_low",
                format!("{} exceeds margin_high {}", self.margin_low, self.margin_high),
            ));
        }
        if self.trend_down_factor > 1.0 || self.trend_up_factor < 1.0 {
            return Err(EngineError::invalid(
                "trend_band",
                format!(
                    "need trend_down_factor <= 1 <= trend_up_factor, got {} / {}",
                    self.trend_down_factor, self.trend_up_factor
                ),
            ));
        }
        Ok(())
    }
}

fn whole(name: &str, value: f64) -> EngineResult<u64> {
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(EngineError::invalid(name, format!("must be a whole count, got {value}")));
    }
    Ok(value as u64)
}
