//! Pointer configuration.
//!
//! Defaults, then an optional s-expression plist file, then command-line
//! overrides.  Every window threshold must fit inside the history capacity.

use std::path::Path;

use lexpr::Value;
use tracing::debug;

use crate::action::{ScreenSize, Sensitivity};
use crate::body::Hand;
use crate::gesture::{ConfidenceRatio, GestureConfig, Thresholds};
use crate::history::CHANNEL_CAPACITY;
use crate::ipc::plist::{get_float, get_int, get_keyword};

/// Configuration load or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config s-expression: {0}")]
    Parse(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Everything the frame pipeline reads besides the frames themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerConfig {
    pub gesture: GestureConfig,
    pub screen: ScreenSize,
    pub sensitivity: Sensitivity,
    /// Hand that drags the pointer at startup; the other one clicks.
    pub moving_hand: Hand,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            screen: ScreenSize::default(),
            sensitivity: Sensitivity::default(),
            moving_hand: Hand::Left,
        }
    }
}

impl PointerConfig {
    /// Read a plist file and overlay it on the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        debug!("Loading config from {}", path.display());
        Self::from_sexp(&raw)
    }

    /// Parse a plist and overlay it on the defaults.
    pub fn from_sexp(raw: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();
        config.apply(&value)?;
        Ok(config)
    }

    /// Overlay every key present in `value`; absent keys keep their value.
    pub fn apply(&mut self, value: &Value) -> Result<(), ConfigError> {
        if let Some(w) = get_int(value, "screen-width") {
            self.screen.width = positive_u32("screen-width", w)?;
        }
        if let Some(h) = get_int(value, "screen-height") {
            self.screen.height = positive_u32("screen-height", h)?;
        }
        if let Some(x) = get_float(value, "sensitivity-x") {
            self.sensitivity.x = x as f32;
        }
        if let Some(y) = get_float(value, "sensitivity-y") {
            self.sensitivity.y = y as f32;
        }
        if let Some(hand) = get_keyword(value, "moving-hand") {
            self.moving_hand = Hand::parse(&hand)
                .ok_or_else(|| ConfigError::Invalid(format!("moving-hand: {hand} (use left or right)")))?;
        }

        let g = &mut self.gesture;
        overlay_window(value, "closed-enter", &mut g.closed.enter)?;
        overlay_window(value, "closed-exit", &mut g.closed.exit)?;
        overlay_window(value, "lasso-enter", &mut g.lasso.enter)?;
        overlay_window(value, "lasso-exit", &mut g.lasso.exit)?;
        if let Some(n) = get_int(value, "confidence-numerator") {
            g.high_confidence.numerator = non_negative("confidence-numerator", n)?;
        }
        if let Some(d) = get_int(value, "confidence-denominator") {
            g.high_confidence.denominator = non_negative("confidence-denominator", d)?;
        }
        self.validate()
    }

    /// Reject configurations the pipeline cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(ConfigError::Invalid("screen dimensions must be positive".into()));
        }
        for (name, t) in [("closed", self.gesture.closed), ("lasso", self.gesture.lasso)] {
            check_window(name, t)?;
        }
        let ConfidenceRatio {
            numerator,
            denominator,
        } = self.gesture.high_confidence;
        if denominator == 0 || numerator > denominator {
            return Err(ConfigError::Invalid(format!(
                "confidence ratio {numerator}/{denominator} must lie in 0..=1"
            )));
        }
        if denominator > CHANNEL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "confidence-denominator: {denominator} (must be 1..={CHANNEL_CAPACITY})"
            )));
        }
        if !self.sensitivity.x.is_finite() || !self.sensitivity.y.is_finite() {
            return Err(ConfigError::Invalid("sensitivity must be finite".into()));
        }
        Ok(())
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let g = &self.gesture;
        format!(
            "(:moving-hand :{} :screen-width {} :screen-height {} :sensitivity-x {:.2} :sensitivity-y {:.2} :closed-enter {} :closed-exit {} :lasso-enter {} :lasso-exit {} :confidence-numerator {} :confidence-denominator {})",
            self.moving_hand.as_str(),
            self.screen.width,
            self.screen.height,
            self.sensitivity.x,
            self.sensitivity.y,
            g.closed.enter,
            g.closed.exit,
            g.lasso.enter,
            g.lasso.exit,
            g.high_confidence.numerator,
            g.high_confidence.denominator,
        )
    }
}

fn positive_u32(key: &str, v: i64) -> Result<u32, ConfigError> {
    u32::try_from(v)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::Invalid(format!("{key}: {v} (must be positive)")))
}

fn non_negative(key: &str, v: i64) -> Result<usize, ConfigError> {
    usize::try_from(v).map_err(|_| ConfigError::Invalid(format!("{key}: {v} (must be >= 0)")))
}

fn overlay_window(value: &Value, key: &str, slot: &mut usize) -> Result<(), ConfigError> {
    if let Some(v) = get_int(value, key) {
        *slot = non_negative(key, v)?;
    }
    Ok(())
}

fn check_window(name: &str, t: Thresholds) -> Result<(), ConfigError> {
    for (edge, k) in [("enter", t.enter), ("exit", t.exit)] {
        if k == 0 || k > CHANNEL_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "{name}-{edge}: {k} (must be 1..={CHANNEL_CAPACITY})"
            )));
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PointerConfig::default();
        assert_eq!(config.moving_hand, Hand::Left);
        assert_eq!(config.screen, ScreenSize { width: 1920, height: 1080 });
        assert!((config.sensitivity.x - 1.0).abs() < f32::EPSILON);
        assert!((config.sensitivity.y - 1.5).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_sexp_overlays() {
        let config = PointerConfig::from_sexp(
            "(:screen-width 2560 :screen-height 1440 :moving-hand :right :lasso-enter 6 :sensitivity-y 2.0)",
        )
        .unwrap();
        assert_eq!(config.screen, ScreenSize { width: 2560, height: 1440 });
        assert_eq!(config.moving_hand, Hand::Right);
        assert_eq!(config.gesture.lasso, Thresholds { enter: 6, exit: 3 });
        assert_eq!(config.gesture.closed, Thresholds { enter: 3, exit: 3 });
        assert!((config.sensitivity.y - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_plist_is_default() {
        assert_eq!(PointerConfig::from_sexp("()").unwrap(), PointerConfig::default());
    }

    #[test]
    fn test_rejects_window_over_capacity() {
        let err = PointerConfig::from_sexp("(:lasso-enter 9)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
        assert!(PointerConfig::from_sexp("(:closed-exit 0)").is_err());
    }

    #[test]
    fn test_rejects_bad_hand() {
        let err = PointerConfig::from_sexp("(:moving-hand :both)").unwrap_err();
        assert!(err.to_string().contains("moving-hand"));
    }

    #[test]
    fn test_rejects_bad_ratio() {
        assert!(PointerConfig::from_sexp("(:confidence-denominator 0)").is_err());
        assert!(PointerConfig::from_sexp("(:confidence-numerator 3)").is_err());
        let ok = PointerConfig::from_sexp("(:confidence-numerator 2 :confidence-denominator 3)").unwrap();
        assert_eq!(ok.gesture.high_confidence, ConfidenceRatio { numerator: 2, denominator: 3 });
    }

    #[test]
    fn test_rejects_huge_denominator() {
        let err = PointerConfig::from_sexp(
            "(:confidence-numerator 1 :confidence-denominator 9223372036854775807)",
        )
        .unwrap_err();
        assert!(err.to_string().contains("confidence-denominator"), "{err}");
        assert!(PointerConfig::from_sexp("(:confidence-numerator 4 :confidence-denominator 8)").is_ok());
    }

    #[test]
    fn test_rejects_negative_screen() {
        assert!(PointerConfig::from_sexp("(:screen-width -1)").is_err());
        assert!(PointerConfig::from_sexp("(:screen-height 0)").is_err());
    }

    #[test]
    fn test_malformed_sexp() {
        let err = PointerConfig::from_sexp("(:screen-width").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(:screen-width 1280 :screen-height 720)").unwrap();
        let config = PointerConfig::load(file.path()).unwrap();
        assert_eq!(config.screen, ScreenSize { width: 1280, height: 720 });
    }

    #[test]
    fn test_load_missing_file() {
        let err = PointerConfig::load(Path::new("/nonexistent/skel-pointer.el")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_config_sexp() {
        let sexp = PointerConfig::default().config_sexp();
        assert!(sexp.contains(":moving-hand :left"));
        assert!(sexp.contains(":screen-width 1920"));
        assert!(sexp.contains(":sensitivity-y 1.50"));
        assert!(sexp.contains(":lasso-enter 8"));
        assert!(sexp.contains(":confidence-denominator 2"));
        assert!(lexpr::from_str(&sexp).is_ok());
    }
}
