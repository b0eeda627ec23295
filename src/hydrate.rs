// Query-string validation. Every field is judged on its own: a bad value only
// sends that field back to its default, and the report says which and why.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::{ColorError, Rgb, parse_hex_color};
use crate::math::Point2D;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Iterations,
    Center,
    Scale,
    BoundColor,
    TransitionColor,
    EscapeColor,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Iterations,
        Field::Center,
        Field::Scale,
        Field::BoundColor,
        Field::TransitionColor,
        Field::EscapeColor,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Iterations => "iterations",
            Field::Center => "center",
            Field::Scale => "scale",
            Field::BoundColor => "boundColor",
            Field::TransitionColor => "transitionColor",
            Field::EscapeColor => "escapeColor",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{0:?} is not a number")]
    NotANumber(String),
    #[error("{0} is not a whole number")]
    NotAnInteger(f64),
    #[error("{value} is below the minimum {min}")]
    TooSmall { value: f64, min: f64 },
    #[error("{value} is above the maximum {max}")]
    TooLarge { value: f64, max: f64 },
    #[error("{0:?} is not of the form <x>,<y>")]
    BadPoint(String),
    #[error(transparent)]
    BadColor(#[from] ColorError),
}

/// Bounds applied to numeric fields.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub min_iterations: f64,
    pub max_iterations: f64,
    pub min_scale: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            min_iterations: 1.0,
            max_iterations: 500.0,
            min_scale: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldOutcome<T> {
    Parsed(T),
    Missing,
    Invalid { raw: String, error: FieldError },
}

impl<T> FieldOutcome<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            FieldOutcome::Parsed(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, FieldOutcome::Parsed(_))
    }

    pub fn error(&self) -> Option<&FieldError> {
        match self {
            FieldOutcome::Invalid { error, .. } => Some(error),
            _ => None,
        }
    }

    fn from_raw(raw: Option<&String>, parse: impl FnOnce(&str) -> Result<T, FieldError>) -> Self {
        let Some(raw) = raw else {
            return FieldOutcome::Missing;
        };
        match parse(raw) {
            Ok(v) => FieldOutcome::Parsed(v),
            Err(error) => FieldOutcome::Invalid { raw: raw.clone(), error },
        }
    }
}

/// Per-field result of reading the query string.
#[derive(Clone, Debug, PartialEq)]
pub struct HydrationReport {
    pub iterations: FieldOutcome<f64>,
    pub center: FieldOutcome<Point2D>,
    pub scale: FieldOutcome<f64>,
    pub bound_color: FieldOutcome<Rgb>,
    pub transition_color: FieldOutcome<Rgb>,
    pub escape_color: FieldOutcome<Rgb>,
}

impl HydrationReport {
    pub fn validate(query: &HashMap<String, String>, limits: &Limits) -> Self {
        let raw = |field: Field| query.get(field.key());
        HydrationReport {
            iterations: FieldOutcome::from_raw(raw(Field::Iterations), |s| parse_iterations(s, limits)),
            center: FieldOutcome::from_raw(raw(Field::Center), parse_point),
            scale: FieldOutcome::from_raw(raw(Field::Scale), |s| parse_scale(s, limits)),
            bound_color: FieldOutcome::from_raw(raw(Field::BoundColor), parse_color),
            transition_color: FieldOutcome::from_raw(raw(Field::TransitionColor), parse_color),
            escape_color: FieldOutcome::from_raw(raw(Field::EscapeColor), parse_color),
        }
    }

    pub fn is_parsed(&self, field: Field) -> bool {
        match field {
            Field::Iterations => self.iterations.is_parsed(),
            Field::Center => self.center.is_parsed(),
            Field::Scale => self.scale.is_parsed(),
            Field::BoundColor => self.bound_color.is_parsed(),
            Field::TransitionColor => self.transition_color.is_parsed(),
            Field::EscapeColor => self.escape_color.is_parsed(),
        }
    }

    pub fn error(&self, field: Field) -> Option<&FieldError> {
        match field {
            Field::Iterations => self.iterations.error(),
            Field::Center => self.center.error(),
            Field::Scale => self.scale.error(),
            Field::BoundColor => self.bound_color.error(),
            Field::TransitionColor => self.transition_color.error(),
            Field::EscapeColor => self.escape_color.error(),
        }
    }

    pub fn parsed_fields(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| self.is_parsed(*f)).collect()
    }

    /// Fields that keep their default, with the rejection reason when the
    /// value was present but invalid.
    pub fn fallbacks(&self) -> Vec<(Field, Option<&FieldError>)> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.is_parsed(*f))
            .map(|f| (f, self.error(f)))
            .collect()
    }
}

fn parse_number(s: &str) -> Result<f64, FieldError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::NotANumber(s.to_string()))
}

fn check_bounded(value: f64, min: f64, max: Option<f64>) -> Result<f64, FieldError> {
    if value < min {
        return Err(FieldError::TooSmall { value, min });
    }
    if let Some(max) = max.filter(|max| value > *max) {
        return Err(FieldError::TooLarge { value, max });
    }
    Ok(value)
}

pub(crate) fn check_iterations(value: f64, limits: &Limits) -> Result<f64, FieldError> {
    if value.fract() != 0.0 {
        return Err(FieldError::NotAnInteger(value));
    }
    check_bounded(value, limits.min_iterations, Some(limits.max_iterations))
}

pub(crate) fn check_scale(value: f64, limits: &Limits) -> Result<f64, FieldError> {
    check_bounded(value, limits.min_scale, None)
}

pub(crate) fn parse_iterations(s: &str, limits: &Limits) -> Result<f64, FieldError> {
    check_iterations(parse_number(s)?, limits)
}

pub(crate) fn parse_scale(s: &str, limits: &Limits) -> Result<f64, FieldError> {
    check_scale(parse_number(s)?, limits)
}

pub(crate) fn parse_point(s: &str) -> Result<Point2D, FieldError> {
    let bad = || FieldError::BadPoint(s.to_string());
    let (x, y) = s.split_once(',').ok_or_else(bad)?;
    let x = parse_number(x).map_err(|_| bad())?;
    let y = parse_number(y).map_err(|_| bad())?;
    Ok(Point2D::new(x, y))
}

pub(crate) fn parse_color(s: &str) -> Result<Rgb, FieldError> {
    Ok(parse_hex_color(s)?)
}
