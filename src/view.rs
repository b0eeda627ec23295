use std::rc::Rc;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::color::{ColorInput, Rgb};
use crate::config::ViewConfig;
use crate::hydrate::{
    Field, FieldError, HydrationReport, Limits, parse_color, parse_iterations, parse_point, parse_scale,
};
use crate::math::Point2D;
use crate::store::ParameterStore;
use crate::tween::TransitionId;
use crate::url_state::UrlStateAdapter;

/// Values a renderer needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub iterations: f64,
    pub center: Point2D,
    pub scale: f64,
    pub bound_color: Rgb,
    pub transition_color: Rgb,
    pub escape_color: Rgb,
}

impl ViewSnapshot {
    /// Iteration cap for the escape-time loop.
    pub fn max_iter(&self) -> u32 {
        self.iterations.round().max(1.0) as u32
    }
}

/// The six view-parameter stores, all bound to one address bar.
pub struct ViewStores {
    pub iterations: ParameterStore<f64>,
    pub center: ParameterStore<Point2D>,
    pub scale: ParameterStore<f64>,
    pub bound_color: ParameterStore<Rgb>,
    pub transition_color: ParameterStore<Rgb>,
    pub escape_color: ParameterStore<Rgb>,
    limits: Limits,
    url: Rc<dyn UrlStateAdapter>,
}

impl ViewStores {
    pub fn new(config: &ViewConfig, url: Rc<dyn UrlStateAdapter>) -> Self {
        let durations = &config.durations;
        let color = |input: &str, field: Field| {
            ParameterStore::<Rgb>::from_color(ColorInput::from(input), durations.color.policy())
                .with_url(field.key(), url.clone())
        };
        ViewStores {
            iterations: ParameterStore::new(config.iterations, durations.iterations.policy())
                .with_url(Field::Iterations.key(), url.clone()),
            center: ParameterStore::new(config.center, durations.center.policy())
                .with_url(Field::Center.key(), url.clone()),
            scale: ParameterStore::new(config.scale, durations.scale.policy())
                .with_url(Field::Scale.key(), url.clone()),
            bound_color: color(&config.bound_color, Field::BoundColor),
            transition_color: color(&config.transition_color, Field::TransitionColor),
            escape_color: color(&config.escape_color, Field::EscapeColor),
            limits: config.limits,
            url,
        }
    }

    /// Reads the address bar and jumps every valid field to its value.
    /// Invalid or missing fields stay at their defaults.
    pub fn hydrate(&mut self) -> HydrationReport {
        let query = self.url.read();
        let report = HydrationReport::validate(&query, &self.limits);

        if let Some(v) = report.iterations.parsed() {
            self.iterations.jump(*v);
        }
        if let Some(v) = report.center.parsed() {
            self.center.jump(*v);
        }
        if let Some(v) = report.scale.parsed() {
            self.scale.jump(*v);
        }
        if let Some(v) = report.bound_color.parsed() {
            self.bound_color.jump(*v);
        }
        if let Some(v) = report.transition_color.parsed() {
            self.transition_color.jump(*v);
        }
        if let Some(v) = report.escape_color.parsed() {
            self.escape_color.jump(*v);
        }

        for (field, error) in report.fallbacks() {
            if let Some(error) = error {
                warn!("ignoring {}: {}", field, error);
            }
        }
        info!("hydrated {} of {} view fields from query", report.parsed_fields().len(), Field::ALL.len());
        report
    }

    /// Validates `raw` with the hydration rules and `set`s the field.
    pub fn set_field(&mut self, field: Field, raw: &str) -> Result<TransitionId, FieldError> {
        let limits = &self.limits;
        let id = match field {
            Field::Iterations => self.iterations.set(parse_iterations(raw, limits)?),
            Field::Center => self.center.set(parse_point(raw)?),
            Field::Scale => self.scale.set(parse_scale(raw, limits)?),
            Field::BoundColor => self.bound_color.set(parse_color(raw)?),
            Field::TransitionColor => self.transition_color.set(parse_color(raw)?),
            Field::EscapeColor => self.escape_color.set(parse_color(raw)?),
        };
        Ok(id)
    }

    pub fn reset(&mut self, field: Field) -> TransitionId {
        match field {
            Field::Iterations => self.iterations.reset(),
            Field::Center => self.center.reset(),
            Field::Scale => self.scale.reset(),
            Field::BoundColor => self.bound_color.reset(),
            Field::TransitionColor => self.transition_color.reset(),
            Field::EscapeColor => self.escape_color.reset(),
        }
    }

    pub fn reset_all(&mut self) {
        for field in Field::ALL {
            self.reset(field);
        }
    }

    /// Advances every store by one frame.
    pub fn tick(&mut self, dt: Duration) {
        self.iterations.tick(dt);
        self.center.tick(dt);
        self.scale.tick(dt);
        self.bound_color.tick(dt);
        self.transition_color.tick(dt);
        self.escape_color.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.iterations.is_animating()
            || self.center.is_animating()
            || self.scale.is_animating()
            || self.bound_color.is_animating()
            || self.transition_color.is_animating()
            || self.escape_color.is_animating()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            iterations: *self.iterations.value(),
            center: *self.center.value(),
            scale: *self.scale.value(),
            bound_color: *self.bound_color.value(),
            transition_color: *self.transition_color.value(),
            escape_color: *self.escape_color.value(),
        }
    }
}
