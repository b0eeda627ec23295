pub mod math;
pub mod color;
pub mod tween;
pub mod url_state;
pub mod store;
pub mod hydrate;
pub mod config;
pub mod view;
pub mod preview;
#[cfg(target_arch = "wasm32")]
pub mod browser;

pub use math::{C, Point2D, square_dist};
pub use color::{
    ColorError, ColorInput, Rgb, hex_to_base10, hex_to_vec3, parse_hex_color, vec3_to_hex
};
pub use tween::{Easing, Interpolate, Motion, Step, Transition, TransitionId, Tween};
pub use url_state::{MemoryUrl, QueryString, UrlStateAdapter};
pub use store::{ParameterStore, QueryValue, StorePolicy, SubscriptionId};
pub use hydrate::{Field, FieldError, FieldOutcome, HydrationReport, Limits};
pub use config::{ConfigError, Durations, DurationsMs, ViewConfig};
pub use view::{ViewSnapshot, ViewStores};
#[cfg(target_arch = "wasm32")]
pub use browser::BrowserUrl;
