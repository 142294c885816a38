//! Widget model for Cabbage instrument panels.
//!
//! - kind: closed set of widget types and their wire tags
//! - schema: per-kind default properties and editor property sections
//! - record: typed widget record with an open property map
//! - normalize: clamping, remapping, decimal places, unique channels
//! - markup: serializable render output (no DOM access)
//! - widget: interactive widget variants
//! - graph: live widget collection driven by host messages

mod error;
pub mod graph;
pub mod kind;
pub mod markup;
pub mod normalize;
pub mod record;
pub mod schema;
pub mod widget;

pub use error::{NormalizeError, RecordError};
pub use graph::{GraphChange, LiveGraph};
pub use kind::WidgetKind;
pub use markup::{Element, Markup};
pub use record::{as_number, number_value, values_equal, Bounds, Range, WidgetRecord};
pub use schema::{PropertySection, WidgetSchema};
pub use widget::{
    instantiate, ChannelType, ParameterUpdate, ParameterValue, PointerEvent, UiState, Widget,
    WidgetCore, WidgetOutput,
};
