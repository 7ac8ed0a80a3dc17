#![forbid(unsafe_code)]

//! Folio core: the interactive logic of a single-page portfolio.
//!
//! Section registry, visibility tracking, optimistic navigation, theme and
//! menu state, plus the content and contact-form models. Nothing here does
//! I/O beyond reading a content file; every environment effect goes through
//! [`host::PageHost`].

pub mod contact;
pub mod content;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod lifecycle;
pub mod menu;
pub mod motion;
pub mod section;
pub mod theme;
pub mod tracker;

pub use controller::{Msg, PageController, PageOptions, PageState, Update};
pub use geometry::{Span, Viewport};
pub use host::{HostError, PageHost};
pub use menu::{CloseReason, MenuState};
pub use section::{SectionId, SectionRegistry};
pub use theme::Theme;
pub use tracker::{ActivationPolicy, TrackerConfig, VisibilitySample};
