// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod bulk;
pub mod cell;
pub mod column;
pub mod controller;
pub mod edit;
pub mod ids;
pub mod layout;
pub mod listener;
pub mod pagination;
pub mod render;
pub mod reorder;
pub mod resize;
pub mod selection;
pub mod sort;

pub use bulk::*;
pub use cell::*;
pub use column::*;
pub use controller::*;
pub use edit::*;
pub use ids::*;
pub use layout::*;
pub use listener::*;
pub use pagination::*;
pub use render::*;
pub use reorder::*;
pub use resize::*;
pub use selection::*;
pub use sort::*;
