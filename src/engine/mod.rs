//! Row engine: ordering, keying, height estimation and windowing.
//!
//! Pure state machines with no terminal dependencies. The view layer feeds
//! in batches, layout and scroll offsets and paints whatever
//! [`WindowEngine::compute_visible_range`] returns.

pub mod height_estimator;
pub mod height_index;
pub mod key_maker;
pub mod pipeline;
pub mod types;
pub mod visible_range;
pub mod window;

pub use height_estimator::{EstimatorMetrics, HeightEstimator, LayoutParams};
pub use height_index::HeightIndex;
pub use key_maker::KeyMaker;
pub use pipeline::{DedupSortPipeline, OrderedSequence, RowBatch};
pub use types::{Bounds, Point, RenderKey, RowHeight, RowIndex, Viewport};
pub use visible_range::{VirtualItem, VisibleRange};
pub use window::{WindowEngine, DEFAULT_OVERSCAN};
