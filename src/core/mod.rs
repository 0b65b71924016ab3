pub mod etl;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{Order, Row, TransformResult};
pub use crate::domain::ports::{ConfigProvider, OrderSource, Pipeline, SheetSink};
pub use crate::utils::error::Result;
