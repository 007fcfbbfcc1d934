//! PDF export: metrics, layout, the `lopdf` writer and the batch driver.

pub mod batch;
pub mod font;
pub mod layout;
pub mod pdf;

pub use batch::{
    convert_file, default_output_dir, plan_batch, Batch, BatchPlan, BatchSummary, FileOutcome,
};
pub use pdf::{render_pdf, RenderOptions};
