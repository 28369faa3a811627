//! docdrift: detect drift between skill documentation and the code it
//! describes.
//!
//! The engine reads a bundle (one documentation file, a tree of source
//! files, a tree of reference files), extracts what the prose claims and
//! what the code contains, and reports every inconsistency as a typed,
//! severity-ranked [`Conflict`].
//!
//! ```no_run
//! use docdrift::{analyze, AnalyzerOptions, Bundle, BundleLayout};
//!
//! let bundle = Bundle::load(std::path::Path::new("my-skill"), &BundleLayout::default())?;
//! let result = analyze(&bundle, &AnalyzerOptions::default(), chrono::Utc::now());
//! println!("{}", result.report().to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analyze;
pub mod bundle;
pub mod conflict;
pub mod correlate;
pub mod docs;
pub mod error;
pub mod extract;
pub mod hash;
pub mod model;
pub mod references;
pub mod report;
pub mod rules;
pub mod segment;
pub mod validate;

pub use analyze::{analyze, AnalyzerOptions, ModeSelection};
pub use bundle::{Bundle, BundleLayout};
pub use conflict::{Conflict, ConflictKind, Severity};
pub use error::AnalysisError;
pub use report::{AnalysisResult, ConflictReport};
pub use segment::SegmentMode;
