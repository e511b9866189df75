//! `genecov` is a crate for computing per-base sequencing depth ("coverage")
//! across genomic intervals grouped into genes, and for deriving
//! order-statistics summaries (min, max, mean, median, quartiles, standard
//! deviation) per interval ("feature") and per gene.
//!
//! The crate provides three main points of entry:
//!
//! - Direct depth accumulation over a window via
//!   [`coverage::DepthBuffer`], which walks each alignment's CIGAR
//!   operations.
//! - A streaming [`pileup::Engine`] that consumes a coordinate-sorted
//!   alignment stream and produces per-position pileup columns, including
//!   per-base detail for each covering alignment.
//! - A [`session::Session`] that orchestrates a whole run: genes are
//!   processed one after another, each feature's depth samples are summarized
//!   via [`stats::Summary`], and each gene's features are pooled through a
//!   [`stats::GeneAggregator`] into a trailing gene-level summary.
//!
//! Alignment files, indexes, and output writing are deliberately out of
//! scope: alignments arrive through the [`alignment::source::Source`]
//! contract, and results leave as [`report::Row`]s.
//!
//! Below is a representative example of a complete run over one gene with
//! two features.
//!
//! ```
//! use nonempty::NonEmpty;
//!
//! use genecov::alignment::Record;
//! use genecov::alignment::source::Records;
//! use genecov::catalog::ReferenceCatalog;
//! use genecov::report;
//! use genecov::session::Gene;
//! use genecov::session::Session;
//!
//! let catalog = ReferenceCatalog::try_new([("chr1", 10_000)])?;
//! let chr1 = catalog.lookup("chr1").unwrap();
//!
//! let mut source = Records::new(vec![
//!     Record::new(chr1, 100, "50M".parse()?),
//!     Record::new(chr1, 125, "50M".parse()?),
//! ]);
//!
//! let mut features = NonEmpty::new("chr1:100-174".parse()?);
//! features.push("chr1:500-599".parse()?);
//! let genes = [Gene::new("GENE", features)];
//!
//! let session = Session::new(catalog);
//!
//! println!("{}", report::HEADER);
//! for row in session.run(&mut source, &genes)? {
//!     println!("{row}");
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod alignment;
pub mod catalog;
pub mod coverage;
pub mod interval;
pub mod pileup;
pub mod region;
pub mod report;
pub mod session;
pub mod stats;

pub use catalog::ReferenceCatalog;
pub use interval::GenomicInterval;
pub use session::Session;
