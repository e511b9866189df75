//! A binary that runs a complete coverage report from plain-text inputs.
//!
//! ```shell
//! cargo run --release --bin=coverage-report --features=binaries -- \
//!     --references refs.tsv --regions regions.txt --alignments alignments.tsv
//! ```
//!
//! Three inputs are required:
//!
//! * `--references`: the reference catalog, one `name<TAB>length` pair per
//!   line, in sequence-dictionary order.
//! * `--regions`: the features to report on, one region per line (e.g.,
//!   `chr1:100-200`). Every feature is treated as belonging to a single gene.
//! * `--alignments`: a coordinate-sorted alignment dump, one
//!   `name<TAB>position<TAB>cigar` triple per line. This is deliberately not
//!   an alignment file format; producing it from one is somebody else's job.
//!
//! Any input ending in `.gz` is decompressed transparently.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use flate2::read::GzDecoder;
use genecov::ReferenceCatalog;
use genecov::Session;
use genecov::alignment::Record;
use genecov::alignment::source::Records;
use genecov::region;
use genecov::report;
use genecov::session::Gene;
use genecov::session::Strategy;
use nonempty::NonEmpty;
use tracing::debug;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

/// The name used for the single gene grouping every requested region.
const GENE_NAME: &str = "gene";

#[derive(Parser)]
struct Args {
    /// The reference catalog: one `name<TAB>length` pair per line.
    #[arg(short = 'c', long)]
    references: PathBuf,

    /// The list of regions to report coverage for, one per line.
    #[arg(short, long)]
    regions: PathBuf,

    /// The coordinate-sorted alignment dump: one
    /// `name<TAB>position<TAB>cigar` triple per line.
    #[arg(short, long)]
    alignments: PathBuf,

    /// Whether to compute depths through the pileup engine instead of the
    /// direct CIGAR walk.
    #[arg(short, long, default_value_t = false)]
    pileup: bool,

    #[command(flatten)]
    verbose: Verbosity,
}

/// Opens a file, decompressing it transparently if its name ends in `.gz`.
fn open(path: &Path) -> Result<Box<dyn BufRead>> {
    let file =
        File::open(path).with_context(|| format!("opening {}", path.display()))?;

    if path.extension().map(|ext| ext == "gz").unwrap_or(false) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Reads the reference catalog.
fn read_catalog(path: &Path) -> Result<ReferenceCatalog> {
    let mut sequences = Vec::new();

    for (i, line) in open(path)?.lines().enumerate() {
        let line = line?;

        if line.is_empty() {
            continue;
        }

        let (name, length) = line
            .split_once('\t')
            .with_context(|| format!("malformed reference at line {}", i + 1))?;

        let length = length
            .parse::<usize>()
            .with_context(|| format!("malformed reference length at line {}", i + 1))?;

        sequences.push((name.to_string(), length));
    }

    ReferenceCatalog::try_new(sequences).context("building the reference catalog")
}

/// Reads the region list into a single gene.
fn read_gene(path: &Path) -> Result<Gene> {
    let mut reader = region::Reader::new(open(path)?);

    let mut regions = reader
        .regions()
        .collect::<Result<Vec<_>, _>>()
        .context("reading the region list")?;

    if regions.is_empty() {
        bail!("the region list is empty");
    }

    let mut features = NonEmpty::new(regions.remove(0));
    for feature in regions {
        features.push(feature);
    }

    Ok(Gene::new(GENE_NAME, features))
}

/// Reads the alignment dump into an in-memory source.
fn read_alignments(path: &Path, catalog: &ReferenceCatalog) -> Result<Records> {
    let mut records = Vec::new();

    for (i, line) in open(path)?.lines().enumerate() {
        let line = line?;

        if line.is_empty() {
            continue;
        }

        let context = || format!("malformed alignment at line {}", i + 1);

        let mut fields = line.splitn(3, '\t');
        let name = fields.next().with_context(context)?;
        let position = fields
            .next()
            .with_context(context)?
            .parse::<usize>()
            .with_context(context)?;
        let cigar = fields.next().with_context(context)?.parse().with_context(context)?;

        let reference_id = catalog
            .lookup(name)
            .with_context(|| format!("unknown reference {name} at line {}", i + 1))?;

        records.push(Record::new(reference_id, position, cigar));
    }

    debug!("read {} alignments", records.len());

    Ok(Records::new(records))
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    let catalog = read_catalog(&args.references)?;
    let gene = read_gene(&args.regions)?;
    let mut source = read_alignments(&args.alignments, &catalog)?;

    info!(
        references = catalog.len(),
        features = gene.features().len(),
        "starting coverage run"
    );

    let strategy = match args.pileup {
        true => Strategy::Pileup,
        false => Strategy::CigarWalk,
    };

    let session = Session::new(catalog).with_strategy(strategy);
    let genes = [gene];

    println!("{}", report::HEADER);
    for row in session.run(&mut source, &genes)? {
        println!("{row}");
    }

    Ok(())
}
