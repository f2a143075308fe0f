use std::env;
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{
    DegreeCourse, EstimationEntry, EstimationSet, IdGenerator, Level, NodeRecord, TaxonomyItem,
    TaxonomyTree, TreeRecord,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Item with explicit id and the given scores (unlisted courses absent).
pub fn scored_item(
    id: &str,
    name: &str,
    level: Level,
    scores: &[(DegreeCourse, f64)],
) -> TaxonomyItem {
    let estimations =
        EstimationSet::from_entries(scores.iter().map(|&(c, v)| EstimationEntry::new(c, v)));
    TaxonomyItem {
        id: id.to_string(),
        ..TaxonomyItem::with_estimations(name, level, estimations)
    }
}

pub fn leaf(id: &str, name: &str, level: Level, scores: &[(DegreeCourse, f64)]) -> NodeRecord {
    NodeRecord::new(scored_item(id, name, level, scores))
}

/// Small three-rank tree used across tests.
///
/// ```text
/// root
/// ├── Programmieren (p1)   {SE: 2}
/// │   ├── Sprachen (p2)    {SE: 1}
/// │   │   ├── Rust (p3a)   {SE: 3, SI: 1}
/// │   │   └── Java (p3b)   {MC: 1}
/// │   └── Werkzeuge (p2w)
/// └── Design (d1)          {MTD: 4}
///     └── Grafik (d2)      {MTD: 1}
///         └── Farben (d3)  {KWM: 2}
/// ```
pub fn sample_record() -> TreeRecord {
    let root = NodeRecord::new(TaxonomyItem {
        estimations: EstimationSet::new(),
        ..TaxonomyItem::with_id("000000", "root", Level::Root)
    });
    let programmieren = leaf("p1xxxx", "Programmieren", Level::L1, &[(DegreeCourse::SE, 2.0)])
        .with_children([
            leaf("p2xxxx", "Sprachen", Level::L2, &[(DegreeCourse::SE, 1.0)]).with_children([
                leaf(
                    "p3axxx",
                    "Rust",
                    Level::L3,
                    &[(DegreeCourse::SE, 3.0), (DegreeCourse::SI, 1.0)],
                ),
                leaf("p3bxxx", "Java", Level::L3, &[(DegreeCourse::MC, 1.0)]),
            ]),
            leaf("p2wxxx", "Werkzeuge", Level::L2, &[]),
        ]);
    let design = leaf("d1xxxx", "Design", Level::L1, &[(DegreeCourse::MTD, 4.0)]).with_children([
        leaf("d2xxxx", "Grafik", Level::L2, &[(DegreeCourse::MTD, 1.0)])
            .with_children([leaf("d3xxxx", "Farben", Level::L3, &[(DegreeCourse::KWM, 2.0)])]),
    ]);
    TreeRecord {
        root: root.with_children([programmieren, design]),
    }
}

pub fn sample_tree() -> TaxonomyTree {
    TaxonomyTree::from_record_with(sample_record(), IdGenerator::seeded(42))
}
