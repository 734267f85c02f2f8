// crates/cli/src/lib.rs

mod options;
mod progress;
mod report;
mod utils;

pub use options::Opts;

use clap::Parser;
use engine::{execute_plan, Scan};
use filters::Matcher;
use tracing::error;
use walk::{walk, WalkEvent};

use crate::progress::Progress;
use crate::report::Report;

/// Parse arguments, run one scan, print the report. Returns the process
/// exit code: 0 on success (even with nothing to link), 1 on unrecoverable
/// failure, 2 on configuration errors.
pub fn run() -> i32 {
    let opts = Opts::parse();
    logging::init(opts.verbose, opts.json);
    run_with(&opts)
}

fn run_with(opts: &Opts) -> i32 {
    if let Some(max) = opts.max_size {
        if max < opts.min_size {
            error!("--max-size cannot be smaller than --min-size");
            return 2;
        }
    }
    for dir in &opts.directories {
        if !dir.is_dir() {
            error!("{} is not a directory", dir.display());
            return 2;
        }
    }
    let matcher = match Matcher::new(&opts.matches, &opts.excludes) {
        Ok(matcher) => matcher,
        Err(err) => {
            error!("invalid pattern: {err}");
            return 2;
        }
    };

    // Say so up front: comparisons can run a long time with no other output.
    if opts.enable_linking && !opts.json {
        println!("----- Hardlinking enabled.  The filesystem will be modified -----");
    }

    let match_opts = opts.match_options();
    let want_xattr = match_opts.wants_xattr();
    let mut scan = Scan::new(match_opts);
    let mut progress = Progress::new(!opts.no_progress && !opts.json);

    for event in walk(&opts.directories, &matcher, want_xattr) {
        match event {
            WalkEvent::Directory(_) => scan.stats_mut().directories += 1,
            WalkEvent::File(entry) => {
                progress.tick();
                scan.observe(entry.path, entry.stat, entry.xattr);
            }
            WalkEvent::ExcludedDir(_) => scan.stats_mut().excluded_dirs += 1,
            WalkEvent::ExcludedFile(_) => scan.stats_mut().excluded_files += 1,
            WalkEvent::UnmatchedFile(_) => scan.stats_mut().unmatched_files += 1,
            WalkEvent::Inaccessible(_) => scan.stats_mut().inaccessible += 1,
        }
    }
    progress.finish();

    let clusters = if opts.verbose >= 2 {
        scan.existing_clusters()
    } else {
        Vec::new()
    };

    let plan = match scan.plan() {
        Ok(plan) => plan,
        Err(err) => {
            error!("{err}");
            return 1;
        }
    };

    if opts.enable_linking {
        execute_plan(&plan, scan.stats_mut());
    }

    let report = Report {
        verbose: opts.verbose,
        no_stats: opts.no_stats,
        linking_enabled: opts.enable_linking,
        stats: scan.stats(),
        plan: &plan,
        clusters: &clusters,
    };
    if opts.json {
        report.print_json();
    } else {
        report.print_text();
    }

    if scan.stats().failed_links > 0 {
        1
    } else {
        0
    }
}
