// crates/cli/src/options.rs

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use engine::MatchOptions;

use crate::utils::parse_size;

#[derive(Parser, Debug)]
#[command(
    name = "hardlinkable",
    version,
    about = "Scan directories and report files that could be hard-linked together, \
             optionally performing the linking."
)]
pub struct Opts {
    #[arg(
        long,
        help_heading = "Linking",
        help = "Perform the actual hardlinking (default is a dry-run report)"
    )]
    pub enable_linking: bool,

    #[arg(
        short = 'q',
        long = "no-stats",
        help_heading = "Output",
        help = "Do not print the statistics"
    )]
    pub no_stats: bool,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity level (up to 3 times)"
    )]
    pub verbose: u8,

    #[arg(long, help_heading = "Output", help = "Disable the progress line")]
    pub no_progress: bool,

    #[arg(long, help_heading = "Output", help = "Emit the report as JSON")]
    pub json: bool,

    #[arg(
        short = 'f',
        long = "same-name",
        help_heading = "File Matching",
        help = "Filenames have to be identical"
    )]
    pub same_name: bool,

    #[arg(
        short = 'p',
        long = "ignore-perms",
        help_heading = "File Matching",
        help = "File permissions do not need to match"
    )]
    pub ignore_perms: bool,

    #[arg(
        short = 't',
        long = "ignore-time",
        help_heading = "File Matching",
        help = "File modification times do not need to match"
    )]
    pub ignore_time: bool,

    #[arg(
        long = "ignore-xattr",
        help_heading = "File Matching",
        help = "Extended attributes do not need to match"
    )]
    pub ignore_xattr: bool,

    #[arg(
        short = 's',
        long = "min-size",
        value_name = "SZ",
        default_value = "1",
        value_parser = parse_size::<u64>,
        help_heading = "File Matching",
        help = "Minimum file size (suffixes k, m, g, t, p are powers of 1024)"
    )]
    pub min_size: u64,

    #[arg(
        short = 'S',
        long = "max-size",
        value_name = "SZ",
        value_parser = parse_size::<u64>,
        help_heading = "File Matching",
        help = "Maximum file size"
    )]
    pub max_size: Option<u64>,

    #[arg(
        short = 'c',
        long = "content-only",
        help_heading = "File Matching",
        help = "Only file contents have to match"
    )]
    pub content_only: bool,

    #[arg(
        short = 'm',
        long = "match",
        value_name = "RE",
        action = ArgAction::Append,
        help_heading = "Name Matching",
        help = "Regular expression used to match files (may repeat)"
    )]
    pub matches: Vec<String>,

    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "RE",
        action = ArgAction::Append,
        help_heading = "Name Matching",
        help = "Regular expression used to exclude files/dirs (may repeat)"
    )]
    pub excludes: Vec<String>,

    #[arg(value_name = "DIRECTORY", required = true)]
    pub directories: Vec<PathBuf>,
}

impl Opts {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            same_name: self.same_name,
            ignore_perms: self.ignore_perms,
            ignore_time: self.ignore_time,
            ignore_xattr: self.ignore_xattr,
            content_only: self.content_only,
            min_size: self.min_size,
            max_size: self.max_size,
            link_max: None,
        }
    }
}
