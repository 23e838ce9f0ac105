use std::path::PathBuf;

use clap::Parser;

/// Merge the cluster, user and context of a kubeconfig file into your kubeconfig.
#[derive(Parser, Debug)]
#[clap(name = "kube-merge", version)]
pub struct Args {
    /// Path to the kubeconfig file (defaults to $KUBECONFIG, then ~/.kube/config)
    #[clap(long, value_parser)]
    pub kubeconfig: Option<String>,

    /// Path to the yaml file to merge into the kubeconfig; must have an extension
    #[clap(short, long, value_parser)]
    pub file: PathBuf,

    /// Name for the merged cluster, user and context (defaults to the file name)
    #[clap(short, long, value_parser)]
    pub name: Option<String>,

    /// Replace an existing cluster, user and context with the same name
    #[clap(long = "override", action)]
    pub allow_override: bool,

    /// Show the changes without writing them
    #[clap(long, action)]
    pub dry_run: bool,

    /// Keep a timestamped copy of the kubeconfig before overwriting it
    #[clap(long, action)]
    pub backup: bool,

    /// Make the merged context the current context
    #[clap(long, action)]
    pub set_current: bool,

    /// More logging (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
