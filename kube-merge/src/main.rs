use anyhow::Context as _;
use chrono::Local;
use clap::Parser;
use console::style;
use similar::{ChangeTag, TextDiff};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kubemerge::{
    backup_config, cli::Args, merge, resolve_kubeconfig_path, resolve_name, write_config,
    KubeConfig, Merged,
};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_tracing(args.verbose);

    run(&args)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let kube_config_path = resolve_kubeconfig_path(args.kubeconfig.as_deref())?;
    let kc = KubeConfig::read_from(&kube_config_path).context("Reading kube config")?;

    let name = resolve_name(args.name.as_deref(), &args.file)?;
    debug!(kubeconfig = %kube_config_path.display(), file = %args.file.display(), name = %name, "merging");
    let incoming = KubeConfig::read_from(&args.file).context("Reading file to merge")?;

    let original = args.dry_run.then(|| kc.clone());

    let Merged {
        config: mut merged,
        replaced,
    } = merge(kc, incoming, &name, args.allow_override)?;

    if args.set_current {
        merged.current_context = name.clone();
    }

    if let Some(original) = original {
        print_diff(&original.to_yaml()?, &merged.to_yaml()?);
        println!("Dry run, {} was not modified", kube_config_path.display());
        return Ok(());
    }

    if args.backup {
        let now = Local::now().format("%Y%m%dT%H%M%S").to_string();
        let backup = backup_config(&kube_config_path, &now)?;
        println!("Backed up to {}", backup.display());
    }

    write_config(&merged, &kube_config_path)?;

    if !replaced.is_empty() {
        let kinds: Vec<_> = replaced.iter().map(ToString::to_string).collect();
        println!(
            "{} {} named '{name}' removed because of --override",
            style("-").red(),
            kinds.join(", ")
        );
    }
    println!(
        "{} cluster, user and context added as '{name}'",
        style("+").green()
    );
    if args.set_current {
        println!("current-context set to '{name}'");
    }
    println!(
        "{} was modified successfully",
        style(kube_config_path.display()).bold()
    );

    Ok(())
}

fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Unified diff of the two documents, one marker per line.
fn diff_lines(old: &str, new: &str) -> Vec<(ChangeTag, String)> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .map(|change| (change.tag(), change.value().trim_end().to_string()))
        .collect()
}

fn print_diff(old: &str, new: &str) {
    for (tag, line) in diff_lines(old, new) {
        match tag {
            ChangeTag::Delete => println!("{}", style(format!("-{line}")).red()),
            ChangeTag::Insert => println!("{}", style(format!("+{line}")).green()),
            ChangeTag::Equal => println!(" {line}"),
        }
    }
}
