use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use code_embedder::FailurePolicy;
use repo_lister::DEFAULT_MANIFEST_FILE;

#[derive(Parser, Debug)]
#[command(
    name = "repo-embedder",
    version,
    about = "List repository files and embed their content"
)]
pub struct Cli {
    /// Manifest file handed from `list` to `embed`
    #[arg(long, global = true, env = "MANIFEST_PATH", default_value = DEFAULT_MANIFEST_FILE)]
    pub manifest: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Collect matching files and write the manifest
    List(ListArgs),
    /// Embed every file of an existing manifest
    Embed(EmbedArgs),
    /// `list` followed by `embed` over the same subdirectory
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Repository owner (GitHub user/org or GitLab namespace)
    #[arg(long)]
    pub owner: String,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// Subdirectory to scan; empty means the repository root
    #[arg(long, default_value = "")]
    pub subdir: String,

    /// File extension to keep, without the dot (repeatable or comma separated)
    #[arg(long = "ext", required = true, value_delimiter = ',')]
    pub exts: Vec<String>,

    /// Branch, tag or commit; the default branch when omitted
    #[arg(long = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct EmbedOpts {
    /// Storage namespace; derived from the subdirectory when omitted
    #[arg(long)]
    pub namespace: Option<String>,

    /// What to do when a single file fails: abort | skip
    #[arg(long, env = "EMBED_ON_ERROR", default_value = "abort")]
    pub on_error: FailurePolicy,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EmbedArgs {
    /// Subdirectory the manifest was listed from
    #[arg(long, default_value = "")]
    pub subdir: String,

    #[command(flatten)]
    pub opts: EmbedOpts,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub list: ListArgs,

    #[command(flatten)]
    pub opts: EmbedOpts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_with_repeated_and_comma_extensions() {
        let cli = Cli::try_parse_from([
            "repo-embedder",
            "list",
            "--owner",
            "acme",
            "--repo",
            "lib",
            "--subdir",
            "src/main/java",
            "--ext",
            "java,kt",
            "--ext",
            "scala",
        ])
        .unwrap();

        assert_eq!(cli.manifest, PathBuf::from("download_urls.json"));
        let Command::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.exts, vec!["java", "kt", "scala"]);
        assert_eq!(args.subdir, "src/main/java");
        assert!(args.git_ref.is_none());
    }

    #[test]
    fn parses_embed_with_skip_policy_and_global_manifest() {
        let cli = Cli::try_parse_from([
            "repo-embedder",
            "embed",
            "--on-error",
            "skip",
            "--manifest",
            "out/m.json",
        ])
        .unwrap();

        assert_eq!(cli.manifest, PathBuf::from("out/m.json"));
        let Command::Embed(args) = cli.command else {
            panic!("expected embed");
        };
        assert_eq!(args.opts.on_error, FailurePolicy::Skip);
        assert_eq!(args.subdir, "");
    }

    #[test]
    fn rejects_unknown_policy_and_missing_extensions() {
        assert!(
            Cli::try_parse_from(["repo-embedder", "embed", "--on-error", "retry"]).is_err()
        );
        assert!(
            Cli::try_parse_from(["repo-embedder", "list", "--owner", "a", "--repo", "b"]).is_err()
        );
    }
}
