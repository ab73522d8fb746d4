use anyhow::{bail, Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wpsite::build::build_site;
use wpsite::config::{Config, SiteConfig};
use wpsite::query::Posts;
use wpsite::source::HttpSource;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing `.env` is fine; the variables may come from the real
    // environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = App::new("wpsite")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds a static blog from a WordPress `latest-posts` endpoint")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Renders the index and every post page")
                .arg(
                    Arg::with_name("project")
                        .help("Directory to search (upward) for wpsite.yaml")
                        .default_value("."),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .short("o")
                        .takes_value(true)
                        .help("Output directory [default: {project}/_output]"),
                ),
        )
        .subcommand(SubCommand::with_name("list").about("Prints the posts sorted by title"))
        .subcommand(SubCommand::with_name("paths").about("Prints the route for every post"))
        .subcommand(
            SubCommand::with_name("show")
                .about("Prints a single post")
                .arg(Arg::with_name("id").required(true)),
        )
        .get_matches();

    // Fail fast on configuration before touching the network.
    let config = Config::from_env()?;
    let posts = Posts::new(HttpSource::new(config.posts_endpoint));
    debug!(endpoint = %posts.source().endpoint(), "using WordPress API");

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches, &posts).await,
        ("list", _) => print_json(&posts.list_sorted().await),
        ("paths", _) => print_json(&posts.list_identifiers().await),
        ("show", Some(matches)) => {
            // `required(true)` guarantees the argument.
            let id = matches.value_of("id").unwrap_or_default();
            print_json(&posts.get_by_id(id).await)
        }
        (other, _) => bail!("Unknown subcommand `{}`", other),
    }
}

async fn build(matches: &ArgMatches<'_>, posts: &Posts<HttpSource>) -> Result<()> {
    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let project = project
        .canonicalize()
        .with_context(|| format!("Resolving project directory `{}`", project.display()))?;
    let output = match matches.value_of("output") {
        Some(output) => PathBuf::from(output),
        None => project.join("_output"),
    };
    let site = SiteConfig::from_directory(&project, &output)?;
    build_site(&site, posts).await?;
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
